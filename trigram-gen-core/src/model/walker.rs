use rand::Rng;

use super::interner::{Interner, Token};
use super::tokenizer::is_stop_token;
use super::trigram_index::TrigramIndex;

/// Performs one random walk over the index.
///
/// The walk starts from a random start trigram, whose two tokens open the
/// sentence, then repeatedly appends a successor of the last two tokens.
/// It ends on a stop token, on a prefix without successor, or once
/// `max_tokens` tokens were emitted, whichever comes first.
///
/// The result holds between 2 and `max(max_tokens, 2)` tokens; it is empty
/// only if the index has no start trigram.
pub fn walk<R: Rng + ?Sized>(rng: &mut R, index: &TrigramIndex, interner: &Interner, max_tokens: usize) -> Vec<Token> {
	let Some(start) = index.random_start(rng) else {
		return Vec::new();
	};

	let mut sentence = vec![start.prev1, start.next];
	let (mut prev2, mut prev1) = (start.prev1, start.next);

	for _ in 2..max_tokens {
		let Some(next) = index.random_successor(rng, prev2, prev1) else {
			break;
		};

		sentence.push(next);
		if is_stop_token(interner.resolve(next)) {
			break;
		}
		(prev2, prev1) = (prev1, next);
	}

	sentence
}
