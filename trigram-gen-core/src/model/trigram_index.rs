use std::collections::HashMap;

use rand::Rng;

use super::interner::Token;
use super::transitions::Transitions;

/// One observed adjacency of three tokens.
///
/// `prev2 == None` is the start marker: the trigram opens a sentence and
/// `prev1`, `next` are its first two tokens.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Trigram {
	pub prev2: Option<Token>,
	pub prev1: Token,
	pub next: Token,
}

/// Order-3 token adjacency table.
///
/// Trigrams are grouped by their `(prev2, prev1)` prefix. Each group keeps
/// the multiset of observed `next` tokens, so repeated trigrams weigh more
/// when sampling. Start trigrams are kept apart since they are only ever
/// drawn as a whole.
///
/// # Invariants
/// - Every group is non-empty
/// - `len` equals the number of trigrams added, duplicates and starts included
/// - The index is read-only once built
#[derive(Clone, Debug, Default)]
pub struct TrigramIndex {
	/// `(prev1, next)` pairs of start trigrams, one slot per observation.
	starts: Transitions<(Token, Token)>,

	/// Successor multisets keyed by `(prev2, prev1)`.
	successors: HashMap<(Token, Token), Transitions<Token>>,

	len: usize,
}

impl TrigramIndex {
	/// Builds an index from token lines.
	///
	/// Every line contributes one start trigram and one trigram per window of
	/// three consecutive tokens. Lines shorter than three tokens form no
	/// trigram and are skipped.
	///
	/// An index built from nothing usable has `starts() == 0`; it is up to the
	/// caller to treat that as an empty corpus.
	pub fn build<I, L>(lines: I) -> Self
	where
		I: IntoIterator<Item = L>,
		L: AsRef<[Token]>,
	{
		let mut index = Self::default();
		for line in lines {
			index.add_line(line.as_ref());
		}
		index
	}

	/// Adds the trigrams of a single line.
	pub(crate) fn add_line(&mut self, tokens: &[Token]) {
		if tokens.len() < 3 {
			return;
		}

		self.starts.add((tokens[0], tokens[1]));
		self.len += 1;

		for window in tokens.windows(3) {
			self.successors
				.entry((window[0], window[1]))
				.or_default()
				.add(window[2]);
			self.len += 1;
		}
	}

	/// Total number of trigrams stored, start trigrams included.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Number of start trigrams.
	pub fn starts(&self) -> usize {
		self.starts.total()
	}

	/// Number of distinct `(prev2, prev1)` prefixes, start marker excluded.
	pub fn prefixes(&self) -> usize {
		self.successors.len()
	}

	/// How many times `(START, prev1, next)` was observed.
	pub fn start_count(&self, prev1: Token, next: Token) -> usize {
		self.starts.count((prev1, next))
	}

	/// Successor multiset for a prefix, if the prefix was ever observed.
	pub fn successors(&self, prev2: Token, prev1: Token) -> Option<&Transitions<Token>> {
		self.successors.get(&(prev2, prev1))
	}

	/// Draws a start trigram, weighted by how often each one was observed.
	///
	/// Returns `None` only for an index without starts.
	pub fn random_start<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Trigram> {
		let (prev1, next) = self.starts.sample(rng)?;
		Some(Trigram { prev2: None, prev1, next })
	}

	/// Draws the token following `(prev2, prev1)`, weighted by frequency.
	///
	/// Returns `None` if no trigram starts with this prefix.
	pub fn random_successor<R: Rng + ?Sized>(&self, rng: &mut R, prev2: Token, prev1: Token) -> Option<Token> {
		self.successors.get(&(prev2, prev1))?.sample(rng)
	}

	/// Folds `other` into this index, translating its tokens with `map`.
	///
	/// `map` must be injective so distinct prefixes stay distinct.
	pub(crate) fn merge_with<F>(&mut self, other: &Self, map: F)
	where
		F: Fn(Token) -> Token,
	{
		self.starts.merge_with(&other.starts, |(a, b)| (map(a), map(b)));
		for ((prev2, prev1), transitions) in &other.successors {
			self.successors
				.entry((map(*prev2), map(*prev1)))
				.or_default()
				.merge_with(transitions, &map);
		}
		self.len += other.len;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::interner::Interner;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn intern_lines(interner: &mut Interner, lines: &[&str]) -> Vec<Vec<Token>> {
		lines
			.iter()
			.map(|line| line.split(' ').map(|w| interner.intern(w)).collect())
			.collect()
	}

	#[test]
	fn cat_scenario() {
		let mut interner = Interner::new();
		let lines = intern_lines(&mut interner, &["the cat sat.", "the cat ran fast."]);
		let index = TrigramIndex::build(&lines);

		let the = interner.get("the").unwrap();
		let cat = interner.get("cat").unwrap();
		let sat = interner.get("sat.").unwrap();
		let ran = interner.get("ran").unwrap();

		assert_eq!(index.starts(), 2);
		assert_eq!(index.start_count(the, cat), 2);
		// 2 starts + 1 + 2 windows
		assert_eq!(index.len(), 5);

		let next = index.successors(the, cat).unwrap();
		assert_eq!(next.total(), 2);
		assert_eq!(next.count(sat), 1);
		assert_eq!(next.count(ran), 1);
	}

	#[test]
	fn short_lines_form_nothing() {
		let mut interner = Interner::new();
		let lines = intern_lines(&mut interner, &["hello there.", "hi."]);
		let index = TrigramIndex::build(&lines);

		assert_eq!(index.starts(), 0);
		assert!(index.is_empty());
		let mut rng = StdRng::seed_from_u64(0);
		assert!(index.random_start(&mut rng).is_none());
	}

	#[test]
	fn unknown_prefix_has_no_successor() {
		let mut interner = Interner::new();
		let lines = intern_lines(&mut interner, &["a b c d."]);
		let index = TrigramIndex::build(&lines);

		let a = interner.get("a").unwrap();
		let c = interner.get("c").unwrap();
		let mut rng = StdRng::seed_from_u64(0);
		assert!(index.random_successor(&mut rng, a, c).is_none());
	}

	#[test]
	fn successor_frequency_converges() {
		let mut interner = Interner::new();
		let lines = intern_lines(
			&mut interner,
			&["x y one.", "x y one.", "x y one.", "x y two."],
		);
		let index = TrigramIndex::build(&lines);
		let x = interner.get("x").unwrap();
		let y = interner.get("y").unwrap();
		let one = interner.get("one.").unwrap();

		let mut rng = StdRng::seed_from_u64(42);
		let draws = 20_000;
		let hits = (0..draws)
			.filter(|_| index.random_successor(&mut rng, x, y) == Some(one))
			.count();
		let ratio = hits as f64 / draws as f64;
		assert!((ratio - 0.75).abs() < 0.02, "ratio was {ratio}");
	}

	#[test]
	fn random_start_is_a_start() {
		let mut interner = Interner::new();
		let lines = intern_lines(&mut interner, &["one two three.", "four five six."]);
		let index = TrigramIndex::build(&lines);

		let mut rng = StdRng::seed_from_u64(3);
		for _ in 0..50 {
			let start = index.random_start(&mut rng).unwrap();
			assert!(start.prev2.is_none());
			assert_eq!(index.start_count(start.prev1, start.next), 1);
		}
	}

	#[test]
	fn distinct_starts_build_and_draw_in_linear_time() {
		// Every line opens with its own pair, as in a real chat log
		let lines = 100_000;
		let mut interner = Interner::new();
		let tail: Vec<Token> = ["the", "same", "tail", "words."].iter().map(|w| interner.intern(w)).collect();

		let started = std::time::Instant::now();
		let mut index = TrigramIndex::default();
		let mut line = Vec::with_capacity(6);
		for i in 0..lines {
			line.clear();
			line.push(interner.intern(&format!("w{i}")));
			line.push(interner.intern(&format!("x{i}")));
			line.extend_from_slice(&tail);
			index.add_line(&line);
		}
		assert_eq!(index.starts(), lines);

		let mut rng = StdRng::seed_from_u64(12);
		for _ in 0..lines {
			assert!(index.random_start(&mut rng).is_some());
		}
		assert!(started.elapsed().as_secs() < 10, "took {:?}", started.elapsed());
	}
}
