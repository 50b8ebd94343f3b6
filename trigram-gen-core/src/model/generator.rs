use std::collections::HashSet;

use log::trace;
use rand::Rng;

use super::config::GenerationConfig;
use super::interner::{Interner, Token};
use super::trigram_index::TrigramIndex;
use super::walker::walk;

/// Searches for a sentence satisfying the configured constraints.
///
/// # Behavior
/// - If `include` is non-empty, first tries up to `include_max_candidates`
///   walks, keeping the first one with at least `min_tokens` tokens and at
///   least one token from `include`.
/// - Then tries up to `max_candidates` walks, keeping the first one with at
///   least `min_tokens` tokens.
///
/// Returns `None` once both budgets are spent. Running out of candidates is
/// an expected outcome, not an error.
pub fn generate<R: Rng + ?Sized>(
	rng: &mut R,
	index: &TrigramIndex,
	interner: &Interner,
	config: &GenerationConfig,
	include: &HashSet<Token>,
) -> Option<Vec<Token>> {
	let max_tokens = config.token_ceiling();

	if !include.is_empty() {
		for attempt in 0..config.include_max_candidates {
			let sentence = walk(rng, index, interner, max_tokens);
			if sentence.len() < config.min_tokens {
				continue;
			}
			if !sentence.iter().any(|token| include.contains(token)) {
				continue;
			}
			trace!("include candidate accepted after {} attempts", attempt + 1);
			return Some(sentence);
		}
		trace!("include search exhausted {} candidates", config.include_max_candidates);
	}

	for attempt in 0..config.max_candidates {
		let sentence = walk(rng, index, interner, max_tokens);
		if sentence.len() < config.min_tokens {
			continue;
		}
		trace!("candidate accepted after {} attempts", attempt + 1);
		return Some(sentence);
	}

	trace!("search exhausted {} candidates", config.max_candidates);
	None
}

/// Turns a token sequence into display text.
///
/// Tokens are joined by single spaces. A trailing `.` on the last token is
/// dropped; a trailing `?` is kept.
pub fn render(sentence: &[Token], interner: &Interner) -> String {
	let mut result = sentence
		.iter()
		.map(|token| interner.resolve(*token))
		.collect::<Vec<_>>()
		.join(" ");

	if result.ends_with('.') {
		result.pop();
	}
	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn build(lines: &[&str]) -> (Interner, TrigramIndex) {
		let mut interner = Interner::new();
		let lines: Vec<Vec<Token>> = lines
			.iter()
			.map(|line| line.split(' ').map(|w| interner.intern(w)).collect())
			.collect();
		let index = TrigramIndex::build(&lines);
		(interner, index)
	}

	fn tokens(interner: &mut Interner, words: &[&str]) -> Vec<Token> {
		words.iter().map(|w| interner.intern(w)).collect()
	}

	#[test]
	fn render_drops_final_period_only() {
		let mut interner = Interner::new();
		let sentence = tokens(&mut interner, &["hello", "big", "world."]);
		assert_eq!(render(&sentence, &interner), "hello big world");

		let sentence = tokens(&mut interner, &["is", "it", "so?"]);
		assert_eq!(render(&sentence, &interner), "is it so?");

		let sentence = tokens(&mut interner, &["no", "stop", "here"]);
		assert_eq!(render(&sentence, &interner), "no stop here");

		let sentence = tokens(&mut interner, &["a.", "b."]);
		assert_eq!(render(&sentence, &interner), "a. b");
	}

	#[test]
	fn never_returns_short_sentences() {
		let (interner, index) = build(&["a b c.", "d e f g h i j k."]);
		let config = GenerationConfig { min_tokens: 5, ..GenerationConfig::default() };
		let mut rng = StdRng::seed_from_u64(9);

		for _ in 0..50 {
			let sentence = generate(&mut rng, &index, &interner, &config, &HashSet::new()).unwrap();
			assert!(sentence.len() >= 5);
		}
	}

	#[test]
	fn exhaustion_is_none() {
		let (interner, index) = build(&["a b c."]);
		let config = GenerationConfig { min_tokens: 10, max_candidates: 20, ..GenerationConfig::default() };
		let mut rng = StdRng::seed_from_u64(1);
		assert!(generate(&mut rng, &index, &interner, &config, &HashSet::new()).is_none());
	}

	#[test]
	fn include_tier_prefers_matching_sentences() {
		let (interner, index) = build(&[
			"one two three four five six.",
			"the Cat sat on the mat today.",
			"seven eight nine ten eleven twelve.",
		]);
		let include = interner.matching("cat");
		let config = GenerationConfig { min_tokens: 3, ..GenerationConfig::default() };
		let mut rng = StdRng::seed_from_u64(2);

		for _ in 0..20 {
			let sentence = generate(&mut rng, &index, &interner, &config, &include).unwrap();
			assert!(sentence.iter().any(|t| include.contains(t)));
		}
	}

	#[test]
	fn falls_back_when_include_budget_is_spent() {
		let (interner, index) = build(&["one two three four five six.", "the cat sat on the mat."]);
		let include = interner.matching("cat");
		let config = GenerationConfig {
			min_tokens: 3,
			include_max_candidates: 0,
			..GenerationConfig::default()
		};
		let mut rng = StdRng::seed_from_u64(4);
		assert!(generate(&mut rng, &index, &interner, &config, &include).is_some());
	}

	#[test]
	fn same_seed_same_sentence() {
		let (interner, index) = build(&[
			"a b c d e f.",
			"a b x d e g.",
			"b c d e f a b.",
			"c d e a b c d e f.",
		]);
		let config = GenerationConfig { min_tokens: 3, ..GenerationConfig::default() };

		let run = |seed: u64| {
			let mut rng = StdRng::seed_from_u64(seed);
			(0..10)
				.map(|_| generate(&mut rng, &index, &interner, &config, &HashSet::new()))
				.collect::<Vec<_>>()
		};
		assert_eq!(run(17), run(17));
	}
}
