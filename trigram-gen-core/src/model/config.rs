use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{GenError, Result};

/// Smallest accepted `max_tokens`: a walk always emits its start pair.
pub const MIN_MAX_TOKENS: usize = 2;

/// Smallest accepted line filter: a trigram needs three tokens.
pub const MIN_LINE_TOKENS: usize = 3;

/// Parameters of sentence generation.
///
/// Built once from the command line or a request and passed by reference
/// into the candidate search and the walker.
///
/// `max_tokens` below 2 acts as 2, see [`token_ceiling`](Self::token_ceiling).
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationConfig {
	/// Candidates shorter than this are rejected.
	pub min_tokens: usize,

	/// Hard ceiling on the length of a walk.
	pub max_tokens: usize,

	/// Attempts of the unfiltered search.
	pub max_candidates: usize,

	/// Attempts of the search that requires `include_word`.
	pub include_max_candidates: usize,

	/// Word that generated sentences should try to contain.
	pub include_word: Option<String>,

	/// Number of independent sentences to request.
	pub sentence_count: usize,

	/// Seed text for reproducible output.
	pub random_seed: Option<String>,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			min_tokens: 6,
			max_tokens: 35,
			max_candidates: 25_000,
			include_max_candidates: 100_000,
			include_word: None,
			sentence_count: 1,
			random_seed: None,
		}
	}
}

impl GenerationConfig {
	/// Walk length ceiling actually applied: `max_tokens`, at least 2.
	pub fn token_ceiling(&self) -> usize {
		self.max_tokens.max(MIN_MAX_TOKENS)
	}

	/// Sets the token ceiling, raising anything below 2 to 2.
	pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
		self.max_tokens = max_tokens.max(MIN_MAX_TOKENS);
		self
	}

	/// Creates the random source for a run.
	///
	/// A seed string always produces the same generator; without one the
	/// generator is seeded from the operating system.
	pub fn rng(&self) -> StdRng {
		match &self.random_seed {
			Some(seed) => StdRng::seed_from_u64(seed_hash(seed)),
			None => StdRng::from_os_rng(),
		}
	}
}

/// FNV-1a over the seed bytes. Stable across platforms and releases.
fn seed_hash(seed: &str) -> u64 {
	const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
	const PRIME: u64 = 0x0000_0100_0000_01b3;

	seed.bytes().fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}

/// Parameters of corpus ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CorpusConfig {
	min_line_tokens: usize,
}

impl Default for CorpusConfig {
	fn default() -> Self {
		Self { min_line_tokens: 4 }
	}
}

impl CorpusConfig {
	/// Creates a config dropping lines with fewer than `min_line_tokens` tokens.
	///
	/// # Errors
	/// Returns an error if the threshold is below 3.
	pub fn new(min_line_tokens: usize) -> Result<Self> {
		if min_line_tokens < MIN_LINE_TOKENS {
			return Err(GenError::InvalidConfig(format!(
				"line token threshold must be >= {MIN_LINE_TOKENS}, got {min_line_tokens}"
			)));
		}
		Ok(Self { min_line_tokens })
	}

	pub fn min_line_tokens(&self) -> usize {
		self.min_line_tokens
	}
}
