use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use log::{debug, info};
use rand::Rng;
use serde::Serialize;

use crate::error::{GenError, Result};
use crate::io::{get_filename, read_file};
use super::config::{CorpusConfig, GenerationConfig};
use super::generator::{generate, render};
use super::interner::{Interner, Token};
use super::tokenizer::tokenize_line;
use super::trigram_index::TrigramIndex;

/// Lines handed to a single build worker.
///
/// Fixed so that the split does not depend on the machine.
const CHUNK_LINES: usize = 4096;

/// Size figures of a built model.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelStats {
	/// Distinct interned tokens.
	pub tokens: usize,
	/// Trigrams stored, start trigrams and duplicates included.
	pub trigrams: usize,
	/// Start trigrams.
	pub starts: usize,
	/// Tokens matched by the include word, 0 without one.
	pub include_matches: usize,
}

/// A trigram index together with the strings its handles point to.
///
/// This is the unit that gets built from a corpus, merged with other
/// corpora and queried for sentences.
///
/// ## Invariants
/// - Every handle stored in `index` was issued by `interner`
/// - The model is never mutated while sentences are generated from it
#[derive(Debug, Default, Clone)]
pub struct TrigramModel {
	interner: Interner,
	index: TrigramIndex,
	corpus_names: Vec<String>,
}

impl TrigramModel {
	/// Reads a corpus file and builds its model.
	///
	/// - `workers == 1` builds on the calling thread
	/// - `workers == 0` uses one worker per CPU
	///
	/// # Errors
	/// - I/O failures while reading `filepath`
	/// - [`GenError::EmptyCorpus`] when no line survived the filter
	pub fn load<P: AsRef<Path>>(filepath: P, config: &CorpusConfig, workers: usize) -> Result<Self> {
		let started = Instant::now();
		let lines = read_file(&filepath)?;

		let mut model = if workers == 1 {
			Self::from_lines(&lines, config)
		} else {
			Self::from_lines_parallel(&lines, config, workers)
		};
		model.ensure_not_empty()?;
		model.corpus_names.push(get_filename(&filepath)?);

		info!(
			"built {} from {} lines in {:?}: {} tokens, {} trigrams, {} starts",
			filepath.as_ref().display(),
			lines.len(),
			started.elapsed(),
			model.interner.len(),
			model.index.len(),
			model.index.starts()
		);
		Ok(model)
	}

	/// Builds a model from raw corpus lines on the calling thread.
	///
	/// Lines rejected by the tokenizer are skipped. The result may be empty;
	/// see [`ensure_not_empty`](Self::ensure_not_empty).
	pub fn from_lines<S: AsRef<str>>(lines: &[S], config: &CorpusConfig) -> Self {
		let mut model = Self::default();
		let mut kept = 0;
		let mut line_tokens: Vec<Token> = Vec::new();

		for line in lines {
			let Some(words) = tokenize_line(line.as_ref(), config.min_line_tokens()) else {
				continue;
			};
			line_tokens.clear();
			line_tokens.extend(words.iter().map(|w| model.interner.intern(w)));
			model.index.add_line(&line_tokens);
			kept += 1;
		}

		debug!("indexed {} of {} lines", kept, lines.len());
		model
	}

	/// Builds a model by splitting the lines between worker threads.
	///
	/// Each worker builds a partial model for a fixed-size chunk. Partial
	/// models are merged back in chunk order, which yields exactly the model
	/// [`from_lines`](Self::from_lines) would have built.
	pub fn from_lines_parallel<S: AsRef<str> + Sync>(lines: &[S], config: &CorpusConfig, workers: usize) -> Self {
		let workers = if workers == 0 { num_cpus::get() } else { workers };
		let chunks: Vec<&[S]> = lines.chunks(CHUNK_LINES).collect();
		if workers <= 1 || chunks.len() <= 1 {
			return Self::from_lines(lines, config);
		}
		let workers = workers.min(chunks.len());
		debug!("building {} chunks on {} workers", chunks.len(), workers);

		let mut partials: Vec<Option<Self>> = vec![None; chunks.len()];
		thread::scope(|scope| {
			let (tx, rx) = mpsc::channel();
			for worker in 0..workers {
				let tx = tx.clone();
				let chunks = &chunks;
				scope.spawn(move || {
					for id in (worker..chunks.len()).step_by(workers) {
						let partial = Self::from_lines(chunks[id], config);
						if tx.send((id, partial)).is_err() {
							return;
						}
					}
				});
			}
			drop(tx);

			for (id, partial) in rx {
				partials[id] = Some(partial);
			}
		});

		let mut model = Self::default();
		for partial in partials.into_iter().flatten() {
			model.absorb(&partial);
		}
		model
	}

	/// Fails with [`GenError::EmptyCorpus`] if no sentence can ever start.
	pub fn ensure_not_empty(&self) -> Result<()> {
		if self.index.starts() == 0 {
			return Err(GenError::EmptyCorpus);
		}
		Ok(())
	}

	/// Names of the corpora this model was built from.
	pub fn corpus_names(&self) -> &[String] {
		&self.corpus_names
	}

	pub fn interner(&self) -> &Interner {
		&self.interner
	}

	pub fn index(&self) -> &TrigramIndex {
		&self.index
	}

	/// Merges another model into this one.
	///
	/// Tokens of `other` are re-interned here and all trigram counts are
	/// summed, as if both corpora had been read one after the other.
	///
	/// # Errors
	/// Returns an error if both models carry the same corpus name.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if let Some(name) = other.corpus_names.iter().find(|n| self.corpus_names.contains(n)) {
			return Err(GenError::MergeFailed(format!("corpus {name} already loaded")));
		}
		self.absorb(other);
		self.corpus_names.extend(other.corpus_names.iter().cloned());
		Ok(())
	}

	fn absorb(&mut self, other: &Self) {
		let remap: Vec<Token> = other
			.interner
			.iter()
			.map(|(_, text)| self.interner.intern(text))
			.collect();
		self.index.merge_with(&other.index, |token| remap[token.index()]);
	}

	/// Tokens whose text contains `word`, ignoring case.
	pub fn include_filter(&self, word: &str) -> HashSet<Token> {
		self.interner.matching(word)
	}

	/// Include filter for the configured word, empty without one.
	pub fn include_filter_for(&self, config: &GenerationConfig) -> HashSet<Token> {
		config
			.include_word
			.as_deref()
			.map(|word| self.include_filter(word))
			.unwrap_or_default()
	}

	pub fn stats(&self, include: &HashSet<Token>) -> ModelStats {
		ModelStats {
			tokens: self.interner.len(),
			trigrams: self.index.len(),
			starts: self.index.starts(),
			include_matches: include.len(),
		}
	}

	/// Generates one rendered sentence, or `None` if the search gave up.
	pub fn generate<R: Rng + ?Sized>(
		&self,
		rng: &mut R,
		config: &GenerationConfig,
		include: &HashSet<Token>,
	) -> Option<String> {
		generate(rng, &self.index, &self.interner, config, include)
			.map(|sentence| render(&sentence, &self.interner))
	}

	/// Runs `config.sentence_count` independent searches.
	///
	/// Searches that give up are left out, so the result may be shorter than
	/// requested.
	pub fn generate_all<R: Rng + ?Sized>(&self, rng: &mut R, config: &GenerationConfig) -> Vec<String> {
		let include = self.include_filter_for(config);
		(0..config.sentence_count)
			.filter_map(|_| self.generate(rng, config, &include))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	const CORPUS: &[&str] = &[
		"the quick brown fox jumps over the lazy dog",
		"the quick red fox runs past the sleepy cat",
		"a lazy dog sleeps under the old oak tree",
		"no",
		"is the quick fox faster than the dog?",
		"\"hello there my friend",
	];

	fn assert_same(a: &TrigramModel, b: &TrigramModel) {
		assert_eq!(a.interner.len(), b.interner.len());
		for ((ta, sa), (tb, sb)) in a.interner.iter().zip(b.interner.iter()) {
			assert_eq!(ta, tb);
			assert_eq!(sa, sb);
		}
		assert_eq!(a.index.len(), b.index.len());
		assert_eq!(a.index.starts(), b.index.starts());
		assert_eq!(a.index.prefixes(), b.index.prefixes());
	}

	#[test]
	fn short_lines_are_ignored() {
		let model = TrigramModel::from_lines(CORPUS, &CorpusConfig::default());
		assert_eq!(model.index.starts(), 5);
		assert!(model.interner.get("no").is_none());
		assert!(model.interner.get("hello").is_some());
		assert!(model.interner.get("dog.").is_some());
		assert!(model.interner.get("dog?").is_some());
	}

	#[test]
	fn empty_corpus_is_reported() {
		let model = TrigramModel::from_lines(&["too short", "also"], &CorpusConfig::default());
		assert_eq!(model.stats(&HashSet::new()).starts, 0);
		assert!(matches!(model.ensure_not_empty(), Err(GenError::EmptyCorpus)));
	}

	#[test]
	fn parallel_build_matches_sequential() {
		let lines: Vec<String> = (0..3 * CHUNK_LINES + 17)
			.map(|i| format!("{} {} {} {}", CORPUS[i % 3], i % 7, i % 11, i % 5))
			.collect();
		let config = CorpusConfig::default();

		let sequential = TrigramModel::from_lines(&lines, &config);
		let parallel = TrigramModel::from_lines_parallel(&lines, &config, 3);
		assert_same(&sequential, &parallel);

		let mut a = StdRng::seed_from_u64(8);
		let mut b = StdRng::seed_from_u64(8);
		let generation = GenerationConfig { sentence_count: 10, ..GenerationConfig::default() };
		assert_eq!(sequential.generate_all(&mut a, &generation), parallel.generate_all(&mut b, &generation));
	}

	#[test]
	fn merge_sums_counts() {
		let config = CorpusConfig::new(3).unwrap();
		let mut left = TrigramModel::from_lines(&["the cat sat"], &config);
		left.corpus_names.push("left".to_owned());
		let mut right = TrigramModel::from_lines(&["the cat ran fast"], &config);
		right.corpus_names.push("right".to_owned());

		left.merge(&right).unwrap();

		let the = left.interner.get("the").unwrap();
		let cat = left.interner.get("cat").unwrap();
		assert_eq!(left.index.start_count(the, cat), 2);
		assert_eq!(left.index.successors(the, cat).unwrap().total(), 2);
		assert_eq!(left.corpus_names(), &["left", "right"]);

		assert!(matches!(left.merge(&right), Err(GenError::MergeFailed(_))));
	}

	#[test]
	fn stats_count_include_matches() {
		let model = TrigramModel::from_lines(CORPUS, &CorpusConfig::default());
		let include = model.include_filter("FOX");
		let stats = model.stats(&include);
		assert_eq!(stats.include_matches, 1);
		assert_eq!(stats.tokens, model.interner.len());
	}
}
