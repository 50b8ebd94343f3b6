//! Trigram-based sentence generation.
//!
//! A corpus of short lines is cleaned, interned and indexed as order-3 token
//! adjacencies. Sentences are produced by random walks over that index,
//! retried until one satisfies the length and content constraints.
//!
//! ```no_run
//! use trigram_gen_core::model::config::{CorpusConfig, GenerationConfig};
//! use trigram_gen_core::model::trigram_model::TrigramModel;
//!
//! let model = TrigramModel::load("irc.txt", &CorpusConfig::default(), 1)?;
//! let config = GenerationConfig::default();
//! let mut rng = config.rng();
//! for sentence in model.generate_all(&mut rng, &config) {
//!     println!("{sentence}");
//! }
//! # Ok::<(), trigram_gen_core::error::GenError>(())
//! ```

/// Trigram index, walker, candidate search and their configuration.
pub mod model;

/// Errors surfaced while building a model.
pub mod error;

/// File helpers (corpus reading, directory listing).
pub mod io;
