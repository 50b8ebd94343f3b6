//! Trigram model and sentence generation.
//!
//! - Token interning (`Interner`, `Token`)
//! - Weighted multisets of observations (`Transitions`)
//! - The order-3 adjacency table (`TrigramIndex`)
//! - Random walks and the candidate search built on them
//! - Corpus cleaning and generation parameters

/// Append-only string table and the handles it issues.
pub mod interner;

/// Weighted multiset with proportional sampling.
pub mod transitions;

/// Trigram storage grouped by two-token prefix.
pub mod trigram_index;

/// A single randomized traversal of the index.
pub mod walker;

/// Two-tier candidate search and sentence rendering.
pub mod generator;

/// Interner and index bundled as a loadable, mergeable model.
pub mod trigram_model;

/// Raw line splitting and token cleanup.
pub mod tokenizer;

/// Generation and corpus parameters.
pub mod config;
