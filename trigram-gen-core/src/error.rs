//! Error types for corpus loading and model construction.
//!
//! Only failures that stop a run live here. A candidate search that runs out
//! of attempts is not an error: it yields `None`.

/// Errors raised while reading a corpus or building a model.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
	/// Indexing finished without a single start trigram.
	#[error("no input")]
	EmptyCorpus,

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("merge failed: {0}")]
	MergeFailed(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// Result alias using [`GenError`].
pub type Result<T> = std::result::Result<T, GenError>;
