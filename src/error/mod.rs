//! # Error Module
//!
//! Error types for the icon matching engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, dimensions, what went wrong
//! - **Isolate per-image failures** - one bad icon never aborts a batch
//! - **Surface structural failures** - an empty reference set or a dimension
//!   mismatch means the whole operation is meaningless and must propagate
//!
//! No error here is transient: a corrupt file stays corrupt, so nothing is
//! ever retried.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum IconMatchError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Scoring error: {0}")]
    Score(#[from] ScoreError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while discovering icon files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while loading and normalizing a single icon.
///
/// Always scoped to one image: the searcher skips the image and keeps going.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open icon file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode icon {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Icon is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },
}

/// Errors from the similarity scorer.
///
/// A dimension mismatch cannot happen for icons that went through the
/// normalizer; seeing one means a caller bypassed it, so this is treated as
/// a programming error and never recovered.
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Icon dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch {
        left: (u32, u32),
        right: (u32, u32),
    },
}

/// Batch-level errors from the best-match search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("No usable reference icons ({total} supplied, {failed} failed to load)")]
    EmptyReferenceSet { total: usize, failed: usize },

    #[error("Search was cancelled")]
    Cancelled,

    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, IconMatchError>;
