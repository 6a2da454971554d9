//! # Icon Match
//!
//! Pairs every unlabelled icon with its closest labelled icon using
//! normalized cross-correlation.
//!
//! ## How matching works
//! - Every icon is decoded, grayscaled, stretched onto a 64x64 canvas
//!   and lightly smoothed, so all comparisons see the same layout
//! - Each query/reference pair gets one correlation coefficient in [-1, 1]
//! - For each query the highest-scoring reference wins; ties keep the
//!   reference that appeared first in input order
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Scanning, normalization, scoring and best-match search
//! - `events` - Event-driven progress reporting (UI-ready)
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (in the `iconmatch` binary)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use crate::core::{MatchResult, Matcher, MatcherConfig, SearchResult};
pub use error::{IconMatchError, Result};

/// Initialize tracing for the library
///
/// This should be called once by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
