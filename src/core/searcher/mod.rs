//! Brute-force best-match search.
//!
//! Pairs every query icon with the reference icon that correlates
//! highest against it. References are normalized once into an
//! immutable [`ReferenceCache`]; queries are then partitioned across
//! rayon workers, each scanning the full cache and writing its result
//! into the slot matching the query's input position.
//!
//! Complexity is O(queries x references) scores per batch. For icon
//! sets this is deliberate: exhaustive scan, no indexing, bit-for-bit
//! reproducible output.

mod cache;
mod executor;

pub use cache::ReferenceCache;
pub use executor::{CancelFlag, Matcher, MatcherConfig};

use crate::core::normalizer::IconRaster;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A normalized raster together with its reporting identifier.
#[derive(Debug, Clone)]
pub struct LabeledIcon {
    /// Source file name, or the full path when no file name exists.
    /// Reporting-only, never inspected by the scoring code.
    pub id: String,
    pub raster: IconRaster,
}

/// Best match found for a single query icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Identifier of the query icon.
    pub query: String,
    /// Identifier of the winning reference icon. `None` only when no
    /// reference ever scored above the -1.0 starting floor.
    pub best_match: Option<String>,
    /// Correlation score of the winning reference, in [-1, 1].
    pub score: f64,
}

/// Outcome of a whole search batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// One entry per successfully loaded query, in query input order.
    pub results: Vec<MatchResult>,
    /// Number of query paths supplied, including ones that failed to load.
    pub total_queries: usize,
    /// Reference icons that survived normalization.
    pub usable_references: usize,
    /// Number of reference paths supplied.
    pub total_references: usize,
    /// Diagnostic notes for every skipped load, references first.
    pub errors: Vec<String>,
    /// Wall-clock duration of the batch.
    pub duration_ms: u64,
}

/// Reporting identifier for an icon source.
pub fn source_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
