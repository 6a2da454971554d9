//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the matching engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Icon discovery events
    Scan(ScanEvent),
    /// Loading/normalization events
    Normalize(NormalizeEvent),
    /// Best-match search events
    Search(SearchEvent),
    /// Batch-level events
    Batch(BatchEvent),
}

/// Which icon collection an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconSet {
    /// Unlabelled icons whose best match is being sought
    Query,
    /// Labelled icons the queries are compared against
    Reference,
}

/// Events during icon discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { paths: Vec<PathBuf> },
    /// An icon file was found
    IconFound { path: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_icons: usize },
}

/// Events during icon loading and normalization.
///
/// The reference set is normalized up front and gets the full
/// Started/Completed bracket; query icons are loaded inside the matching
/// phase and only surface here when a load fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NormalizeEvent {
    /// Normalization of a set has started
    Started { set: IconSet, total_icons: usize },
    /// An icon was successfully normalized
    Loaded { set: IconSet, path: PathBuf },
    /// An icon failed to load; it is skipped, not fatal
    Error {
        set: IconSet,
        path: PathBuf,
        message: String,
    },
    /// Normalization of a set completed
    Completed {
        set: IconSet,
        loaded: usize,
        failed: usize,
    },
}

/// Events during the best-match search phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchEvent {
    /// Search has started
    Started {
        total_queries: usize,
        usable_references: usize,
    },
    /// Progress update during the search
    Progress(SearchProgress),
    /// A query finished its scan over the reference set
    QueryMatched {
        query: String,
        best_match: Option<String>,
        score: f64,
    },
    /// Search completed
    Completed { matched: usize, skipped: usize },
}

/// Progress information during the search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchProgress {
    /// Number of queries fully scanned so far
    pub queries_completed: usize,
    /// Total number of queries in the batch
    pub total_queries: usize,
}

/// Batch-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// The batch has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: BatchPhase },
    /// The batch completed successfully
    Completed { summary: BatchSummary },
    /// The batch was cancelled; partial results are discarded
    Cancelled,
    /// The batch encountered a fatal error
    Error { message: String },
}

/// Phases of a matching batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchPhase {
    Scanning,
    Normalizing,
    Matching,
}

/// Summary of batch results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total query icons supplied
    pub total_queries: usize,
    /// Queries that produced a match result
    pub matched_queries: usize,
    /// Total reference icons supplied
    pub total_references: usize,
    /// Reference icons that loaded successfully
    pub usable_references: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchPhase::Scanning => write!(f, "Scanning"),
            BatchPhase::Normalizing => write!(f, "Normalizing"),
            BatchPhase::Matching => write!(f, "Matching"),
        }
    }
}
