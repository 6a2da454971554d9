//! # Core Module
//!
//! The UI-agnostic icon matching engine.
//!
//! ## Modules
//! - `scanner` - Discovers icon files in directories
//! - `normalizer` - Decodes and normalizes icons onto the canonical canvas
//! - `scorer` - Correlates two normalized rasters
//! - `searcher` - Pairs every query icon with its best reference icon

pub mod normalizer;
pub mod scanner;
pub mod scorer;
pub mod searcher;

// Re-export commonly used types
pub use normalizer::{IconRaster, Normalizer, CANONICAL_SIZE};
pub use scanner::IconFile;
pub use searcher::{CancelFlag, MatchResult, Matcher, MatcherConfig, SearchResult};
