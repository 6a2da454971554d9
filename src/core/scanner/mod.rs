//! # Scanner Module
//!
//! Discovers icon files in directories.
//!
//! ## Supported Formats
//! - PNG (.png)
//! - JPEG (.jpg, .jpeg)
//!
//! The scanner only polices extensions. A file with an accepted
//! extension but broken contents passes discovery and surfaces later
//! as a per-icon load failure, not a scan error.
//!
//! ## Example
//! ```rust,ignore
//! use icon_match::core::scanner::{IconScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let found = scanner.scan(&["./icons/queries".into()])?;
//! ```

mod filter;
mod walker;

pub use filter::IconFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A discovered icon source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconFile {
    /// Path to the icon file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Format guessed from the extension
    pub format: IconFormat,
}

/// Raster formats accepted at the discovery boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconFormat {
    Png,
    Jpeg,
    Unknown,
}

impl IconFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => IconFormat::Png,
            "jpg" | "jpeg" => IconFormat::Jpeg,
            _ => IconFormat::Unknown,
        }
    }

    /// Check if this format is accepted at discovery
    pub fn is_supported(&self) -> bool {
        !matches!(self, IconFormat::Unknown)
    }
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Successfully discovered icons
    pub icons: Vec<IconFile>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for icon discovery
///
/// Implement this trait to feed the matcher from somewhere other than
/// the filesystem (e.g., for testing).
pub trait IconScanner: Send + Sync {
    /// Scan directories and return discovered icons
    fn scan(&self, paths: &[PathBuf]) -> Result<ScanResult, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<ScanResult, ScanError>;
}
