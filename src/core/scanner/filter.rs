//! File filtering logic for the scanner.

use super::IconFormat;
use std::collections::HashSet;
use std::path::Path;

/// Extensions accepted when no override is configured
const DEFAULT_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Decides which directory entries count as icon sources
pub struct IconFilter {
    /// File extensions to include, lowercase
    extensions: HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl IconFilter {
    /// Create a new filter with the default extension set
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(&ext.to_lowercase()),
            None => false,
        }
    }

    /// Get the icon format for a path
    pub fn format_for(&self, path: &Path) -> IconFormat {
        path.extension()
            .and_then(|e| e.to_str())
            .map(IconFormat::from_extension)
            .unwrap_or(IconFormat::Unknown)
    }
}

impl Default for IconFilter {
    fn default() -> Self {
        Self::new()
    }
}
