//! Immutable reference icon cache.
//!
//! Built once per batch, read concurrently by every query worker
//! afterwards. Nothing mutates the cache after construction.

use crate::core::normalizer::Normalizer;
use crate::events::{Event, EventSender, IconSet, NormalizeEvent};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::warn;

use super::{source_id, LabeledIcon};

/// All reference icons that survived normalization, in input order.
#[derive(Debug)]
pub struct ReferenceCache {
    icons: Vec<LabeledIcon>,
    total_supplied: usize,
    notes: Vec<String>,
}

impl ReferenceCache {
    /// Normalize every reference path in parallel.
    ///
    /// Icons keep their input order regardless of which worker finished
    /// first. A path that fails to load is skipped, logged, reported as
    /// a `Normalize` error event and recorded as a diagnostic note;
    /// failures never abort the build.
    pub fn build(normalizer: &Normalizer, references: &[PathBuf], events: &EventSender) -> Self {
        events.send(Event::Normalize(NormalizeEvent::Started {
            set: IconSet::Reference,
            total_icons: references.len(),
        }));

        let outcomes: Vec<Result<LabeledIcon, (PathBuf, String)>> = references
            .par_iter()
            .map(|path| match normalizer.normalize_file(path) {
                Ok(raster) => {
                    events.send(Event::Normalize(NormalizeEvent::Loaded {
                        set: IconSet::Reference,
                        path: path.clone(),
                    }));
                    Ok(LabeledIcon {
                        id: source_id(path),
                        raster,
                    })
                }
                Err(e) => Err((path.clone(), e.to_string())),
            })
            .collect();

        let mut icons = Vec::with_capacity(references.len());
        let mut notes = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(icon) => icons.push(icon),
                Err((path, message)) => {
                    warn!(path = %path.display(), error = %message, "Skipping unreadable reference icon");
                    events.send(Event::Normalize(NormalizeEvent::Error {
                        set: IconSet::Reference,
                        path: path.clone(),
                        message: message.clone(),
                    }));
                    notes.push(format!("reference {}: {}", path.display(), message));
                }
            }
        }

        events.send(Event::Normalize(NormalizeEvent::Completed {
            set: IconSet::Reference,
            loaded: icons.len(),
            failed: notes.len(),
        }));

        Self {
            icons,
            total_supplied: references.len(),
            notes,
        }
    }

    /// Usable icons, in reference input order.
    pub fn icons(&self) -> &[LabeledIcon] {
        &self.icons
    }

    /// Number of usable icons.
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Number of reference paths supplied to the build, usable or not.
    pub fn total_supplied(&self) -> usize {
        self.total_supplied
    }

    /// Diagnostic notes for skipped references, in input order.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}
