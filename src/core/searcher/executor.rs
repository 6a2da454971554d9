//! Batch execution of the best-match search.

use crate::core::normalizer::Normalizer;
use crate::core::scorer;
use crate::error::SearchError;
use crate::events::{
    null_sender, BatchEvent, BatchPhase, BatchSummary, Event, EventSender, IconSet,
    NormalizeEvent, SearchEvent, SearchProgress,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::{source_id, MatchResult, ReferenceCache, SearchResult};

/// Shared cancellation handle.
///
/// Cloning yields another handle to the same flag. Once set, the
/// current batch stops before its next query and returns
/// [`SearchError::Cancelled`]; call [`CancelFlag::reset`] before
/// reusing the same [`Matcher`].
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the running batch.
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    /// Clear the flag so the owning matcher can run again.
    pub fn reset(&self) {
        self.inner.store(false, Ordering::SeqCst);
    }
}

/// Tuning knobs for a [`Matcher`].
#[derive(Debug, Clone, Default)]
pub struct MatcherConfig {
    /// Fixed worker pool size, covering both reference normalization
    /// and the query scan. `None` runs on the global rayon pool.
    pub worker_threads: Option<usize>,
}

/// Pairs every query icon with its highest-correlating reference icon.
///
/// The matcher holds no per-batch state; every call to
/// [`Matcher::find_best_matches`] is a pure function of its inputs
/// (plus the shared cancellation flag).
#[derive(Debug, Default)]
pub struct Matcher {
    config: MatcherConfig,
    normalizer: Normalizer,
    cancel: CancelFlag,
}

/// What happened to a single query slot.
enum QueryOutcome {
    Matched(MatchResult),
    Skipped { note: String },
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatcherConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Handle for aborting a running batch from another thread.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run the search without event reporting.
    pub fn find_best_matches(
        &self,
        queries: &[PathBuf],
        references: &[PathBuf],
    ) -> Result<SearchResult, SearchError> {
        self.find_best_matches_with_events(queries, references, &null_sender())
    }

    /// Run the search, reporting progress through `events`.
    ///
    /// References are normalized once into an immutable cache, then the
    /// queries are scanned in parallel. Results keep query input order.
    pub fn find_best_matches_with_events(
        &self,
        queries: &[PathBuf],
        references: &[PathBuf],
        events: &EventSender,
    ) -> Result<SearchResult, SearchError> {
        events.send(Event::Batch(BatchEvent::Started));

        match self.run_batch(queries, references, events) {
            Ok(result) => {
                events.send(Event::Batch(BatchEvent::Completed {
                    summary: BatchSummary {
                        total_queries: result.total_queries,
                        matched_queries: result.results.len(),
                        total_references: result.total_references,
                        usable_references: result.usable_references,
                        duration_ms: result.duration_ms,
                    },
                }));
                Ok(result)
            }
            Err(SearchError::Cancelled) => {
                events.send(Event::Batch(BatchEvent::Cancelled));
                Err(SearchError::Cancelled)
            }
            Err(e) => {
                events.send(Event::Batch(BatchEvent::Error {
                    message: e.to_string(),
                }));
                Err(e)
            }
        }
    }

    /// Resolve the worker pool, then run both batch phases inside it.
    ///
    /// Reference normalization is as parallel as the query scan, so the
    /// dedicated pool has to cover both; installing it around the scan
    /// alone would leave the normalization fan-out on the global pool.
    fn run_batch(
        &self,
        queries: &[PathBuf],
        references: &[PathBuf],
        events: &EventSender,
    ) -> Result<SearchResult, SearchError> {
        match self.config.worker_threads {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(|| self.run_phases(queries, references, events)),
                Err(e) => {
                    warn!(error = %e, "Failed to build dedicated worker pool, using global pool");
                    self.run_phases(queries, references, events)
                }
            },
            None => self.run_phases(queries, references, events),
        }
    }

    fn run_phases(
        &self,
        queries: &[PathBuf],
        references: &[PathBuf],
        events: &EventSender,
    ) -> Result<SearchResult, SearchError> {
        let started = Instant::now();

        if self.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        events.send(Event::Batch(BatchEvent::PhaseChanged {
            phase: BatchPhase::Normalizing,
        }));
        let cache = ReferenceCache::build(&self.normalizer, references, events);
        if cache.is_empty() {
            return Err(SearchError::EmptyReferenceSet {
                total: cache.total_supplied(),
                failed: cache.notes().len(),
            });
        }

        events.send(Event::Batch(BatchEvent::PhaseChanged {
            phase: BatchPhase::Matching,
        }));
        events.send(Event::Search(SearchEvent::Started {
            total_queries: queries.len(),
            usable_references: cache.len(),
        }));

        let completed = AtomicUsize::new(0);
        let outcomes: Vec<QueryOutcome> = queries
            .par_iter()
            .map(|path| self.scan_query(path, &cache, events, &completed, queries.len()))
            .collect::<Result<_, _>>()?;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut errors: Vec<String> = cache.notes().to_vec();
        let mut skipped = 0usize;
        for outcome in outcomes {
            match outcome {
                QueryOutcome::Matched(result) => results.push(result),
                QueryOutcome::Skipped { note } => {
                    skipped += 1;
                    errors.push(note);
                }
            }
        }

        events.send(Event::Search(SearchEvent::Completed {
            matched: results.len(),
            skipped,
        }));

        let duration_ms = started.elapsed().as_millis() as u64;
        debug!(
            total_queries = queries.len(),
            matched = results.len(),
            usable_references = cache.len(),
            skipped_loads = errors.len(),
            duration_ms,
            "Search batch finished"
        );

        Ok(SearchResult {
            results,
            total_queries: queries.len(),
            usable_references: cache.len(),
            total_references: cache.total_supplied(),
            errors,
            duration_ms,
        })
    }

    /// Scan one query against the full reference cache.
    ///
    /// The best slot starts at score -1.0 with no match and is replaced
    /// only on a strictly greater score, so the first reference
    /// reaching the maximum wins ties. `>=` here would silently change
    /// which icon wins under ties.
    fn scan_query(
        &self,
        path: &Path,
        cache: &ReferenceCache,
        events: &EventSender,
        completed: &AtomicUsize,
        total_queries: usize,
    ) -> Result<QueryOutcome, SearchError> {
        if self.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let raster = match self.normalizer.normalize_file(path) {
            Ok(raster) => raster,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable query icon");
                events.send(Event::Normalize(NormalizeEvent::Error {
                    set: IconSet::Query,
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }));
                Self::tick_progress(events, completed, total_queries);
                return Ok(QueryOutcome::Skipped {
                    note: format!("query {}: {}", path.display(), e),
                });
            }
        };

        let mut best_score = -1.0f64;
        let mut best_match: Option<&str> = None;
        for icon in cache.icons() {
            let score = scorer::score(&raster, &icon.raster)?;
            if score > best_score {
                best_score = score;
                best_match = Some(icon.id.as_str());
            }
        }

        let result = MatchResult {
            query: source_id(path),
            best_match: best_match.map(str::to_owned),
            score: best_score,
        };
        events.send(Event::Search(SearchEvent::QueryMatched {
            query: result.query.clone(),
            best_match: result.best_match.clone(),
            score: result.score,
        }));
        Self::tick_progress(events, completed, total_queries);

        Ok(QueryOutcome::Matched(result))
    }

    fn tick_progress(events: &EventSender, completed: &AtomicUsize, total_queries: usize) {
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        events.send(Event::Search(SearchEvent::Progress(SearchProgress {
            queries_completed: done,
            total_queries,
        })));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use image::{GrayImage, Luma};
    use std::fs;
    use tempfile::TempDir;

    fn gradient_icon(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        GrayImage::from_fn(32, 32, |x, y| Luma([(x * 6 + y * 2) as u8]))
            .save(&path)
            .unwrap();
        path
    }

    fn inverse_gradient_icon(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        GrayImage::from_fn(32, 32, |x, y| Luma([255 - (x * 6 + y * 2) as u8]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn finds_the_matching_reference() {
        let dir = TempDir::new().unwrap();
        let query = gradient_icon(&dir, "query.png");
        let same = gradient_icon(&dir, "same.png");
        let opposite = inverse_gradient_icon(&dir, "opposite.png");

        let outcome = Matcher::new()
            .find_best_matches(&[query], &[opposite, same])
            .unwrap();

        assert_eq!(outcome.results.len(), 1);
        let result = &outcome.results[0];
        assert_eq!(result.query, "query.png");
        assert_eq!(result.best_match.as_deref(), Some("same.png"));
        assert!((result.score - 1.0).abs() < 1e-3);
        assert_eq!(outcome.usable_references, 2);
        assert_eq!(outcome.total_references, 2);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn empty_reference_set_fails_the_batch() {
        let dir = TempDir::new().unwrap();
        let query = gradient_icon(&dir, "query.png");

        let result = Matcher::new().find_best_matches(&[query], &[]);
        match result {
            Err(SearchError::EmptyReferenceSet { total, failed }) => {
                assert_eq!(total, 0);
                assert_eq!(failed, 0);
            }
            other => panic!("Expected empty reference error, got {:?}", other),
        }
    }

    #[test]
    fn all_references_unreadable_fails_the_batch() {
        let dir = TempDir::new().unwrap();
        let query = gradient_icon(&dir, "query.png");
        let broken = dir.path().join("broken.png");
        fs::write(&broken, b"garbage").unwrap();

        let result = Matcher::new().find_best_matches(&[query], &[broken]);
        match result {
            Err(SearchError::EmptyReferenceSet { total, failed }) => {
                assert_eq!(total, 1);
                assert_eq!(failed, 1);
            }
            other => panic!("Expected empty reference error, got {:?}", other),
        }
    }

    #[test]
    fn unreadable_query_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let good = gradient_icon(&dir, "good.png");
        let broken = dir.path().join("broken.png");
        fs::write(&broken, b"garbage").unwrap();
        let reference = gradient_icon(&dir, "ref.png");

        let outcome = Matcher::new()
            .find_best_matches(&[broken, good], &[reference])
            .unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].query, "good.png");
        assert_eq!(outcome.total_queries, 2);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("broken.png"));
    }

    #[test]
    fn results_keep_query_input_order() {
        let dir = TempDir::new().unwrap();
        let queries: Vec<PathBuf> = (0..8u32)
            .map(|i| {
                let path = dir.path().join(format!("q{}.png", i));
                GrayImage::from_fn(32, 32, |x, y| Luma([((x * 3 + y + i * 20) % 256) as u8]))
                    .save(&path)
                    .unwrap();
                path
            })
            .collect();
        let reference = gradient_icon(&dir, "ref.png");

        let outcome = Matcher::with_config(MatcherConfig {
            worker_threads: Some(4),
        })
        .find_best_matches(&queries, &[reference])
        .unwrap();

        let ids: Vec<&str> = outcome.results.iter().map(|r| r.query.as_str()).collect();
        let expected: Vec<String> = (0..8).map(|i| format!("q{}.png", i)).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn dedicated_pool_covers_reference_normalization() {
        let dir = TempDir::new().unwrap();
        let query = gradient_icon(&dir, "query.png");
        let mut references: Vec<PathBuf> = (0..6u32)
            .map(|i| {
                let path = dir.path().join(format!("r{}.png", i));
                GrayImage::from_fn(32, 32, |x, y| Luma([((x * 5 + y * 9 + i * 40) % 256) as u8]))
                    .save(&path)
                    .unwrap();
                path
            })
            .collect();
        references.push(gradient_icon(&dir, "twin.png"));

        let pooled = Matcher::with_config(MatcherConfig {
            worker_threads: Some(2),
        })
        .find_best_matches(&[query.clone()], &references)
        .unwrap();
        let global = Matcher::new()
            .find_best_matches(&[query], &references)
            .unwrap();

        assert_eq!(pooled.usable_references, 7);
        assert_eq!(pooled.results[0].best_match.as_deref(), Some("twin.png"));
        assert_eq!(pooled.results, global.results);
    }

    #[test]
    fn tie_break_keeps_the_first_reference() {
        let dir = TempDir::new().unwrap();
        let query = gradient_icon(&dir, "query.png");
        let twin_a = gradient_icon(&dir, "twin_a.png");
        let twin_b = gradient_icon(&dir, "twin_b.png");

        let matcher = Matcher::new();

        let forward = matcher
            .find_best_matches(&[query.clone()], &[twin_a.clone(), twin_b.clone()])
            .unwrap();
        assert_eq!(forward.results[0].best_match.as_deref(), Some("twin_a.png"));

        let reversed = matcher
            .find_best_matches(&[query], &[twin_b, twin_a])
            .unwrap();
        assert_eq!(reversed.results[0].best_match.as_deref(), Some("twin_b.png"));
    }

    #[test]
    fn repeated_runs_yield_identical_results() {
        let dir = TempDir::new().unwrap();
        let queries = vec![gradient_icon(&dir, "q1.png"), gradient_icon(&dir, "q2.png")];
        let references = vec![
            inverse_gradient_icon(&dir, "r1.png"),
            gradient_icon(&dir, "r2.png"),
        ];

        let matcher = Matcher::new();
        let first = matcher.find_best_matches(&queries, &references).unwrap();
        let second = matcher.find_best_matches(&queries, &references).unwrap();
        assert_eq!(first.results, second.results);
    }

    #[test]
    fn cancelled_batch_reports_no_results() {
        let dir = TempDir::new().unwrap();
        let query = gradient_icon(&dir, "query.png");
        let reference = gradient_icon(&dir, "ref.png");

        let matcher = Matcher::new();
        matcher.cancel_flag().cancel();

        let result = matcher.find_best_matches(&[query.clone()], &[reference.clone()]);
        assert!(matches!(result, Err(SearchError::Cancelled)));

        matcher.cancel_flag().reset();
        let outcome = matcher.find_best_matches(&[query], &[reference]).unwrap();
        assert_eq!(outcome.results.len(), 1);
    }

    #[test]
    fn progress_events_cover_every_query() {
        let dir = TempDir::new().unwrap();
        let queries = vec![gradient_icon(&dir, "q1.png"), gradient_icon(&dir, "q2.png")];
        let reference = gradient_icon(&dir, "ref.png");

        let (sender, receiver) = EventChannel::new();
        Matcher::new()
            .find_best_matches_with_events(&queries, &[reference], &sender)
            .unwrap();
        drop(sender);

        let mut progress = Vec::new();
        let mut saw_started = false;
        let mut saw_completed = false;
        while let Some(event) = receiver.try_recv() {
            match event {
                Event::Search(SearchEvent::Progress(p)) => progress.push(p.queries_completed),
                Event::Search(SearchEvent::Started { total_queries, .. }) => {
                    saw_started = true;
                    assert_eq!(total_queries, 2);
                }
                Event::Search(SearchEvent::Completed { matched, skipped }) => {
                    saw_completed = true;
                    assert_eq!(matched, 2);
                    assert_eq!(skipped, 0);
                }
                _ => {}
            }
        }

        assert!(saw_started);
        assert!(saw_completed);
        progress.sort_unstable();
        assert_eq!(progress, vec![1, 2]);
    }
}
