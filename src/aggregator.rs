//! Fan-out over the catalog sources.
//!
//! Every source runs on its own thread. Results are collected until all
//! sources have answered or the deadline passes; a source that errors, panics
//! or answers late simply contributes no tags.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::models::SourceResults;
use crate::sources::CategorySource;

/// Deadline used when none is configured.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(20);

/// Queries a fixed, ordered list of [`CategorySource`]s concurrently.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use appenergy::Aggregator;
/// use appenergy::sources::{CategorySource, SourceError};
///
/// struct Fixed;
///
/// impl CategorySource for Fixed {
///     fn name(&self) -> &str {
///         "Fixed"
///     }
///
///     fn fetch_categories(&self, _app: &str) -> Result<Vec<String>, SourceError> {
///         Ok(vec!["Office".to_string()])
///     }
/// }
///
/// let aggregator = Aggregator::new(vec![Arc::new(Fixed)]).with_timeout(Duration::from_secs(1));
/// let results = aggregator.aggregate("LibreOffice");
/// assert_eq!(results.get("Fixed"), Some(&["Office".to_string()][..]));
/// ```
pub struct Aggregator {
    sources: Vec<Arc<dyn CategorySource>>,
    timeout: Duration,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn CategorySource>>) -> Self {
        Self {
            sources,
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    /// Sets how long to wait for the sources (default 20s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn sources(&self) -> &[Arc<dyn CategorySource>] {
        &self.sources
    }

    /// Asks every source for `app_name` and keeps the non-empty answers.
    ///
    /// The result is ordered like the source list, whatever order the
    /// answers arrive in. Sources still running at the deadline are left
    /// to finish on their own; their answers are discarded.
    pub fn aggregate(&self, app_name: &str) -> SourceResults {
        let (tx, rx) = mpsc::channel::<(usize, Vec<String>)>();

        for (index, source) in self.sources.iter().enumerate() {
            let tx = tx.clone();
            let source = Arc::clone(source);
            let app_name = app_name.to_string();

            let spawned = thread::Builder::new()
                .name(format!("source-{index}"))
                .spawn(move || {
                    let tags = source.categories(&app_name);
                    // The receiver is gone once the deadline has passed.
                    let _ = tx.send((index, tags));
                });
            if let Err(e) = spawned {
                warn!(source = source_name(&self.sources, index), error = %e, "failed to start source thread");
            }
        }
        drop(tx);

        // A timeout too large to add to the clock waits for every source.
        let deadline = Instant::now().checked_add(self.timeout);
        let mut answers: Vec<Option<Vec<String>>> = vec![None; self.sources.len()];
        let timed_out = loop {
            let received = match deadline {
                Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok((index, tags)) => answers[index] = Some(tags),
                Err(RecvTimeoutError::Timeout) => break true,
                Err(RecvTimeoutError::Disconnected) => break false,
            }
        };

        let mut results = SourceResults::new();
        for (index, answer) in answers.into_iter().enumerate() {
            let name = source_name(&self.sources, index);
            match answer {
                Some(tags) => results.push(name, tags),
                None if timed_out => {
                    warn!(source = name, app_name, timeout = ?self.timeout, "source missed the deadline");
                }
                None => warn!(source = name, app_name, "source stopped without answering"),
            }
        }

        debug!(
            app_name,
            answered = results.len(),
            sources = self.sources.len(),
            "aggregated catalog tags"
        );
        results
    }
}

fn source_name(sources: &[Arc<dyn CategorySource>], index: usize) -> &str {
    sources[index].name()
}
