use crate::engine::EngineOptions;
use crate::engine::evaluate::evaluate_page;
use crate::error::{FetchError, FinderError, Result};
use crate::fetchers::Fetcher;
use crate::filter::{KeywordTarget, prepare_sources};
use crate::results::{BatchReport, PageResult, Summary};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Semaphore, mpsc};

/// Outcome of evaluating a single source page
#[derive(Debug)]
pub enum PageOutcome {
    /// At least one unlinked mention was found
    Matched(PageResult),
    /// The page was evaluated and nothing was found
    NoMatches { url: String },
    /// The page could not be fetched
    Failed { url: String, error: FetchError },
}

impl PageOutcome {
    pub fn url(&self) -> &str {
        match self {
            PageOutcome::Matched(result) => &result.url,
            PageOutcome::NoMatches { url } | PageOutcome::Failed { url, .. } => url,
        }
    }
}

/// Completion count reported after every page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// Page that just finished
    pub url: String,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// A running batch whose page outcomes arrive as they complete
pub struct BatchStream {
    /// Pages scheduled
    pub total: usize,
    /// Inputs that are not http(s) or www URLs
    pub invalid: usize,
    /// Duplicates and self-targeting sources
    pub skipped: usize,
    pub outcomes: mpsc::Receiver<PageOutcome>,
    fetcher: Arc<dyn Fetcher>,
}

impl BatchStream {
    /// Release fetcher resources once the outcomes have been drained
    pub async fn shutdown(&self) {
        self.fetcher.shutdown().await;
    }
}

/// Validates inputs and starts evaluating every source page.
///
/// Each page runs in its own task; at most `concurrency` of them fetch or
/// parse at the same time. Fails before scheduling when there are no pairs
/// or when none of the sources is a valid URL.
pub fn spawn_batch<S: AsRef<str>>(
    fetcher: Arc<dyn Fetcher>,
    sources: &[S],
    pairs: Vec<KeywordTarget>,
    options: EngineOptions,
    concurrency: usize,
) -> Result<BatchStream> {
    if pairs.is_empty() {
        return Err(FinderError::NoValidPairs);
    }

    let prepared = prepare_sources(sources, &pairs);
    if prepared.urls.is_empty() && prepared.invalid == sources.len() {
        return Err(FinderError::NoValidSources);
    }

    let total = prepared.urls.len();
    ::log::info!(
        "Processing {} URLs against {} keyword-target pairs ({} dropped: {} skipped, {} invalid)",
        total,
        pairs.len(),
        prepared.dropped(),
        prepared.skipped,
        prepared.invalid
    );

    let (result_tx, result_rx) = mpsc::channel::<PageOutcome>(total.max(1));
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let pairs = Arc::new(pairs);
    let options = Arc::new(options);

    for (worker_id, url) in prepared.urls.into_iter().enumerate() {
        spawn_page_task(
            worker_id,
            url,
            Arc::clone(&fetcher),
            Arc::clone(&pairs),
            Arc::clone(&options),
            Arc::clone(&semaphore),
            result_tx.clone(),
        );
    }

    // Workers hold the remaining senders; the channel closes when the last one finishes.
    drop(result_tx);

    Ok(BatchStream {
        total,
        invalid: prepared.invalid,
        skipped: prepared.skipped,
        outcomes: result_rx,
        fetcher,
    })
}

fn spawn_page_task(
    worker_id: usize,
    url: String,
    fetcher: Arc<dyn Fetcher>,
    pairs: Arc<Vec<KeywordTarget>>,
    options: Arc<EngineOptions>,
    semaphore: Arc<Semaphore>,
    result_tx: mpsc::Sender<PageOutcome>,
) {
    tokio::spawn(async move {
        let Ok(_permit) = semaphore.acquire_owned().await else {
            ::log::error!("Worker {} could not acquire a permit for {}", worker_id, url);
            return;
        };
        ::log::trace!("Worker {} processing: {}", worker_id, url);

        let outcome = match evaluate_page(fetcher.as_ref(), &url, &pairs, &options).await {
            Ok(Some(result)) => PageOutcome::Matched(result),
            Ok(None) => PageOutcome::NoMatches { url },
            Err(error) => {
                ::log::error!("Error processing {}: {}", url, error);
                PageOutcome::Failed { url, error }
            }
        };

        if let Err(e) = result_tx.send(outcome).await {
            ::log::warn!("Worker {} failed to send result: {}", worker_id, e);
        }
    });
}

/// Runs a whole batch and collects every page with opportunities.
///
/// `on_progress` is called once per finished page. Result order follows
/// completion order.
pub async fn run_batch<S, F>(
    fetcher: Arc<dyn Fetcher>,
    sources: &[S],
    pairs: Vec<KeywordTarget>,
    options: EngineOptions,
    concurrency: usize,
    mut on_progress: F,
) -> Result<BatchReport>
where
    S: AsRef<str>,
    F: FnMut(&Progress),
{
    let start = Instant::now();
    let mut stream = spawn_batch(fetcher, sources, pairs, options, concurrency)?;

    let mut summary = Summary {
        sources_total: sources.len(),
        sources_invalid: stream.invalid,
        sources_skipped: stream.skipped,
        pages_evaluated: stream.total,
        ..Summary::default()
    };
    let mut results = Vec::new();
    let mut completed = 0;

    while let Some(outcome) = stream.outcomes.recv().await {
        completed += 1;
        on_progress(&Progress {
            completed,
            total: stream.total,
            url: outcome.url().to_string(),
        });

        match outcome {
            PageOutcome::Matched(result) => {
                summary.pages_with_matches += 1;
                summary.opportunities += result.unlinked_matches.len();
                results.push(result);
            }
            PageOutcome::NoMatches { .. } => {}
            PageOutcome::Failed { .. } => summary.pages_failed += 1,
        }
    }

    stream.shutdown().await;
    summary.elapsed = start.elapsed();
    ::log::info!(
        "Search completed in {:.2} seconds",
        summary.elapsed.as_secs_f64()
    );

    Ok(BatchReport { results, summary })
}
