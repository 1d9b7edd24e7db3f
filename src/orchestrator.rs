use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::{future, FutureExt};
use tracing::{error, info, warn};

use crate::fetcher::Fetcher;
use crate::film::{dedup_films, ScrapeResult};
use crate::job::SourceJob;

/// Runs a fixed list of source jobs, one after another.
pub struct Orchestrator {
    jobs: Vec<SourceJob>,
}

impl Orchestrator {
    pub fn new(jobs: Vec<SourceJob>) -> Self {
        Self { jobs }
    }

    pub fn jobs(&self) -> &[SourceJob] {
        &self.jobs
    }

    /// Scrape every job in order and merge the results.
    ///
    /// A failing job adds one entry to `errors` and loses its films; the
    /// other jobs are unaffected. Duplicates by `(title, year)` keep the
    /// earliest film, so job order decides which copy survives.
    pub async fn scrape_all(&self, fetcher: &dyn Fetcher) -> ScrapeResult {
        self.scrape_all_until(fetcher, future::pending::<()>()).await
    }

    /// Like [`Orchestrator::scrape_all`], but gives up when `shutdown` resolves.
    ///
    /// An interrupted run is not a success: it returns the films gathered so
    /// far (not deduplicated) and ends `errors` with the interruption.
    pub async fn scrape_all_until<S>(&self, fetcher: &dyn Fetcher, shutdown: S) -> ScrapeResult
    where
        S: Future,
    {
        info!("Starting film scraping across {} sources", self.jobs.len());
        let mut films = Vec::new();
        let mut errors = Vec::new();
        tokio::pin!(shutdown);

        for job in &self.jobs {
            let outcome = tokio::select! {
                outcome = AssertUnwindSafe(job.run(fetcher)).catch_unwind() => outcome,
                _ = &mut shutdown => {
                    error!("Scraping interrupted during {}", job.label);
                    let cause = format!("Interrupted while scraping {}", job.label);
                    return ScrapeResult::aborted(films, errors, cause);
                }
            };

            match outcome {
                Ok(Ok(found)) => films.extend(found),
                Ok(Err(e)) => {
                    warn!("Error scraping {}: {:#}", job.label, e);
                    errors.push(format!("Failed to scrape {}: {:#}", job.label, e));
                }
                Err(payload) => {
                    let cause = panic_message(payload.as_ref());
                    warn!("Scraper for {} panicked: {}", job.label, cause);
                    errors.push(format!("Failed to scrape {}: {}", job.label, cause));
                }
            }
        }

        let unique = dedup_films(&films);
        info!("Scraping completed: {} unique films found", unique.len());
        ScrapeResult::completed(unique, errors)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "Unknown error".to_string())
}
