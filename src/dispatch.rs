//! Fan-out of one fetch task per application instance, with a join barrier.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::domain::AppInstance;
use crate::error::SsoError;
use crate::fetch::{FetchOutcome, ProfileFetcher};

pub struct Dispatcher<F: ProfileFetcher> {
    fetcher: Arc<F>,
}

impl<F: ProfileFetcher> Dispatcher<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    /// Runs one task per instance and waits for all of them.
    ///
    /// Outcomes come back in completion order. A panicked task aborts the
    /// remaining ones and fails the whole batch.
    pub async fn run<I>(&self, instances: I) -> Result<Vec<FetchOutcome>, SsoError>
    where
        I: IntoIterator<Item = AppInstance>,
    {
        let mut join_set = JoinSet::new();
        for instance in instances {
            let fetcher = Arc::clone(&self.fetcher);
            join_set.spawn(async move { fetcher.run(instance).await });
        }

        let expected = join_set.len();
        debug!(tasks = expected, "dispatched profile fetches");

        let mut outcomes = Vec::with_capacity(expected);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    error!("profile fetch task failed: {err}");
                    join_set.abort_all();
                    return Err(SsoError::TaskFailed(err.to_string()));
                }
            }
        }

        debug_assert_eq!(outcomes.len(), expected);
        Ok(outcomes)
    }
}
