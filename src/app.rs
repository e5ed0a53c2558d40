use chrono::Utc;
use tracing::{info, warn};

use crate::aggregate::{Output, merge};
use crate::config::PortalConfig;
use crate::discovery::discover;
use crate::dispatch::Dispatcher;
use crate::domain::AppInstance;
use crate::error::SsoError;
use crate::fetch::{FetchTask, ProfileFetcher};
use crate::http::{PortalHttpClient, RetryPolicy};
use crate::transform::{Classified, classify};

pub struct App<F: ProfileFetcher> {
    dispatcher: Dispatcher<F>,
    relay_state_prefix: String,
}

impl App<FetchTask> {
    /// Builds the HTTP-backed pipeline for a resolved portal configuration.
    pub fn from_config(
        config: &PortalConfig,
        policy: RetryPolicy,
    ) -> Result<(Self, PortalHttpClient), SsoError> {
        let client = PortalHttpClient::new(config.headers.clone(), policy)?;
        let fetcher = FetchTask::new(client.clone(), config.base_url.clone());
        Ok((
            Self::new(fetcher, config.relay_state_prefix.clone()),
            client,
        ))
    }
}

impl<F: ProfileFetcher> App<F> {
    pub fn new(fetcher: F, relay_state_prefix: impl Into<String>) -> Self {
        Self {
            dispatcher: Dispatcher::new(fetcher),
            relay_state_prefix: relay_state_prefix.into(),
        }
    }

    /// Fetches, classifies, and merges profiles for every instance.
    pub async fn collect<I>(&self, instances: I) -> Result<Output, SsoError>
    where
        I: IntoIterator<Item = AppInstance>,
    {
        let classified = self.classify_all(instances).await?;
        let empty = classified
            .iter()
            .filter(|item| matches!(item, Classified::Profiles(values) if values.is_empty()))
            .count();

        let output = merge(classified);
        info!(
            profiles = output.result.len(),
            accounts = output.accounts_with_profiles(),
            without_profiles = empty,
            errors = output.errors.len(),
            "report assembled"
        );
        Ok(output)
    }

    /// One entry per instance, in completion order.
    pub async fn classify_all<I>(&self, instances: I) -> Result<Vec<Classified>, SsoError>
    where
        I: IntoIterator<Item = AppInstance>,
    {
        let outcomes = self.dispatcher.run(instances).await?;
        Ok(outcomes
            .into_iter()
            .map(|outcome| classify(outcome, &self.relay_state_prefix))
            .collect())
    }
}

/// Discovers instances and produces the full report.
pub async fn generate(config: &PortalConfig, policy: RetryPolicy) -> Result<Output, SsoError> {
    if config.is_expired(Utc::now()) {
        warn!("SSO access token has expired; run `aws sso login` to refresh it");
    }

    let (app, client) = App::from_config(config, policy)?;
    let instances = discover(&client, &config.base_url).await?;
    app.collect(instances).await
}
