use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use common::{config::AppConfig, logging, AppError};
use fetcher::{BountyCollector, RestGithubClient};
use gh_client::{GithubRequester, ReqwestExecutor, RetryPolicy};
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    let token = config.github.resolved_token();
    if token.is_none() {
        warn!("GITHUB_TOKEN not set, using unauthenticated requests (rate limited to 60/hour)");
    }

    let exec = ReqwestExecutor::new(
        &config.github.user_agent,
        Duration::from_secs(config.github.timeout_secs),
    )
    .map_err(AppError::http)?;
    let policy = RetryPolicy::new(
        config.retry.max_attempts,
        Duration::from_millis(config.retry.backoff_unit_ms),
        Duration::from_secs(config.retry.max_wait_secs),
    );
    let requester = GithubRequester::new(Arc::new(exec), policy)
        .with_token(token)
        .with_user_agent(config.github.user_agent.clone());
    let client = Arc::new(
        RestGithubClient::new(requester, &config.github.api_base_url)
            .context("invalid github.api_base_url")?,
    );

    let collector = BountyCollector::new(config.fetcher.clone(), client);
    let report = collector.run_once().await?;
    info!(
        path = %config.fetcher.output_path.display(),
        issues = report.issues.len(),
        "results saved"
    );
    Ok(())
}
