use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use common::config::FetcherConfig;
use normalizer::{
    bounty_amount, normalize_issues, BountyIssue, BountyTier, IssuePayload, RepoPayload,
};
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::client::GithubClient;
use crate::metrics;
use crate::output;
use crate::pagination::collect_pages;

#[derive(Debug, Clone)]
pub struct RepoFailure {
    pub repository: String,
    pub error: String,
}

/// Everything a run produced. Repositories listed in `failures` contributed
/// no issues.
#[derive(Debug, Default)]
pub struct RunReport {
    pub repositories: usize,
    pub issues: Vec<BountyIssue>,
    pub failures: Vec<RepoFailure>,
}

impl RunReport {
    pub fn reward_total(&self) -> u64 {
        self.issues
            .iter()
            .filter_map(|issue| bounty_amount(&issue.labels))
            .sum()
    }

    /// Issues without a dollar label are not counted in any tier.
    pub fn tier_counts(&self) -> BTreeMap<BountyTier, usize> {
        let mut counts = BTreeMap::new();
        for amount in self
            .issues
            .iter()
            .filter_map(|issue| bounty_amount(&issue.labels))
        {
            *counts.entry(BountyTier::from_amount(amount)).or_insert(0) += 1;
        }
        counts
    }
}

pub struct BountyCollector<C: GithubClient + ?Sized> {
    config: FetcherConfig,
    client: Arc<C>,
}

impl<C: GithubClient + ?Sized> BountyCollector<C> {
    pub fn new(config: FetcherConfig, client: Arc<C>) -> Self {
        Self { config, client }
    }

    pub async fn list_repositories(&self) -> Result<Vec<RepoPayload>> {
        let client = &*self.client;
        let org = self.config.org.as_str();
        let per_page = self.config.page_size;
        collect_pages(move |page| client.list_org_repos(org, page, per_page)).await
    }

    pub async fn fetch_bounty_issues(&self, repo: &RepoPayload) -> Result<Vec<IssuePayload>> {
        let client = &*self.client;
        let org = self.config.org.as_str();
        let label = self.config.label.as_str();
        let per_page = self.config.page_size;
        let name = repo.name.as_str();
        collect_pages(move |page| client.list_labeled_issues(org, name, label, page, per_page))
            .await
    }

    /// Lists the organization and gathers bounty issues repository by
    /// repository. Only the listing can fail the run.
    #[instrument(skip(self), fields(org = %self.config.org, label = %self.config.label))]
    pub async fn collect(&self) -> Result<RunReport> {
        info!("fetching repositories");
        let repos = self
            .list_repositories()
            .await
            .with_context(|| format!("listing repositories of {}", self.config.org))?;
        info!(count = repos.len(), "found repositories");

        let delay = Duration::from_millis(self.config.request_delay_ms);
        let total = repos.len();
        let mut report = RunReport {
            repositories: total,
            ..RunReport::default()
        };

        for (index, repo) in repos.iter().enumerate() {
            info!(
                index = index + 1,
                total,
                repository = %repo.full_name,
                "checking repository"
            );
            sleep(delay).await;

            match self.fetch_bounty_issues(repo).await {
                Ok(raw) => {
                    metrics::REPOS_PROCESSED_TOTAL
                        .with_label_values(&["success"])
                        .inc();
                    report
                        .issues
                        .extend(normalize_issues(&repo.full_name, &raw));
                }
                Err(err) => {
                    metrics::REPOS_PROCESSED_TOTAL
                        .with_label_values(&["error"])
                        .inc();
                    warn!(
                        repository = %repo.full_name,
                        error = %err,
                        "failed to fetch issues, skipping repository"
                    );
                    report.failures.push(RepoFailure {
                        repository: repo.full_name.clone(),
                        error: format!("{err:#}"),
                    });
                }
            }
        }

        metrics::BOUNTY_ISSUES.set(report.issues.len() as i64);
        Ok(report)
    }

    /// Collects, then replaces the output file. Nothing is written when the
    /// listing fails, so the previous artifact survives.
    pub async fn run_once(&self) -> Result<RunReport> {
        let timer = metrics::RUN_DURATION.start_timer();
        let report = self.collect().await?;

        let output_path = &self.config.output_path;
        output::write_issues(output_path, &report.issues)
            .with_context(|| format!("writing {}", output_path.display()))?;

        let tiers = report
            .tier_counts()
            .into_iter()
            .map(|(tier, count)| format!("{}={count}", tier.as_str()))
            .collect::<Vec<_>>()
            .join(" ");
        info!(
            issues = report.issues.len(),
            repositories = report.repositories,
            failed_repositories = report.failures.len(),
            reward_total = report.reward_total(),
            tiers = %tiers,
            output = %output_path.display(),
            "total bounty issues found"
        );

        timer.observe_duration();
        if let Some(metrics_path) = &self.config.metrics_path {
            if let Err(err) = output::write_metrics(metrics_path) {
                warn!(path = %metrics_path.display(), error = %err, "failed to write metrics");
            }
        }
        Ok(report)
    }
}
