use anyhow::Result;
use async_trait::async_trait;
use gh_client::GithubRequester;
use normalizer::{IssuePayload, RepoPayload};
use tracing::debug;
use url::Url;

#[async_trait]
pub trait GithubClient: Send + Sync {
    async fn list_org_repos(&self, org: &str, page: u32, per_page: u32)
        -> Result<Vec<RepoPayload>>;

    /// Open issues of `owner/repo` carrying `label`. Pull requests are
    /// included; callers filter them.
    async fn list_labeled_issues(
        &self,
        owner: &str,
        repo: &str,
        label: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<IssuePayload>>;
}

pub struct RestGithubClient {
    requester: GithubRequester,
    base: Url,
}

impl RestGithubClient {
    pub fn new(requester: GithubRequester, base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { requester, base })
    }

    pub fn org_repos_url(&self, org: &str, page: u32, per_page: u32) -> Result<Url> {
        let mut url = self.join(&format!("orgs/{org}/repos"))?;
        Self::with_query(
            &mut url,
            &[
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ],
        );
        Ok(url)
    }

    pub fn labeled_issues_url(
        &self,
        owner: &str,
        repo: &str,
        label: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Url> {
        let mut url = self.join(&format!("repos/{owner}/{repo}/issues"))?;
        Self::with_query(
            &mut url,
            &[
                ("state", "open".to_string()),
                ("labels", label.to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ],
        );
        Ok(url)
    }

    fn join(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    fn with_query(url: &mut Url, params: &[(&str, String)]) {
        let mut query_pairs = url.query_pairs_mut();
        for (key, val) in params {
            query_pairs.append_pair(key, val);
        }
    }
}

#[async_trait]
impl GithubClient for RestGithubClient {
    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RepoPayload>> {
        let url = self.org_repos_url(org, page, per_page)?;
        debug!(org, page, "listing organization repositories");
        Ok(self.requester.get_json(&url).await?)
    }

    async fn list_labeled_issues(
        &self,
        owner: &str,
        repo: &str,
        label: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<IssuePayload>> {
        let url = self.labeled_issues_url(owner, repo, label, page, per_page)?;
        debug!(owner, repo, page, "listing labeled issues");
        Ok(self.requester.get_json(&url).await?)
    }
}
