use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use http::{header, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::backoff::{RetryDecision, RetryPolicy};
use crate::error::RequestError;
use crate::metrics;
use crate::model::{parse_rate_limit, ThrottleSignal};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

#[async_trait]
pub trait HttpExec: Send + Sync {
    async fn execute(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>>;
}

pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpExec for ReqwestExecutor {
    async fn execute(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let (parts, body) = req.into_parts();
        let builder = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers);
        let resp = builder.body(body).send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await?;
        let mut response = Response::new(bytes.to_vec());
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Issues GET requests against the GitHub REST API, retrying throttled
/// responses according to a [`RetryPolicy`].
#[derive(Clone)]
pub struct GithubRequester {
    exec: Arc<dyn HttpExec>,
    policy: RetryPolicy,
    token: Option<String>,
    user_agent: String,
}

impl GithubRequester {
    pub fn new(exec: Arc<dyn HttpExec>, policy: RetryPolicy) -> Self {
        Self {
            exec,
            policy,
            token: None,
            user_agent: "bounty-fetcher".to_string(),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, RequestError> {
        let body = self.get(url).await?;
        serde_json::from_slice(&body).map_err(|source| RequestError::Decode {
            endpoint: endpoint_of(url),
            source,
        })
    }

    /// Returns the body of a 200 response. Anything else is an error once the
    /// retry budget allows no further attempt.
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn get(&self, url: &Url) -> Result<Vec<u8>, RequestError> {
        let endpoint = endpoint_of(url);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let request = self
                .build_request(url)
                .map_err(|source| RequestError::InvalidRequest {
                    endpoint: endpoint.clone(),
                    source,
                })?;

            debug!(endpoint = %endpoint, attempt, "Dispatching GitHub request");
            let start = Instant::now();
            let response = match self.exec.execute(request).await {
                Ok(response) => response,
                Err(source) => {
                    metrics::TRANSPORT_ERRORS_TOTAL.inc();
                    return Err(RequestError::Transport {
                        endpoint: endpoint.clone(),
                        source,
                    });
                }
            };
            metrics::LATENCY.observe(start.elapsed().as_secs_f64());

            let status = response.status();
            metrics::REQUESTS_TOTAL
                .with_label_values(&[metrics::status_class(status)])
                .inc();
            if status == StatusCode::OK {
                return Ok(response.into_body());
            }

            let signal = ThrottleSignal::from_response(response.headers(), response.body());
            match self.policy.decide(attempt, status, &signal) {
                RetryDecision::Retry(wait) => {
                    let rate_info = parse_rate_limit(response.headers());
                    warn!(
                        status = %status,
                        endpoint = %endpoint,
                        attempt,
                        max_attempts = self.policy.max_attempts(),
                        wait_ms = wait.as_millis() as u64,
                        rate_limit_remaining = rate_info.as_ref().map(|data| data.remaining),
                        rate_limit_reset = rate_info.as_ref().map(|data| data.reset.timestamp()),
                        "GitHub throttled request, retrying"
                    );
                    metrics::RETRIES_TOTAL
                        .with_label_values(&[metrics::retry_reason(status)])
                        .inc();
                    sleep(wait).await;
                }
                RetryDecision::Fail => {
                    return Err(RequestError::Status {
                        status,
                        endpoint,
                        attempts: attempt,
                        body: String::from_utf8_lossy(response.body()).into_owned(),
                    });
                }
            }
        }
    }

    fn build_request(&self, url: &Url) -> Result<Request<Vec<u8>>, http::Error> {
        let mut builder = Request::builder()
            .method("GET")
            .uri(url.as_str())
            .header(header::USER_AGENT, self.user_agent.as_str())
            .header(header::ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Vec::new())
    }
}

fn endpoint_of(url: &Url) -> String {
    url.path().trim_start_matches('/').to_string()
}
