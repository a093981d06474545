use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use http::{header, HeaderMap};

#[derive(Debug, Clone)]
pub struct RateLimitUpdate {
    pub limit: i64,
    pub remaining: i64,
    pub reset: DateTime<Utc>,
}

pub fn parse_rate_limit(headers: &HeaderMap) -> Option<RateLimitUpdate> {
    let limit = header_i64(headers, "x-ratelimit-limit")?;
    let remaining = header_i64(headers, "x-ratelimit-remaining")?;
    let reset_ts = header_i64(headers, "x-ratelimit-reset")?;
    let reset = DateTime::from_timestamp(reset_ts, 0)?;
    Some(RateLimitUpdate {
        limit,
        remaining,
        reset,
    })
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
}

/// Accepts both delta-seconds and HTTP-date forms. Dates in the past yield `None`.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(header::RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let date = httpdate::parse_http_date(value).ok()?;
    date.duration_since(SystemTime::now()).ok()
}

/// What a non-200 response says about throttling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThrottleSignal {
    pub rate_limited: bool,
    pub retry_after: Option<Duration>,
}

impl ThrottleSignal {
    pub fn from_response(headers: &HeaderMap, body: &[u8]) -> Self {
        let retry_after = parse_retry_after(headers);
        let exhausted = header_i64(headers, "x-ratelimit-remaining") == Some(0);
        let rate_limited = retry_after.is_some() || exhausted || mentions_rate_limit(body);
        Self {
            rate_limited,
            retry_after,
        }
    }
}

fn mentions_rate_limit(body: &[u8]) -> bool {
    String::from_utf8_lossy(body)
        .to_ascii_lowercase()
        .contains("rate limit")
}
