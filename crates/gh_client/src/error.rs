use http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("could not build request for {endpoint}: {source}")]
    InvalidRequest {
        endpoint: String,
        #[source]
        source: http::Error,
    },
    #[error("transport error for {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("HTTP {status} for {endpoint} after {attempts} attempt(s): {}", body_preview(.body))]
    Status {
        status: StatusCode,
        endpoint: String,
        attempts: u32,
        body: String,
    },
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn attempts(&self) -> Option<u32> {
        match self {
            RequestError::Status { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

pub(crate) fn body_preview(body: &str) -> String {
    truncate_str(body.trim(), 256)
}

fn truncate_str(value: &str, limit: usize) -> String {
    if value.is_empty() {
        return String::new();
    }
    let mut truncated: String = value.chars().take(limit).collect();
    if truncated.len() < value.len() {
        truncated.push('…');
    }
    truncated
}
