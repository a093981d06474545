pub mod backoff;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod model;

pub use backoff::{RetryDecision, RetryPolicy};
pub use error::RequestError;
pub use executor::{GithubRequester, HttpExec, ReqwestExecutor};
pub use model::{RateLimitUpdate, ThrottleSignal};
