pub mod client;
pub mod metrics;
pub mod output;
pub mod pagination;
pub mod service;

pub use client::{GithubClient, RestGithubClient};
pub use service::{BountyCollector, RepoFailure, RunReport};
