use serde::{Deserialize, Serialize};

/// One record of the `bounty_issues.json` artifact. Field names are read by
/// the enrichment and dashboard steps and must stay stable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BountyIssue {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub state: String,
    pub labels: Vec<String>,
    pub comment_count: u64,
    pub repository: String,
    pub created_at: String,
    pub updated_at: String,
    pub author: String,
    pub body: String,
}
