pub mod models;
pub mod payloads;
pub mod reward;
pub mod transform;

pub use models::BountyIssue;
pub use payloads::{IssuePayload, LabelPayload, RepoPayload, UserRef};
pub use reward::{bounty_amount, BountyTier};
pub use transform::{normalize_issue, normalize_issues};
