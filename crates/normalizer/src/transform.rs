use crate::models::BountyIssue;
use crate::payloads::IssuePayload;

pub fn normalize_issue(payload: &IssuePayload, repository: &str) -> BountyIssue {
    BountyIssue {
        number: payload.number,
        title: payload.title.clone(),
        url: payload.html_url.clone(),
        state: payload.state.clone(),
        labels: payload.labels.iter().map(|l| l.name.clone()).collect(),
        comment_count: payload.comments,
        repository: repository.to_string(),
        created_at: payload.created_at.clone(),
        updated_at: payload.updated_at.clone(),
        author: payload
            .user
            .as_ref()
            .map(|u| u.login.clone())
            .unwrap_or_default(),
        body: payload.body.clone().unwrap_or_default(),
    }
}

/// Drops pull requests and projects the rest, keeping API order.
pub fn normalize_issues<'a, I>(repository: &str, payloads: I) -> Vec<BountyIssue>
where
    I: IntoIterator<Item = &'a IssuePayload>,
{
    payloads
        .into_iter()
        .filter(|payload| !payload.is_pull_request())
        .map(|payload| normalize_issue(payload, repository))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(number: u64, pull_request: bool) -> IssuePayload {
        let mut value = json!({
            "number": number,
            "title": format!("Issue {number}"),
            "html_url": format!("https://github.com/acme/widget/issues/{number}"),
            "state": "open",
            "labels": [{"name": "💎 Bounty"}, {"name": "$250"}],
            "comments": 4,
            "created_at": "2024-01-02T03:04:05Z",
            "updated_at": "2024-02-03T04:05:06Z",
            "user": {"login": "octocat"},
            "body": "Fix the thing"
        });
        if pull_request {
            value["pull_request"] = json!({"url": "https://api.github.com/repos/acme/widget/pulls/1"});
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn issue_fields_are_projected() {
        let issue = normalize_issue(&payload(7, false), "acme/widget");
        assert_eq!(issue.number, 7);
        assert_eq!(issue.title, "Issue 7");
        assert_eq!(issue.url, "https://github.com/acme/widget/issues/7");
        assert_eq!(issue.labels, vec!["💎 Bounty", "$250"]);
        assert_eq!(issue.comment_count, 4);
        assert_eq!(issue.repository, "acme/widget");
        assert_eq!(issue.author, "octocat");
        assert_eq!(issue.body, "Fix the thing");
        assert_eq!(issue.created_at, "2024-01-02T03:04:05Z");
        assert_eq!(issue.updated_at, "2024-02-03T04:05:06Z");
    }

    #[test]
    fn pull_requests_are_excluded() {
        let raw = vec![payload(1, true), payload(2, false), payload(3, true)];
        let issues = normalize_issues("acme/widget", &raw);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 2);
    }

    #[test]
    fn only_pull_requests_yield_nothing() {
        let raw = vec![payload(1, true), payload(2, true)];
        assert!(normalize_issues("acme/widget", &raw).is_empty());
    }

    #[test]
    fn null_pull_request_marker_is_an_issue() {
        let mut value = json!({
            "number": 9,
            "title": "t",
            "html_url": "u",
            "state": "open",
            "created_at": "2024-01-02T03:04:05Z",
            "updated_at": "2024-01-02T03:04:05Z",
            "user": null,
            "body": null
        });
        value["pull_request"] = serde_json::Value::Null;
        let raw: IssuePayload = serde_json::from_value(value).unwrap();
        let issues = normalize_issues("acme/widget", [&raw]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].author, "");
        assert_eq!(issues[0].body, "");
        assert!(issues[0].labels.is_empty());
        assert_eq!(issues[0].comment_count, 0);
    }

    #[test]
    fn serialized_field_names_are_stable() {
        let issue = normalize_issue(&payload(7, false), "acme/widget");
        let value = serde_json::to_value(&issue).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        for key in [
            "number",
            "title",
            "url",
            "state",
            "labels",
            "comment_count",
            "repository",
            "created_at",
            "updated_at",
            "author",
            "body",
        ] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(value["created_at"], "2024-01-02T03:04:05Z");
    }

    #[test]
    fn timestamps_pass_through_untouched() {
        let value = json!({
            "number": 11,
            "title": "t",
            "html_url": "u",
            "state": "open",
            "created_at": "2024-01-02T12:04:05+09:00",
            "updated_at": "not a timestamp",
            "user": {"login": "octocat"},
            "body": null
        });
        let raw: IssuePayload = serde_json::from_value(value).unwrap();
        let issue = normalize_issue(&raw, "acme/widget");
        assert_eq!(issue.created_at, "2024-01-02T12:04:05+09:00");
        assert_eq!(issue.updated_at, "not a timestamp");

        let rendered = serde_json::to_value(&issue).unwrap();
        assert_eq!(rendered["created_at"], "2024-01-02T12:04:05+09:00");
    }
}
