use std::io::Write;
use std::path::Path;

use atomicwrites::{AtomicFile, OverwriteBehavior};
use common::{AppError, Result};
use normalizer::BountyIssue;
use prometheus::Encoder;

/// Two-space indented JSON array, `[]` when there is nothing to report.
pub fn render_issues(issues: &[BountyIssue]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(issues)?)
}

pub fn write_issues(path: &Path, issues: &[BountyIssue]) -> Result<()> {
    let rendered = render_issues(issues)?;
    write_atomic(path, &rendered)
}

/// Prometheus text exposition of every registered metric.
pub fn write_metrics(path: &Path) -> Result<()> {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|err| AppError::Other(err.into()))?;
    write_atomic(path, &buffer)
}

/// Replaces `path` in one rename so readers never see a partial file.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file = AtomicFile::new(path, OverwriteBehavior::AllowOverwrite);
    match file.write(|f| f.write_all(contents)) {
        Ok(()) => Ok(()),
        Err(atomicwrites::Error::Internal(e)) | Err(atomicwrites::Error::User(e)) => {
            Err(AppError::io(path, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(number: u64) -> BountyIssue {
        BountyIssue {
            number,
            title: "Crash on start".into(),
            url: format!("https://github.com/acme/widget/issues/{number}"),
            state: "open".into(),
            labels: vec!["💎 Bounty".into()],
            comment_count: 2,
            repository: "acme/widget".into(),
            created_at: "2024-01-02T03:04:05Z".into(),
            updated_at: "2024-01-03T03:04:05Z".into(),
            author: "octocat".into(),
            body: "Steps <to> reproduce & more".into(),
        }
    }

    #[test]
    fn empty_collection_renders_empty_array() {
        assert_eq!(render_issues(&[]).unwrap(), b"[]");
    }

    #[test]
    fn rendering_uses_two_space_indent() {
        let rendered = String::from_utf8(render_issues(&[issue(1)]).unwrap()).unwrap();
        assert!(rendered.starts_with("[\n  {\n    \"number\": 1,\n    \"title\""));
        assert!(rendered.contains("\"created_at\": \"2024-01-02T03:04:05Z\""));
        assert!(rendered.contains("\"labels\": [\n      \"💎 Bounty\"\n    ]"));
        assert!(rendered.ends_with("}\n]"));
    }

    #[test]
    fn write_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bounty_issues.json");
        std::fs::write(&path, "stale content that is much longer than the new one").unwrap();

        write_issues(&path, &[]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"[]");

        write_issues(&path, &[issue(1), issue(2)]).unwrap();
        let parsed: Vec<BountyIssue> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(parsed, vec![issue(1), issue(2)]);
    }

    #[test]
    fn write_into_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = write_issues(&path, &[]).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }
}
