//! Environment identification.
//!
//! Pure function of the ambient snapshot. Notebook markers are checked before
//! hostname matching because some judges embed a notebook surface inside
//! their own pages — the notebook wins.

use crate::snapshot::PageSnapshot;
use crate::types::{EnvironmentId, Platform};

/// Structural markers that identify a notebook surface.
const NOTEBOOK_MARKERS: &[&str] = &[
    "jp-Notebook",
    "jp-Cell",
    "notebook-container",
    "notebook-cell",
];

/// Identify the active surface.
pub fn identify_environment(snapshot: &PageSnapshot) -> EnvironmentId {
    if is_notebook(snapshot) {
        return EnvironmentId::Notebook;
    }
    if snapshot.hostname.is_empty() {
        return EnvironmentId::Unknown;
    }
    EnvironmentId::Problem(Platform::from_hostname(&snapshot.hostname))
}

fn is_notebook(snapshot: &PageSnapshot) -> bool {
    snapshot.notebook.is_some()
        || NOTEBOOK_MARKERS
            .iter()
            .any(|marker| snapshot.has_marker(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::NotebookModel;

    fn snapshot_with_host(hostname: &str) -> PageSnapshot {
        PageSnapshot {
            hostname: hostname.to_string(),
            ..PageSnapshot::default()
        }
    }

    #[test]
    fn test_notebook_marker_detected() {
        let mut snapshot = snapshot_with_host("example.org");
        snapshot.markers.insert("jp-Notebook".to_string());
        assert_eq!(identify_environment(&snapshot), EnvironmentId::Notebook);
    }

    #[test]
    fn test_notebook_model_detected_without_markers() {
        let mut snapshot = snapshot_with_host("example.org");
        snapshot.notebook = Some(NotebookModel::default());
        assert_eq!(identify_environment(&snapshot), EnvironmentId::Notebook);
    }

    #[test]
    fn test_notebook_wins_over_platform_hostname() {
        // An embedded notebook on a judge's domain is still a notebook.
        let mut snapshot = snapshot_with_host("app.coderpad.io");
        snapshot.markers.insert("notebook-cell".to_string());
        assert_eq!(identify_environment(&snapshot), EnvironmentId::Notebook);
    }

    #[test]
    fn test_platform_hostnames() {
        assert_eq!(
            identify_environment(&snapshot_with_host("leetcode.com")),
            EnvironmentId::Problem(Platform::LeetCode)
        );
        assert_eq!(
            identify_environment(&snapshot_with_host("atcoder.jp")),
            EnvironmentId::Problem(Platform::AtCoder)
        );
        assert_eq!(
            identify_environment(&snapshot_with_host("blog.example.org")),
            EnvironmentId::Problem(Platform::Generic)
        );
    }

    #[test]
    fn test_empty_snapshot_is_unknown() {
        assert_eq!(
            identify_environment(&PageSnapshot::default()),
            EnvironmentId::Unknown
        );
    }
}
