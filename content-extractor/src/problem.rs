//! Problem-statement extraction from snapshot regions.
//!
//! Each platform variant knows which named regions carry its title, body and
//! sample blocks. The generic probe walks a preference list of region names
//! and accepts the first one with enough text to be a real statement.

use async_trait::async_trait;

use crate::registry::Extract;
use crate::snapshot::PageSnapshot;
use crate::types::{Bundle, Platform, ProblemBundle};

/// Region-driven extractor for one platform.
pub struct RegionExtractor {
    title_regions: &'static [&'static str],
    body_regions: &'static [&'static str],
    /// Labeled sample blocks appended after the body.
    sample_regions: &'static [(&'static str, &'static str)],
    default_title: &'static str,
}

impl RegionExtractor {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::HackerRank => Self {
                title_regions: &["page-label", "challenge-name"],
                body_regions: &["challenge-body"],
                sample_regions: &[
                    ("Sample Input", "sample-input"),
                    ("Sample Output", "sample-output"),
                ],
                default_title: "Problem",
            },
            Platform::Codeforces => Self {
                title_regions: &["problem-title"],
                body_regions: &["problem-statement"],
                sample_regions: &[
                    ("Sample Input", "sample-input"),
                    ("Sample Output", "sample-output"),
                ],
                default_title: "Problem",
            },
            Platform::CodeChef => Self {
                title_regions: &["problem-title"],
                body_regions: &["problem-body", "problem-statement"],
                sample_regions: &[],
                default_title: "Problem",
            },
            Platform::Codility => Self {
                title_regions: &["task-name"],
                body_regions: &["task-description"],
                sample_regions: &[],
                default_title: "Task",
            },
            Platform::CoderPad => Self {
                title_regions: &[],
                body_regions: &["instructions", "question"],
                sample_regions: &[],
                default_title: "Instructions",
            },
            Platform::AtCoder => Self {
                title_regions: &["task-title"],
                body_regions: &["task-statement"],
                sample_regions: &[],
                default_title: "Problem",
            },
            // LeetCode has its own extractor; Generic has the probe below.
            Platform::LeetCode | Platform::Generic => Self {
                title_regions: &["question-title"],
                body_regions: &["question-content"],
                sample_regions: &[],
                default_title: "Problem",
            },
        }
    }
}

#[async_trait]
impl Extract for RegionExtractor {
    async fn extract(&self, snapshot: &PageSnapshot) -> Option<Bundle> {
        let body_text = self
            .body_regions
            .iter()
            .find_map(|region| snapshot.region(region))?;

        let title = self
            .title_regions
            .iter()
            .find_map(|region| snapshot.region(region))
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| self.default_title.to_string());

        let mut body = format!("{}\n\n{}", title, body_text.trim());
        for (label, region) in self.sample_regions {
            if let Some(sample) = snapshot.region(region) {
                body.push_str(&format!("\n\n{label}:\n{}", sample.trim()));
            }
        }

        Some(Bundle::Problem(ProblemBundle { title, body }))
    }
}

/// Region names a statement commonly lives under, in preference order.
const GENERIC_REGIONS: &[&str] = &[
    "problem-statement",
    "problem-description",
    "challenge-body",
    "task-description",
    "question-content",
    "article",
    "main",
];

/// Minimum body length for the generic probe to believe it found a
/// statement rather than navigation chrome.
const MIN_BODY_CHARS: usize = 50;

/// Last-resort extractor for unrecognized pages.
pub struct GenericExtractor;

#[async_trait]
impl Extract for GenericExtractor {
    async fn extract(&self, snapshot: &PageSnapshot) -> Option<Bundle> {
        let body_text = GENERIC_REGIONS
            .iter()
            .find_map(|region| snapshot.region(region))
            .filter(|text| text.trim().len() > MIN_BODY_CHARS)?;

        let title = if snapshot.title.trim().is_empty() {
            "Problem".to_string()
        } else {
            snapshot.title.trim().to_string()
        };

        let body = format!("{}\n\n{}", title, body_text.trim());
        Some(Bundle::Problem(ProblemBundle { title, body }))
    }
}
