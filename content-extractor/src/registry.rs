//! Extractor capability registry.
//!
//! Extraction variants are registered by environment key; adding a platform
//! means registering a new capability, never branching in a caller. The
//! registry owns the boundary's failure contract: a deadline on every
//! extraction, immediate fallback from a failed platform extractor to the
//! generic one, and `None` as the only failure signal.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::time::Duration;
use tracing::{debug, trace};

use crate::leetcode::LeetCodeExtractor;
use crate::notebook::NotebookExtractor;
use crate::problem::{GenericExtractor, RegionExtractor};
use crate::snapshot::PageSnapshot;
use crate::types::{Bundle, EnvironmentId, Platform};

/// A content extraction capability.
#[async_trait]
pub trait Extract: Send + Sync {
    /// Extract a bundle from the snapshot. `None` for absent content or any
    /// internal failure — nothing is raised across this boundary.
    async fn extract(&self, snapshot: &PageSnapshot) -> Option<Bundle>;
}

/// Registry of extraction capabilities keyed by environment.
pub struct ExtractorRegistry {
    extractors: HashMap<EnvironmentId, Box<dyn Extract>>,
    fallback: Box<dyn Extract>,
}

impl ExtractorRegistry {
    /// Registry with the stock capabilities registered.
    pub fn new() -> Self {
        let mut registry = Self {
            extractors: HashMap::new(),
            fallback: Box::new(GenericExtractor),
        };

        registry.register(EnvironmentId::Notebook, Box::new(NotebookExtractor));
        registry.register(
            EnvironmentId::Problem(Platform::LeetCode),
            Box::new(LeetCodeExtractor::new()),
        );
        for platform in [
            Platform::HackerRank,
            Platform::Codeforces,
            Platform::CodeChef,
            Platform::Codility,
            Platform::CoderPad,
            Platform::AtCoder,
        ] {
            registry.register(
                EnvironmentId::Problem(platform),
                Box::new(RegionExtractor::for_platform(platform)),
            );
        }
        registry.register(
            EnvironmentId::Problem(Platform::Generic),
            Box::new(GenericExtractor),
        );

        registry
    }

    /// Register (or replace) a capability for an environment.
    pub fn register(&mut self, environment: EnvironmentId, extractor: Box<dyn Extract>) {
        self.extractors.insert(environment, extractor);
    }

    /// Extract for `environment`, completing within `deadline`.
    pub async fn extract(
        &self,
        environment: &EnvironmentId,
        snapshot: &PageSnapshot,
        deadline: Duration,
    ) -> Option<Bundle> {
        let attempt = self.extract_with_fallback(environment, snapshot);
        match tokio::time::timeout(deadline, attempt).await {
            Ok(bundle) => bundle,
            Err(_elapsed) => {
                debug!(?environment, "extraction deadline exceeded");
                None
            }
        }
    }

    async fn extract_with_fallback(
        &self,
        environment: &EnvironmentId,
        snapshot: &PageSnapshot,
    ) -> Option<Bundle> {
        if *environment == EnvironmentId::Unknown {
            return None;
        }

        if let Some(extractor) = self.extractors.get(environment) {
            if let Some(bundle) = extractor.extract(snapshot).await {
                return Some(bundle);
            }
            trace!(?environment, "primary extractor produced nothing");
        }

        // Problem pages fall back to the generic probe; a notebook without a
        // usable cell has nothing generic to offer.
        match environment {
            EnvironmentId::Problem(platform) if *platform != Platform::Generic => {
                debug!(?environment, "falling back to generic extractor");
                self.fallback.extract(snapshot).await
            }
            _ => None,
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProblemBundle;

    /// Extractor that never answers within any reasonable deadline.
    struct StallingExtractor;

    #[async_trait]
    impl Extract for StallingExtractor {
        async fn extract(&self, _snapshot: &PageSnapshot) -> Option<Bundle> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            None
        }
    }

    /// Extractor that always fails.
    struct FailingExtractor;

    #[async_trait]
    impl Extract for FailingExtractor {
        async fn extract(&self, _snapshot: &PageSnapshot) -> Option<Bundle> {
            None
        }
    }

    fn problem_snapshot() -> PageSnapshot {
        let mut snapshot = PageSnapshot {
            hostname: "codeforces.com".to_string(),
            title: "A. Watermelon".to_string(),
            ..PageSnapshot::default()
        };
        snapshot.regions.insert(
            "problem-statement".to_string(),
            "Given w, decide whether it can be split into two even parts.".to_string(),
        );
        snapshot
    }

    #[tokio::test]
    async fn test_unknown_environment_is_none() {
        let registry = ExtractorRegistry::new();
        let result = registry
            .extract(
                &EnvironmentId::Unknown,
                &PageSnapshot::default(),
                Duration::from_secs(1),
            )
            .await;
        assert!(result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded_is_none() {
        let mut registry = ExtractorRegistry::new();
        registry.register(
            EnvironmentId::Problem(Platform::Codeforces),
            Box::new(StallingExtractor),
        );

        let result = registry
            .extract(
                &EnvironmentId::Problem(Platform::Codeforces),
                &problem_snapshot(),
                Duration::from_secs(2),
            )
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_failed_platform_extractor_falls_back_to_generic() {
        let mut registry = ExtractorRegistry::new();
        registry.register(
            EnvironmentId::Problem(Platform::Codeforces),
            Box::new(FailingExtractor),
        );

        let result = registry
            .extract(
                &EnvironmentId::Problem(Platform::Codeforces),
                &problem_snapshot(),
                Duration::from_secs(1),
            )
            .await;

        // The generic probe finds the statement region.
        let Some(Bundle::Problem(ProblemBundle { body, .. })) = result else {
            panic!("expected a problem bundle from the generic fallback");
        };
        assert!(body.contains("two even parts"));
    }

    #[tokio::test]
    async fn test_notebook_has_no_generic_fallback() {
        let mut registry = ExtractorRegistry::new();
        registry.register(EnvironmentId::Notebook, Box::new(FailingExtractor));

        // Even with problem-shaped regions present, a notebook miss is a miss.
        let result = registry
            .extract(
                &EnvironmentId::Notebook,
                &problem_snapshot(),
                Duration::from_secs(1),
            )
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_custom_registration_replaces_stock() {
        struct Fixed;

        #[async_trait]
        impl Extract for Fixed {
            async fn extract(&self, _snapshot: &PageSnapshot) -> Option<Bundle> {
                Some(Bundle::Problem(ProblemBundle {
                    title: "fixed".to_string(),
                    body: "fixed".to_string(),
                }))
            }
        }

        let mut registry = ExtractorRegistry::new();
        registry.register(EnvironmentId::Problem(Platform::AtCoder), Box::new(Fixed));

        let result = registry
            .extract(
                &EnvironmentId::Problem(Platform::AtCoder),
                &PageSnapshot::default(),
                Duration::from_secs(1),
            )
            .await;
        assert!(matches!(
            result,
            Some(Bundle::Problem(ProblemBundle { title, .. })) if title == "fixed"
        ));
    }
}
