//! LeetCode extraction via the site's GraphQL API.
//!
//! DOM selectors on this site churn; the GraphQL question query is stable, so
//! it is tried first whenever the path carries a problem slug. The remote
//! call has its own bounded timeout, smaller than the bridge's long deadline.
//! Any failure — bad slug, network, unexpected shape — falls back immediately
//! to the region-based variant; there is no retry.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::html::fragment_to_text;
use crate::problem::RegionExtractor;
use crate::registry::Extract;
use crate::snapshot::PageSnapshot;
use crate::types::{Bundle, Platform, ProblemBundle};

const QUESTION_QUERY: &str =
    "query q($s:String!){question(titleSlug:$s){title difficulty content sampleTestCase}}";

/// Remote-call timeout; kept inside the bridge's long deadline so a slow API
/// degrades into the fallback instead of a bridge timeout.
const REMOTE_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<QuestionData>,
}

#[derive(Debug, Deserialize)]
struct QuestionData {
    question: Option<Question>,
}

#[derive(Debug, Deserialize)]
struct Question {
    title: String,
    difficulty: String,
    content: Option<String>,
    #[serde(rename = "sampleTestCase")]
    sample_test_case: Option<String>,
}

pub struct LeetCodeExtractor {
    http: reqwest::Client,
    /// Override for the GraphQL endpoint; tests point this at a mock.
    endpoint: Option<String>,
    dom_fallback: RegionExtractor,
}

impl LeetCodeExtractor {
    pub fn new() -> Self {
        Self::with_endpoint(None)
    }

    pub fn with_endpoint(endpoint: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            endpoint,
            dom_fallback: RegionExtractor::for_platform(Platform::LeetCode),
        }
    }

    /// Problem slug from a `/problems/<slug>/...` path.
    fn slug(path: &str) -> Option<&str> {
        let rest = path.strip_prefix("/problems/")?;
        let slug = rest.split('/').next()?;
        if slug.is_empty() {
            None
        } else {
            Some(slug)
        }
    }

    fn graphql_url(&self, snapshot: &PageSnapshot) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}/graphql", snapshot.hostname),
        }
    }

    async fn fetch_question(&self, url: &str, slug: &str) -> Option<Question> {
        let body = json!({
            "query": QUESTION_QUERY,
            "variables": { "s": slug },
        });
        let response = self.http.post(url).json(&body).send().await.ok()?;
        let parsed: GraphQlResponse = response.json().await.ok()?;
        parsed.data?.question
    }
}

impl Default for LeetCodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extract for LeetCodeExtractor {
    async fn extract(&self, snapshot: &PageSnapshot) -> Option<Bundle> {
        let Some(slug) = Self::slug(&snapshot.path) else {
            return self.dom_fallback.extract(snapshot).await;
        };

        let url = self.graphql_url(snapshot);
        match self.fetch_question(&url, slug).await {
            Some(question) => {
                let text = fragment_to_text(question.content.as_deref().unwrap_or(""));
                let mut body =
                    format!("{} [{}]\n\n{}", question.title, question.difficulty, text);
                if let Some(sample) = &question.sample_test_case {
                    body.push_str(&format!("\n\nSample Input:\n{sample}"));
                }
                Some(Bundle::Problem(ProblemBundle {
                    title: question.title,
                    body,
                }))
            }
            None => {
                debug!(slug, "question query failed, falling back to page regions");
                self.dom_fallback.extract(snapshot).await
            }
        }
    }
}
