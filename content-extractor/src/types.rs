//! Core extraction types.

use serde::{Deserialize, Serialize};

/// Supported problem-statement platforms, keyed by site identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LeetCode,
    HackerRank,
    Codeforces,
    CodeChef,
    Codility,
    CoderPad,
    AtCoder,
    /// Any other page; extraction falls to the generic region probe.
    Generic,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LeetCode => "leetcode",
            Platform::HackerRank => "hackerrank",
            Platform::Codeforces => "codeforces",
            Platform::CodeChef => "codechef",
            Platform::Codility => "codility",
            Platform::CoderPad => "coderpad",
            Platform::AtCoder => "atcoder",
            Platform::Generic => "generic",
        }
    }

    /// Match a hostname to a platform. Substring matching covers the
    /// regional mirror domains some judges run.
    pub fn from_hostname(hostname: &str) -> Platform {
        if hostname.contains("leetcode.com") {
            Platform::LeetCode
        } else if hostname.contains("hackerrank.com") {
            Platform::HackerRank
        } else if hostname.contains("codeforces.com")
            || hostname.contains("codeforces.ml")
            || hostname.contains("codeforces.es")
        {
            Platform::Codeforces
        } else if hostname.contains("codechef.com") {
            Platform::CodeChef
        } else if hostname.contains("codility.com") {
            Platform::Codility
        } else if hostname.contains("coderpad.io") || hostname.contains("cdpad.io") {
            Platform::CoderPad
        } else if hostname.contains("atcoder.jp") {
            Platform::AtCoder
        } else {
            Platform::Generic
        }
    }
}

/// Identity of the active application surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvironmentId {
    /// A notebook surface (cells with code and outputs).
    Notebook,
    /// A problem-statement page on the given platform.
    Problem(Platform),
    /// No recognizable surface.
    Unknown,
}

/// The active cell's extracted content. Produced fresh on every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBundle {
    /// Cell source code.
    pub code: String,
    /// Text outputs in original order.
    pub outputs: Vec<String>,
    /// Image outputs in original order, base64 PNG.
    pub images: Vec<String>,
}

/// A problem statement. Produced fresh on every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemBundle {
    pub title: String,
    pub body: String,
}

/// What an extraction channel returns. Serialized untagged so each variant
/// keeps the plain field shape it has on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bundle {
    Content(ContentBundle),
    Problem(ProblemBundle),
}
