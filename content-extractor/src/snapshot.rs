//! Typed snapshot of the ambient page surface.
//!
//! Scraping the real surface is out of scope; what extractors see is this
//! model: hostname and path, presence markers, named text regions, a notebook
//! cell model, and the currently open document. Snapshot production is the
//! host's concern, behind [`SnapshotSource`]; a fresh snapshot is taken per
//! request and nothing is cached.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Presence markers and extractable content of the active page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub hostname: String,

    #[serde(default)]
    pub path: String,

    /// Page title.
    #[serde(default)]
    pub title: String,

    /// Structural markers observed on the page (e.g. `"jp-Notebook"`).
    #[serde(default)]
    pub markers: HashSet<String>,

    /// Named text regions, keyed by region identity.
    #[serde(default)]
    pub regions: BTreeMap<String, String>,

    /// Notebook model when the surface is a notebook.
    #[serde(default)]
    pub notebook: Option<NotebookModel>,

    /// The currently open document, verbatim.
    #[serde(default)]
    pub document: Option<OpenDocument>,
}

impl PageSnapshot {
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.contains(marker)
    }

    /// A region's text, `None` when absent or blank.
    pub fn region(&self, name: &str) -> Option<&str> {
        self.regions
            .get(name)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }
}

/// The open document, taken verbatim (no extraction applied).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenDocument {
    pub filename: String,
    pub text: String,
}

/// Notebook surface: cells in document order, with the active one marked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotebookModel {
    #[serde(default)]
    pub cells: Vec<NotebookCell>,
    /// Index of the selected cell, if any.
    #[serde(default)]
    pub active_cell: Option<usize>,
}

impl NotebookModel {
    pub fn active(&self) -> Option<&NotebookCell> {
        self.active_cell.and_then(|index| self.cells.get(index))
    }
}

/// One notebook cell: source plus its outputs in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotebookCell {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub outputs: Vec<CellOutput>,
}

/// A single cell output, mirroring the notebook output taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum CellOutput {
    Stream {
        text: String,
    },
    ExecuteResult {
        data: DisplayData,
    },
    DisplayData {
        data: DisplayData,
    },
    Error {
        ename: String,
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

/// Rich output payload keyed by MIME type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayData {
    #[serde(rename = "image/png", default, skip_serializing_if = "Option::is_none")]
    pub image_png: Option<String>,

    #[serde(rename = "text/html", default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(rename = "text/plain", default, skip_serializing_if = "Option::is_none")]
    pub plain: Option<String>,

    #[serde(
        rename = "application/json",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub json: Option<serde_json::Value>,
}

/// Produces a fresh snapshot of the ambient surface on demand.
pub trait SnapshotSource: Send + Sync {
    /// Take a snapshot now. `None` when no surface is observable.
    fn snapshot(&self) -> Option<PageSnapshot>;
}

/// Reads the snapshot from a JSON file each call, so an external watcher can
/// update the surface while the host runs.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SnapshotSource for FileSnapshotSource {
    fn snapshot(&self) -> Option<PageSnapshot> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("no snapshot at {:?}: {e}", self.path);
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!("unparseable snapshot at {:?}: {e}", self.path);
                None
            }
        }
    }
}

/// A fixed snapshot; used by tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshotSource {
    snapshot: Option<PageSnapshot>,
}

impl StaticSnapshotSource {
    pub fn new(snapshot: PageSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }

    pub fn empty() -> Self {
        Self { snapshot: None }
    }
}

impl SnapshotSource for StaticSnapshotSource {
    fn snapshot(&self) -> Option<PageSnapshot> {
        self.snapshot.clone()
    }
}
