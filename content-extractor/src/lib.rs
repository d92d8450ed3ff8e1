//! Content Extractor - capability registry over the active page surface
//!
//! Maps an environment identifier (a notebook surface, or a known
//! problem-statement site) to a capability that produces a content bundle.
//! Extractors consume a typed [`PageSnapshot`] of the ambient surface — how
//! that snapshot is scraped is outside this crate's boundary.
//!
//! The failure contract is uniform: no extractor ever raises across the
//! boundary. Absent content, unsupported environments, deadline expiry and
//! internal failures all come back as `None`; a failing platform extractor
//! first falls back to the generic one.

pub mod environment;
pub mod html;
pub mod leetcode;
pub mod notebook;
pub mod problem;
pub mod registry;
pub mod snapshot;
pub mod types;

pub use environment::identify_environment;
pub use leetcode::LeetCodeExtractor;
pub use notebook::NotebookExtractor;
pub use problem::{GenericExtractor, RegionExtractor};
pub use registry::{Extract, ExtractorRegistry};
pub use snapshot::{
    CellOutput, DisplayData, FileSnapshotSource, NotebookCell, NotebookModel, OpenDocument,
    PageSnapshot, SnapshotSource, StaticSnapshotSource,
};
pub use types::{Bundle, ContentBundle, EnvironmentId, Platform, ProblemBundle};
