//! Notebook cell extraction.
//!
//! Decodes the active cell of the snapshot's notebook model into a
//! [`ContentBundle`]: source code, text outputs in execution order, and PNG
//! images. Rich display data picks one representation per output, in the
//! order a reader would want it: image, then rendered table/HTML, then plain
//! text, then pretty-printed JSON. Error outputs keep their traceback with
//! terminal color codes stripped.

use async_trait::async_trait;

use crate::html::{fragment_to_text, strip_ansi, table_to_text};
use crate::registry::Extract;
use crate::snapshot::{CellOutput, DisplayData, NotebookCell, PageSnapshot};
use crate::types::{Bundle, ContentBundle};

pub struct NotebookExtractor;

#[async_trait]
impl Extract for NotebookExtractor {
    async fn extract(&self, snapshot: &PageSnapshot) -> Option<Bundle> {
        let cell = snapshot.notebook.as_ref()?.active()?;
        Some(Bundle::Content(decode_cell(cell)))
    }
}

/// Decode one cell into its bundle form.
pub fn decode_cell(cell: &NotebookCell) -> ContentBundle {
    let mut outputs = Vec::new();
    let mut images = Vec::new();

    for output in &cell.outputs {
        match output {
            CellOutput::Stream { text } => outputs.push(text.clone()),
            CellOutput::ExecuteResult { data } | CellOutput::DisplayData { data } => {
                decode_display_data(data, &mut outputs, &mut images);
            }
            CellOutput::Error {
                ename,
                evalue,
                traceback,
            } => {
                let trace = strip_ansi(&traceback.join("\n"));
                outputs.push(format!("{ename}: {evalue}\n{trace}"));
            }
        }
    }

    ContentBundle {
        code: cell.source.clone(),
        outputs,
        images,
    }
}

fn decode_display_data(data: &DisplayData, outputs: &mut Vec<String>, images: &mut Vec<String>) {
    if let Some(png) = &data.image_png {
        images.push(strip_data_uri(png).to_string());
    } else if let Some(html) = &data.html {
        if html.contains("<table") {
            outputs.push(table_to_text(html));
        } else {
            outputs.push(fragment_to_text(html));
        }
    } else if let Some(plain) = &data.plain {
        outputs.push(plain.clone());
    } else if let Some(json) = &data.json {
        outputs.push(serde_json::to_string_pretty(json).unwrap_or_default());
    }
}

/// Accept either a raw base64 payload or a full `data:image/...` URI.
fn strip_data_uri(value: &str) -> &str {
    if value.starts_with("data:image/") {
        value.split_once(',').map(|(_, b64)| b64).unwrap_or("")
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::NotebookModel;
    use pretty_assertions::assert_eq;

    fn cell_with_outputs(outputs: Vec<CellOutput>) -> NotebookCell {
        NotebookCell {
            source: "df.head()".to_string(),
            outputs,
        }
    }

    #[test]
    fn test_stream_outputs_keep_order() {
        let cell = cell_with_outputs(vec![
            CellOutput::Stream {
                text: "first".to_string(),
            },
            CellOutput::Stream {
                text: "second".to_string(),
            },
        ]);
        let bundle = decode_cell(&cell);
        assert_eq!(bundle.outputs, vec!["first", "second"]);
        assert_eq!(bundle.code, "df.head()");
    }

    #[test]
    fn test_image_takes_precedence_over_text() {
        let cell = cell_with_outputs(vec![CellOutput::DisplayData {
            data: DisplayData {
                image_png: Some("QUJDRA==".to_string()),
                plain: Some("<Figure 640x480>".to_string()),
                ..DisplayData::default()
            },
        }]);
        let bundle = decode_cell(&cell);
        assert_eq!(bundle.images, vec!["QUJDRA=="]);
        assert!(bundle.outputs.is_empty());
    }

    #[test]
    fn test_data_uri_prefix_is_stripped() {
        let cell = cell_with_outputs(vec![CellOutput::DisplayData {
            data: DisplayData {
                image_png: Some("data:image/png;base64,QUJDRA==".to_string()),
                ..DisplayData::default()
            },
        }]);
        let bundle = decode_cell(&cell);
        assert_eq!(bundle.images, vec!["QUJDRA=="]);
    }

    #[test]
    fn test_html_table_flattens() {
        let cell = cell_with_outputs(vec![CellOutput::ExecuteResult {
            data: DisplayData {
                html: Some(
                    "<table><tr><th>a</th><th>b</th></tr><tr><td>1</td><td>2</td></tr></table>"
                        .to_string(),
                ),
                plain: Some("ignored".to_string()),
                ..DisplayData::default()
            },
        }]);
        let bundle = decode_cell(&cell);
        assert_eq!(bundle.outputs, vec!["a\tb\n1\t2"]);
    }

    #[test]
    fn test_json_pretty_printed() {
        let cell = cell_with_outputs(vec![CellOutput::ExecuteResult {
            data: DisplayData {
                json: Some(serde_json::json!({"k": 1})),
                ..DisplayData::default()
            },
        }]);
        let bundle = decode_cell(&cell);
        assert_eq!(bundle.outputs, vec!["{\n  \"k\": 1\n}"]);
    }

    #[test]
    fn test_error_output_format_with_ansi_stripped() {
        let cell = cell_with_outputs(vec![CellOutput::Error {
            ename: "ValueError".to_string(),
            evalue: "bad input".to_string(),
            traceback: vec![
                "\u{1b}[0;31mTraceback\u{1b}[0m".to_string(),
                "  line 1".to_string(),
            ],
        }]);
        let bundle = decode_cell(&cell);
        assert_eq!(bundle.outputs, vec!["ValueError: bad input\nTraceback\n  line 1"]);
    }

    #[tokio::test]
    async fn test_no_active_cell_is_none() {
        let extractor = NotebookExtractor;
        let snapshot = PageSnapshot {
            notebook: Some(NotebookModel {
                cells: vec![NotebookCell::default()],
                active_cell: None,
            }),
            ..PageSnapshot::default()
        };
        assert!(extractor.extract(&snapshot).await.is_none());
    }

    #[tokio::test]
    async fn test_no_notebook_is_none() {
        let extractor = NotebookExtractor;
        assert!(extractor.extract(&PageSnapshot::default()).await.is_none());
    }
}
