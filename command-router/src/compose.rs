//! Message composition.
//!
//! Turns an extracted bundle into the ordered outbound messages the relay
//! will deliver: one formatted text message followed by the bundle's images.
//! All user-derived text is markup-escaped before the structural wrappers go
//! around it.

use content_extractor::{ContentBundle, OpenDocument, ProblemBundle};
use delivery_service::{bold, escape_markup, pre, OutboundMessage};

/// Messages for the send-content command on a notebook surface: code block,
/// optional output block, then images in order.
pub fn cell_messages(bundle: &ContentBundle) -> Vec<OutboundMessage> {
    let mut body = format!("{}\n{}", bold("Code"), pre(&escape_markup(&bundle.code)));

    let output = bundle.outputs.join("\n");
    let output = output.trim();
    if !output.is_empty() {
        body.push_str(&format!(
            "\n\n{}\n{}",
            bold("Output"),
            pre(&escape_markup(output))
        ));
    }

    let mut messages = vec![OutboundMessage::Text { body }];
    messages.extend(image_messages(bundle));
    messages
}

/// Messages for the send-output-only command. `None` when the cell has
/// neither text output nor images — the caller surfaces "no output".
pub fn output_messages(bundle: &ContentBundle) -> Option<Vec<OutboundMessage>> {
    let output = bundle.outputs.join("\n");
    let output = output.trim();

    let mut messages = Vec::new();
    if !output.is_empty() {
        messages.push(OutboundMessage::Text {
            body: pre(&escape_markup(output)),
        });
    }
    messages.extend(image_messages(bundle));

    if messages.is_empty() {
        None
    } else {
        Some(messages)
    }
}

/// Message for a problem statement.
pub fn problem_messages(bundle: &ProblemBundle) -> Vec<OutboundMessage> {
    vec![OutboundMessage::Text {
        body: pre(&escape_markup(&bundle.body)),
    }]
}

/// Message for the whole open document, verbatim.
pub fn document_message(document: &OpenDocument) -> OutboundMessage {
    OutboundMessage::Document {
        content: document.text.clone(),
        filename: Some(document.filename.clone()),
    }
}

fn image_messages(bundle: &ContentBundle) -> impl Iterator<Item = OutboundMessage> + '_ {
    bundle.images.iter().map(|image| OutboundMessage::Image {
        base64: image.clone(),
        caption: None,
    })
}
