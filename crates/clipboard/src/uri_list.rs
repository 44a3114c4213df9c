//! Text form of a [`ClipDescriptor`] on the host clipboard.
//!
//! The document is a `text/uri-list` whose comment lines carry the manifest, one type per
//! line, and the type of each item:
//!
//! ```text
//! #clipmux
//! #mime-types x/int
//! #mime x/int
//! content://org.clipmux.provider/copy/4f0c...
//! ```
//!
//! Any text without the leading marker belongs to some other program and is read back as a
//! single text item.

use std::fmt::Write as _;

use clipmux_base::{ClipDescriptor, ClipItem};

const MARKER: &str = "#clipmux";
const MIME_TYPES_PREFIX: &str = "#mime-types ";
const MIME_PREFIX: &str = "#mime ";

#[must_use]
pub fn encode(descriptor: &ClipDescriptor) -> String {
    let texts = descriptor
        .items()
        .iter()
        .filter_map(|item| match item {
            ClipItem::Text(text) => Some(text.as_str()),
            ClipItem::Uri { .. } => None,
        })
        .collect::<Vec<_>>();
    if texts.len() == descriptor.len() {
        return texts.join("\n");
    }

    let mut document = format!("{MARKER}\r\n");
    for mime in descriptor.mime_types() {
        let _ = write!(document, "{MIME_TYPES_PREFIX}{mime}\r\n");
    }
    for item in descriptor.items() {
        if let ClipItem::Uri { uri, mime } = item {
            let _ = write!(document, "{MIME_PREFIX}{mime}\r\n{uri}\r\n");
        } else {
            tracing::warn!("Text item is dropped from a URI list");
        }
    }
    document
}

/// Returns `None` for empty text.
#[must_use]
pub fn decode(text: &str) -> Option<ClipDescriptor> {
    if text.is_empty() {
        return None;
    }

    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    if lines.next() != Some(MARKER) {
        return Some(ClipDescriptor::from_text(text));
    }

    let mut mime_types = None;
    let mut pending_mime = None;
    let mut items = Vec::new();
    for line in lines {
        if let Some(value) = line.strip_prefix(MIME_TYPES_PREFIX) {
            let manifest = mime_types.get_or_insert_with(Vec::new);
            if let Ok(mime) = value.trim().parse::<mime::Mime>() {
                manifest.push(mime);
            }
        } else if let Some(value) = line.strip_prefix(MIME_PREFIX) {
            pending_mime = value.trim().parse::<mime::Mime>().ok();
        } else if line.starts_with('#') {
            continue;
        } else if let Ok(uri) = line.parse::<http::Uri>() {
            let mime = pending_mime.take().unwrap_or(mime::APPLICATION_OCTET_STREAM);
            items.push(ClipItem::Uri { uri, mime });
        } else {
            return Some(ClipDescriptor::from_text(text));
        }
    }

    Some(match mime_types {
        Some(mime_types) => ClipDescriptor::with_mime_types(mime_types, items),
        None => ClipDescriptor::new(items),
    })
}
