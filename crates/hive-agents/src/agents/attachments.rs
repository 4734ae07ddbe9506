//! Assembling the human turn of an invocation

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hive_common::IMAGE_EXTENSIONS;
use hive_llm::{ContentPart, Turn};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Build one human turn from the text plus one part per attachment
///
/// Images are inlined as base64; other files become a placeholder note.
/// Read failures degrade to a placeholder and never abort the call.
pub(crate) async fn human_turn(content: &str, attachments: &[PathBuf]) -> Turn {
    let mut parts = vec![ContentPart::Text(content.to_string())];
    for path in attachments {
        parts.push(attachment_part(path).await);
    }
    Turn::human(parts)
}

async fn attachment_part(path: &Path) -> ContentPart {
    let Some(mime_type) = image_mime_type(path) else {
        return ContentPart::Text(format!("[Unsupported attachment: {}]", path.display()));
    };

    match tokio::fs::read(path).await {
        Ok(bytes) => ContentPart::Image {
            mime_type,
            data_base64: STANDARD.encode(bytes),
            source: path.display().to_string(),
        },
        Err(e) => {
            warn!("Failed to read attachment {:?}: {}", path, e);
            ContentPart::Text(format!("[Attachment unavailable: {}]", path.display()))
        }
    }
}

fn image_mime_type(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    let subtype = if ext == "jpg" { "jpeg" } else { ext.as_str() };
    Some(format!("image/{}", subtype))
}
