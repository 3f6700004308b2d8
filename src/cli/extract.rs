use crate::codec::read_image;
use crate::config::EmbeddingConfig;
use crate::engine::{extract, PayloadKind};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Bytes shown when a binary payload is printed instead of saved
const PREVIEW_BYTES: usize = 32;

/// Options for the extract command
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub config: EmbeddingConfig,
    /// Write the raw payload here instead of printing it
    pub output: Option<PathBuf>,
}

/// Recover the payload hidden in `input_path`. Returns the message to print:
/// the text itself, a hex preview of binary data, or a note of where the
/// payload was written.
pub fn extract_from_image(input_path: &Path, options: &ExtractOptions) -> Result<String> {
    let grid = read_image(input_path)?;
    let payload = extract(&grid, &options.config)?;

    if let Some(path) = &options.output {
        std::fs::write(path, &payload)?;
        return Ok(format!("Wrote {} bytes to {}\n", payload.len(), path.display()));
    }

    Ok(match PayloadKind::classify(payload) {
        PayloadKind::Text(text) => text,
        PayloadKind::Binary(bytes) => {
            let shown = bytes.len().min(PREVIEW_BYTES);
            let mut message = format!(
                "Binary payload, {} bytes (use --output to save)\n{}",
                bytes.len(),
                hex::encode(&bytes[..shown])
            );
            if shown < bytes.len() {
                message.push_str("...");
            }
            message.push('\n');
            message
        }
    })
}
