//! Input blob loading
//!
//! Blobs are raw binary files. A `.hex` extension switches to hex text,
//! whitespace ignored, which is handier for captures pasted from Wireshark.

use std::path::Path;

use crate::error::{Result, SmuggleError};

/// Read a blob and check its decoded length lies in `min_len..=max_len`
pub async fn load_blob(path: impl AsRef<Path>, min_len: usize, max_len: usize) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let load_err = |reason: String| SmuggleError::Load {
        path: path.display().to_string(),
        reason,
    };

    let raw = tokio::fs::read(path).await.map_err(|e| load_err(e.to_string()))?;

    let is_hex = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("hex"));
    let bytes = if is_hex { decode_hex_text(&raw).map_err(load_err)? } else { raw };

    if bytes.len() < min_len {
        return Err(load_err(if bytes.is_empty() {
            "file is empty".to_string()
        } else {
            format!("{} bytes is below minimum of {}", bytes.len(), min_len)
        }));
    }

    if bytes.len() > max_len {
        return Err(load_err(format!(
            "{} bytes exceeds limit of {}",
            bytes.len(),
            max_len
        )));
    }

    Ok(bytes)
}

fn decode_hex_text(raw: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let compact: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    hex::decode(&compact).map_err(|e| format!("invalid hex: {}", e))
}
