//! Image store boundary: base64 encoding and data-URI helpers
//!
//! Images travel through the editor as standard base64 strings. Raw bytes
//! only exist at the upload and download edges.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

/// File name offered for the latest revision
pub const DOWNLOAD_FILE_NAME: &str = "final_image.png";

/// Content type of the download
pub const DOWNLOAD_MEDIA_TYPE: &str = "image/png";

/// Tag used when the leading bytes match no known format
const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

/// Magic byte prefixes and their media types
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
];

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid base64 image data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

pub fn encode_b64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

pub fn decode_b64(data: &str) -> Result<Vec<u8>, ImageError> {
    Ok(BASE64.decode(data.trim())?)
}

/// Detect the media type of a base64 image from its leading bytes.
///
/// Only the first few characters are decoded. Unknown formats are tagged
/// `image/jpeg`.
pub fn media_type(b64: &str) -> &'static str {
    // 16 base64 chars -> 12 bytes, enough for every signature including RIFF/WEBP
    let prefix: String = b64.chars().take(16).collect();
    let Ok(head) = BASE64.decode(prefix.as_bytes()) else {
        return FALLBACK_MEDIA_TYPE;
    };

    if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WEBP" {
        return "image/webp";
    }

    SIGNATURES
        .iter()
        .find(|(magic, _)| head.starts_with(magic))
        .map_or(FALLBACK_MEDIA_TYPE, |(_, media_type)| *media_type)
}

/// Build a `data:` URI suitable for an `input_image` content item
pub fn data_uri(b64: &str) -> String {
    format!("data:{};base64,{b64}", media_type(b64))
}
