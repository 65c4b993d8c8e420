//! `data:` URL parsing.
//!
//! Images reach the transforms as data URLs produced by the capture canvas,
//! a file upload or a previous transform. Only base64 payloads are accepted:
//! percent-encoded binary never comes out of a canvas or a `FileReader`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{decode_bytes, DecodeError, SourceImage};

/// A parsed data URL: declared media type and the raw payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type without parameters, lowercased (e.g. `image/jpeg`).
    /// Empty when the URL omits it.
    pub mime: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

/// Split a data URL into its media type and decoded payload.
///
/// # Errors
///
/// - `InvalidDataUrl` if the scheme, the comma separator or the `;base64`
///   marker is missing
/// - `UnsupportedMediaType` if a non-image media type is declared
/// - `Base64` if the payload is not valid base64
pub fn parse_data_url(url: &str) -> Result<DataUrl, DecodeError> {
    let trimmed = url.trim();
    let rest = strip_prefix_ignore_case(trimmed, "data:")
        .ok_or_else(|| DecodeError::InvalidDataUrl("missing data: scheme".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DecodeError::InvalidDataUrl("missing ',' separator".to_string()))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    if !is_base64 {
        return Err(DecodeError::InvalidDataUrl(
            "payload is not base64 encoded".to_string(),
        ));
    }
    if !mime.is_empty() && !mime.starts_with("image/") {
        return Err(DecodeError::UnsupportedMediaType(mime));
    }

    // Line breaks and spaces can sneak in when URLs are copied around
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact.as_bytes())?;

    Ok(DataUrl { mime, bytes })
}

/// Parse a data URL and decode the image it carries.
pub fn decode_data_url(url: &str) -> Result<SourceImage, DecodeError> {
    let parsed = parse_data_url(url)?;
    tracing::debug!(
        mime = %parsed.mime,
        bytes = parsed.bytes.len(),
        "decoding data URL"
    );
    decode_bytes(&parsed.bytes)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}
