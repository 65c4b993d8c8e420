//! Output format selection and the encoded data URL result.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{encode_jpeg, encode_png, EncodeError, DEFAULT_JPEG_QUALITY};
use crate::decode::{self, DecodeError, SourceImage};

/// Raster format written into the output data URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy JPEG. Alpha is flattened onto black.
    Jpeg {
        /// Quality from 1 to 100.
        #[serde(default = "default_quality")]
        quality: u8,
    },
    /// Lossless PNG with alpha.
    Png,
}

fn default_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputFormat {
    /// MIME type used in the data URL header.
    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Jpeg { .. } => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    /// Encode RGBA pixels in this format.
    pub fn encode(self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
        match self {
            OutputFormat::Jpeg { quality } => encode_jpeg(pixels, width, height, quality),
            OutputFormat::Png => encode_png(pixels, width, height),
        }
    }
}

/// An encoded raster held as a `data:` URL.
///
/// Every transform produces a fresh value; two results are the same image
/// exactly when their URLs are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    data_url: String,
    mime: &'static str,
    width: u32,
    height: u32,
}

impl EncodedImage {
    /// Encode a source image into a data URL.
    pub fn encode(image: &SourceImage, format: OutputFormat) -> Result<Self, EncodeError> {
        Self::from_rgba(image.pixels(), image.width(), image.height(), format)
    }

    /// Encode raw RGBA pixels into a data URL.
    pub fn from_rgba(
        pixels: &[u8],
        width: u32,
        height: u32,
        format: OutputFormat,
    ) -> Result<Self, EncodeError> {
        let bytes = format.encode(pixels, width, height)?;
        let mime = format.mime();

        let payload = STANDARD.encode(&bytes);
        let mut data_url = String::with_capacity(mime.len() + payload.len() + 13);
        data_url.push_str("data:");
        data_url.push_str(mime);
        data_url.push_str(";base64,");
        data_url.push_str(&payload);

        tracing::debug!(mime, width, height, bytes = bytes.len(), "encoded image");

        Ok(Self {
            data_url,
            mime,
            width,
            height,
        })
    }

    /// The data URL.
    pub fn as_str(&self) -> &str {
        &self.data_url
    }

    /// Consume and return the data URL.
    pub fn into_string(self) -> String {
        self.data_url
    }

    /// MIME type of the encoded payload.
    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// Encoded image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Encoded image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The encoded file bytes (the base64 payload, decoded).
    pub fn to_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        decode::parse_data_url(&self.data_url).map(|parsed| parsed.bytes)
    }

    /// Decode back into a source image so transforms can be chained.
    pub fn decode(&self) -> Result<SourceImage, DecodeError> {
        decode::decode_data_url(&self.data_url)
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data_url)
    }
}

impl AsRef<str> for EncodedImage {
    fn as_ref(&self) -> &str {
        &self.data_url
    }
}

impl From<EncodedImage> for String {
    fn from(image: EncodedImage) -> Self {
        image.data_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 10) as u8, (y * 10) as u8, 77, 255]);
            }
        }
        SourceImage::from_rgba(width, height, pixels).unwrap()
    }

    #[test]
    fn test_default_format_is_jpeg_92() {
        assert_eq!(OutputFormat::default(), OutputFormat::Jpeg { quality: 92 });
        assert_eq!(OutputFormat::default().mime(), "image/jpeg");
    }

    #[test]
    fn test_jpeg_data_url_header() {
        let encoded = EncodedImage::encode(&gradient(8, 8), OutputFormat::default()).unwrap();

        assert!(encoded.as_str().starts_with("data:image/jpeg;base64,/9j/"));
        assert_eq!(encoded.mime(), "image/jpeg");
        assert_eq!(encoded.dimensions(), (8, 8));
    }

    #[test]
    fn test_png_roundtrip_is_exact() {
        let src = gradient(6, 4);
        let encoded = EncodedImage::encode(&src, OutputFormat::Png).unwrap();

        assert!(encoded.as_str().starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(encoded.decode().unwrap(), src);
    }

    #[test]
    fn test_to_bytes_matches_payload() {
        let encoded = EncodedImage::encode(&gradient(2, 2), OutputFormat::Png).unwrap();
        let bytes = encoded.to_bytes().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_display_and_into_string() {
        let encoded = EncodedImage::encode(&gradient(2, 2), OutputFormat::Png).unwrap();
        let shown = encoded.to_string();
        assert_eq!(shown, encoded.clone().into_string());
        assert_eq!(String::from(encoded), shown);
    }

    #[test]
    fn test_output_format_serde() {
        let jpeg: OutputFormat = serde_json::from_str(r#"{"type":"jpeg","quality":70}"#).unwrap();
        assert_eq!(jpeg, OutputFormat::Jpeg { quality: 70 });

        let defaulted: OutputFormat = serde_json::from_str(r#"{"type":"jpeg"}"#).unwrap();
        assert_eq!(defaulted, OutputFormat::default());

        let png: OutputFormat = serde_json::from_str(r#"{"type":"png"}"#).unwrap();
        assert_eq!(png, OutputFormat::Png);
        assert_eq!(serde_json::to_string(&png).unwrap(), r#"{"type":"png"}"#);
    }
}
