use base64::{Engine, engine::general_purpose::STANDARD};
use std::fmt;

use super::ImageFormat;

/// An image encoded for inline use: MIME type plus base64 payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: &'static str,
    pub payload: String,
}

impl EncodedImage {
    /// Encode raw image bytes for the given format
    pub fn encode(format: ImageFormat, data: &[u8]) -> Self {
        EncodedImage {
            mime_type: format.mime_type(),
            payload: STANDARD.encode(data),
        }
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_format() {
        let encoded = EncodedImage::encode(ImageFormat::Gif, b"GIF89a");
        assert_eq!(encoded.to_string(), "data:image/gif;base64,R0lGODlh");
    }

    #[test]
    fn test_payload_decodes_to_original_bytes() {
        let data: Vec<u8> = (0..=255).cycle().take(1000).collect();
        let encoded = EncodedImage::encode(ImageFormat::Png, &data);
        assert_eq!(STANDARD.decode(&encoded.payload).unwrap(), data);
    }

    #[test]
    fn test_empty_file() {
        let encoded = EncodedImage::encode(ImageFormat::Bmp, &[]);
        assert_eq!(encoded.to_string(), "data:image/bmp;base64,");
    }
}
