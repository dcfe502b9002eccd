use base64::Engine;
use image::ImageFormat;

const FALLBACK_MIME: &str = "image/png";

/// A decoded `data:` image reference.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// File extension for downloads, derived from the MIME type.
    pub fn extension(&self) -> &'static str {
        ImageFormat::from_mime_type(&self.mime_type)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("png")
    }
}

/// Build a `data:<mime>;base64,<payload>` reference.
pub fn to_data_uri(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_payload)
}

/// Guess the MIME type of a base64 payload by sniffing its magic bytes.
///
/// Falls back to `image/png` when the payload does not decode or the format
/// is not recognized.
pub fn sniff_mime(base64_payload: &str) -> &'static str {
    base64::engine::general_purpose::STANDARD
        .decode(base64_payload)
        .ok()
        .and_then(|bytes| image::guess_format(&bytes).ok())
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}

/// Decode a base64 `data:` URI. Returns `None` for anything else.
pub fn decode_data_uri(uri: &str) -> Option<DecodedImage> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime_type = meta.strip_suffix(";base64")?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;

    Some(DecodedImage {
        mime_type: if mime_type.is_empty() {
            FALLBACK_MIME.to_string()
        } else {
            mime_type.to_string()
        },
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[test]
    fn test_sniff_png() {
        assert_eq!(sniff_mime(PNG_B64), "image/png");
    }

    #[test]
    fn test_sniff_jpeg() {
        let jpeg = base64::engine::general_purpose::STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]);
        assert_eq!(sniff_mime(&jpeg), "image/jpeg");
    }

    #[test]
    fn test_sniff_garbage_falls_back() {
        assert_eq!(sniff_mime("not base64!"), "image/png");
        assert_eq!(sniff_mime("AAAA"), "image/png");
    }

    #[test]
    fn test_decode_data_uri() {
        let uri = to_data_uri("image/png", PNG_B64);
        let decoded = decode_data_uri(&uri).unwrap();
        assert_eq!(decoded.mime_type, "image/png");
        assert_eq!(&decoded.bytes[1..4], b"PNG");
        assert_eq!(decoded.extension(), "png");
    }

    #[test]
    fn test_decode_rejects_non_data_uri() {
        assert!(decode_data_uri("https://example.com/fox.png").is_none());
        assert!(decode_data_uri("data:image/png,rawpayload").is_none());
    }

    #[test]
    fn test_extension_for_jpeg() {
        let image = DecodedImage {
            mime_type: "image/jpeg".to_string(),
            bytes: Vec::new(),
        };
        assert_eq!(image.extension(), "jpg");
    }
}
