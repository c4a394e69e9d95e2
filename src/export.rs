//! Flattened mask export.
//!
//! The surface already holds image + strokes in one buffer, so exporting is
//! just a lossless PNG encode followed by standard base64. The payload never
//! carries a `data:image/png;base64,` envelope; backends embed it directly.

use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Encode `pixels` as PNG bytes.
pub fn encode_png(pixels: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    pixels
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| Error::Encode(format!("PNG: {e}")))?;
    Ok(buf)
}

/// Encode `pixels` as PNG and return bare base64.
pub fn encode_png_base64(pixels: &RgbaImage) -> Result<String> {
    Ok(STANDARD.encode(encode_png(pixels)?))
}

/// Split a `data:<mime>;base64,<payload>` URL into `(mime, payload)`.
pub fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    if mime.is_empty() || payload.is_empty() {
        return None;
    }
    Some((mime, payload))
}

/// Drop a data-URL envelope if there is one; bare payloads pass through.
pub fn strip_data_url(payload: &str) -> &str {
    split_data_url(payload).map_or(payload, |(_, data)| data)
}

pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(payload.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_base64_has_no_envelope_and_decodes_back() {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 128]));
        let b64 = encode_png_base64(&img).unwrap();
        assert!(!b64.starts_with("data:"));

        let bytes = decode_base64(&b64).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let back = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(back, img);
    }

    #[test]
    fn data_url_parts() {
        assert_eq!(split_data_url("data:image/jpeg;base64,QUJD"), Some(("image/jpeg", "QUJD")));
        assert_eq!(split_data_url("QUJD"), None);
        assert_eq!(split_data_url("data:;base64,QUJD"), None);
        assert_eq!(split_data_url("data:image/png;base64,"), None);
    }

    #[test]
    fn strip_passes_bare_payload_through() {
        assert_eq!(strip_data_url("data:image/png;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url("QUJD"), "QUJD");
    }

    #[test]
    fn bad_base64_is_an_error() {
        assert!(matches!(decode_base64("not base64!!"), Err(Error::Base64(_))));
    }
}
