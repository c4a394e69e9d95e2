// Upload intake: turns a user-provided file into (base64, mime) for the host.
// Rejections carry the exact message the user should see; nothing is decoded
// here beyond sniffing the format.

use crate::error::{Error, Result};
use crate::export;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::ImageFormat;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const INVALID_TYPE_MSG: &str = "Please upload a valid image file (JPEG, PNG, WebP).";
pub const TOO_LARGE_MSG: &str = "File size too large. Please upload an image under 10MB.";

/// An accepted upload, as handed to the editor and the generation backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAsset {
    pub data: String, // bare base64
    pub mime_type: String,
}

impl ImageAsset {
    /// Raw file bytes; tolerates a `data:` envelope around the payload.
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        export::decode_base64(export::strip_data_url(&self.data))
    }
}

/// Check type and size before the payload is read or decoded.
pub fn validate(mime_type: &str, size: u64, max_bytes: u64) -> Result<()> {
    if !mime_type.starts_with("image/") {
        warn!(mime_type, "upload rejected: not an image");
        return Err(Error::upload(INVALID_TYPE_MSG));
    }
    if size > max_bytes {
        warn!(size, max_bytes, "upload rejected: too large");
        return Err(Error::upload(TOO_LARGE_MSG));
    }
    Ok(())
}

/// Bytes read up front to sniff the format; every magic number `image`
/// recognises fits well inside this.
const SNIFF_LEN: u64 = 64;

/// Read a file from disk into an asset. The type comes from the content
/// first, then the extension; anything unrecognised is not an image.
/// Only the header is read until the file has passed validation.
pub fn from_path(path: &Path, max_bytes: u64) -> Result<ImageAsset> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();

    let mut header = Vec::with_capacity(SNIFF_LEN as usize);
    (&mut file).take(SNIFF_LEN).read_to_end(&mut header)?;
    let mime = sniff_mime(&header, path).unwrap_or("application/octet-stream");
    validate(mime, size, max_bytes)?;

    let mut bytes = header;
    file.read_to_end(&mut bytes)?;

    info!(path = %path.display(), mime, size, "upload accepted");
    Ok(ImageAsset { data: STANDARD.encode(&bytes), mime_type: mime.to_string() })
}

/// Accept a `data:<mime>;base64,<payload>` URL, as a browser file reader
/// would produce it.
pub fn from_data_url(url: &str, max_bytes: u64) -> Result<ImageAsset> {
    let (mime, payload) = export::split_data_url(url).ok_or_else(|| Error::upload(INVALID_TYPE_MSG))?;
    let size = export::decode_base64(payload)?.len() as u64;
    validate(mime, size, max_bytes)?;
    Ok(ImageAsset { data: payload.to_string(), mime_type: mime.to_string() })
}

fn sniff_mime(bytes: &[u8], path: &Path) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(path).ok())
        .map(|f| f.to_mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rejects_non_images() {
        let err = validate("application/pdf", 10, MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.to_string(), INVALID_TYPE_MSG);
    }

    #[test]
    fn rejects_oversized() {
        let err = validate("image/png", MAX_UPLOAD_BYTES + 1, MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.to_string(), TOO_LARGE_MSG);
        assert!(validate("image/png", MAX_UPLOAD_BYTES, MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn reads_png_from_disk_by_content() {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]));
        let bytes = export::encode_png(&img).unwrap();
        // Misleading extension: content wins.
        let mut f = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        f.write_all(&bytes).unwrap();

        let asset = from_path(f.path(), MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(asset.mime_type, "image/png");
        assert_eq!(asset.decode_bytes().unwrap(), bytes);
    }

    #[test]
    fn unknown_file_is_rejected_as_invalid_type() {
        let mut f = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        f.write_all(b"hello").unwrap();
        let err = from_path(f.path(), MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.to_string(), INVALID_TYPE_MSG);
    }

    #[test]
    fn size_limit_uses_file_size() {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]));
        let bytes = export::encode_png(&img).unwrap();
        let mut f = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        f.write_all(&bytes).unwrap();
        let err = from_path(f.path(), 8).unwrap_err();
        assert_eq!(err.to_string(), TOO_LARGE_MSG);
    }

    #[test]
    fn oversized_file_rejected_from_header_alone() {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]));
        let mut f = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        f.write_all(&export::encode_png(&img).unwrap()).unwrap();
        // Sparse tail: the file claims far more than the limit.
        f.as_file().set_len(4 * MAX_UPLOAD_BYTES).unwrap();

        let err = from_path(f.path(), MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.to_string(), TOO_LARGE_MSG);
    }

    #[test]
    fn oversized_non_image_reports_type_first() {
        let mut f = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        f.write_all(b"not an image at all").unwrap();
        f.as_file().set_len(4 * MAX_UPLOAD_BYTES).unwrap();

        let err = from_path(f.path(), MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.to_string(), INVALID_TYPE_MSG);
    }

    #[test]
    fn data_url_intake() {
        let asset = from_data_url("data:image/webp;base64,QUJD", MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(asset, ImageAsset { data: "QUJD".into(), mime_type: "image/webp".into() });

        let err = from_data_url("data:text/plain;base64,QUJD", MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.to_string(), INVALID_TYPE_MSG);
        assert!(from_data_url("QUJD", MAX_UPLOAD_BYTES).is_err());
    }
}
