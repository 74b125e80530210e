//! Local asset access for image widgets
//!
//! Images with a local source are read through an `AssetReader` so hosts
//! can serve them from disk, an archive or memory. Loaded bytes become a
//! `data:` URL the view can display without further file access.

use std::collections::HashMap;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::GenericImageView;
use log::debug;

use crate::error::{Error, Result};

/// MIME type used when the extension gives no hint.
const FALLBACK_MIME: &str = "image/jpeg";

/// Reads asset bytes by resolved path.
pub trait AssetReader {
    fn read_asset(&self, path: &str) -> Result<Vec<u8>>;
}

/// Reads assets from the file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsAssetReader;

impl AssetReader for FsAssetReader {
    fn read_asset(&self, path: &str) -> Result<Vec<u8>> {
        let bytes = std::fs::read(path).map_err(|e| Error::asset(path, e))?;
        debug!("Read asset '{}' ({} bytes)", path, bytes.len());
        Ok(bytes)
    }
}

/// Serves assets from a map. Missing paths are `AssetNotFound`.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssetReader {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssetReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.assets.insert(path.into(), bytes.into());
        self
    }
}

impl AssetReader for MemoryAssetReader {
    fn read_asset(&self, path: &str) -> Result<Vec<u8>> {
        self.assets
            .get(path)
            .cloned()
            .ok_or_else(|| Error::AssetNotFound { path: path.into() })
    }
}

/// MIME type guessed from the path's extension.
pub fn image_mime(path: &str) -> String {
    mime_guess::from_path(Path::new(path))
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

/// Encode loaded bytes as a `data:` URL.
pub fn data_url(path: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", image_mime(path), STANDARD.encode(bytes))
}

/// Pixel dimensions of an encoded raster image, when it decodes.
pub fn image_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let image = image::load_from_memory(bytes).ok()?;
    Some(image.dimensions())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::new(width, height);
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_fs_reader_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        std::fs::write(&path, b"bytes").unwrap();

        let bytes = FsAssetReader.read_asset(&path.to_string_lossy()).unwrap();
        assert_eq!(bytes, b"bytes");
    }

    #[test]
    fn test_fs_reader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");
        let err = FsAssetReader
            .read_asset(&path.to_string_lossy())
            .unwrap_err();
        assert!(matches!(err, Error::AssetNotFound { .. }));
    }

    #[test]
    fn test_memory_reader() {
        let reader = MemoryAssetReader::new().with_asset("a.png", vec![1, 2]);
        assert_eq!(reader.read_asset("a.png").unwrap(), vec![1, 2]);
        assert!(reader.read_asset("b.png").is_err());
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime("/x/pic.png"), "image/png");
        assert_eq!(image_mime("photo.JPG"), "image/jpeg");
        assert_eq!(image_mime("icon.svg"), "image/svg+xml");
        assert_eq!(image_mime("noext"), "image/jpeg");
        assert_eq!(image_mime("notes.txt"), "image/jpeg");
    }

    #[test]
    fn test_data_url() {
        assert_eq!(data_url("a.gif", b"hi"), "data:image/gif;base64,aGk=");
    }

    #[test]
    fn test_image_dimensions() {
        assert_eq!(image_dimensions(&png_bytes(3, 2)), Some((3, 2)));
        assert_eq!(image_dimensions(b"not an image"), None);
    }
}
