use anyhow::{Context, Result};
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

/// Public URL prefix under which `media_path` is served.
pub const MEDIA_URL: &str = "/media";

const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("No file was submitted.")]
    Empty,

    #[error(
        "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
    )]
    NotAnImage,

    #[error("Image exceeds the maximum size of {max} bytes.")]
    TooLarge { max: usize },

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Identifies an image by its leading magic bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else if bytes.len() >= 26 && bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
        }
    }

    const fn decoder_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Gif => image::ImageFormat::Gif,
            Self::Webp => image::ImageFormat::WebP,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// Fully decodes the payload; a matching signature alone is not enough.
fn decode(bytes: &[u8], format: ImageFormat) -> Result<(), ImageError> {
    image::ImageReader::with_format(Cursor::new(bytes), format.decoder_format())
        .decode()
        .map(|_| ())
        .map_err(|e| {
            debug!(error = %e, format = format.extension(), "Rejected undecodable upload");
            ImageError::NotAnImage
        })
}

/// Writes uploaded recipe images below the media root.
#[derive(Debug, Clone)]
pub struct ImageStore {
    media_root: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    #[must_use]
    pub fn new(media_root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            media_root: media_root.into(),
            max_bytes,
        }
    }

    /// Checks the payload is a decodable image without touching the disk.
    pub async fn inspect(&self, bytes: &[u8]) -> Result<ImageFormat, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(ImageError::TooLarge {
                max: self.max_bytes,
            });
        }
        let format = ImageFormat::sniff(bytes).ok_or(ImageError::NotAnImage)?;

        let owned = bytes.to_vec();
        tokio::task::spawn_blocking(move || decode(&owned, format))
            .await
            .context("Image decoding task failed")??;

        Ok(format)
    }

    /// Stores a recipe image under a fresh name and returns its public reference.
    pub async fn save_recipe_image(&self, bytes: &[u8]) -> Result<String, ImageError> {
        let format = self.inspect(bytes).await?;

        let dir = self.media_root.join(RECIPE_IMAGE_DIR);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let filename = format!("{}.{}", uuid::Uuid::new_v4(), format.extension());
        let file_path = dir.join(&filename);

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write image to {}", file_path.display()))?;

        info!(path = %file_path.display(), size = bytes.len(), "Stored recipe image");

        Ok(format!("{MEDIA_URL}/{RECIPE_IMAGE_DIR}/{filename}"))
    }

    /// Removes a previously stored image given its public reference.
    /// Unknown or foreign references are ignored.
    pub async fn remove(&self, reference: &str) -> Result<()> {
        let Some(relative) = reference
            .strip_prefix(MEDIA_URL)
            .and_then(|r| r.strip_prefix('/'))
        else {
            return Ok(());
        };
        if relative.split('/').any(|part| part == ".." || part.is_empty()) {
            return Ok(());
        }

        let path = self.media_root.join(relative);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed recipe image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn encode(format: image::ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image::RgbImage::new(2, 2).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("recipebox-img-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(ImageFormat::sniff(PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a\x01\0"), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::sniff(b"RIFF\x24\0\0\0WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
    }

    #[test]
    fn test_sniff_rejects_text() {
        assert_eq!(ImageFormat::sniff(b"notimage"), None);
        assert_eq!(ImageFormat::sniff(b""), None);
        assert_eq!(ImageFormat::sniff(b"BM"), None);
    }

    #[tokio::test]
    async fn test_inspect_enforces_size_limit() {
        let store = ImageStore::new(temp_root(), 8);
        assert!(matches!(
            store.inspect(PNG_HEADER).await,
            Err(ImageError::TooLarge { max: 8 })
        ));
        assert!(matches!(store.inspect(b"").await, Err(ImageError::Empty)));
    }

    #[tokio::test]
    async fn test_inspect_decodes_real_images() {
        let store = ImageStore::new(temp_root(), 1024 * 1024);
        assert_eq!(
            store.inspect(&encode(image::ImageFormat::Png)).await.unwrap(),
            ImageFormat::Png
        );
        assert_eq!(
            store.inspect(&encode(image::ImageFormat::Bmp)).await.unwrap(),
            ImageFormat::Bmp
        );
    }

    #[tokio::test]
    async fn test_inspect_rejects_corrupted_images() {
        let store = ImageStore::new(temp_root(), 1024 * 1024);

        let mut garbage = b"\x89PNG\r\n\x1a\n".to_vec();
        garbage.extend_from_slice(b"this is not an image at all");
        assert!(matches!(
            store.inspect(&garbage).await,
            Err(ImageError::NotAnImage)
        ));

        let png = encode(image::ImageFormat::Png);
        assert!(matches!(
            store.inspect(&png[..png.len() / 2]).await,
            Err(ImageError::NotAnImage)
        ));
    }

    #[tokio::test]
    async fn test_save_then_remove() {
        let root = temp_root();
        let store = ImageStore::new(&root, 1024);

        let reference = store
            .save_recipe_image(&encode(image::ImageFormat::Png))
            .await
            .unwrap();
        assert!(reference.starts_with("/media/uploads/recipe/"));
        assert!(reference.ends_with(".png"));

        let on_disk = root.join(reference.trim_start_matches("/media/"));
        assert!(on_disk.exists());

        store.remove(&reference).await.unwrap();
        assert!(!on_disk.exists());

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_remove_ignores_escaping_paths() {
        let store = ImageStore::new(temp_root(), 1024);
        store.remove("/media/../etc/passwd").await.unwrap();
        store.remove("https://elsewhere/x.png").await.unwrap();
    }
}
