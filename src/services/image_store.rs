use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::models::SavedImage;
use crate::utils::validation::{known_image_extension, sanitize_filename};

/// Writes decoded uploads into a flat directory. Files are never updated or removed.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Best-effort persistence: failures are logged and reported as `None`.
    pub async fn save(
        &self,
        image: &DynamicImage,
        original_filename: &str,
        sender: &str,
    ) -> Option<SavedImage> {
        match self.try_save(image, original_filename, sender).await {
            Ok(saved) => {
                info!(
                    "Image saved - path: {} | size: {} bytes",
                    saved.path.display(),
                    saved.size
                );
                Some(saved)
            }
            Err(e) => {
                error!("Failed to save image: {:#}", e);
                None
            }
        }
    }

    async fn try_save(
        &self,
        image: &DynamicImage,
        original_filename: &str,
        sender: &str,
    ) -> Result<SavedImage> {
        if !tokio::fs::try_exists(&self.dir).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .with_context(|| format!("creating {}", self.dir.display()))?;
            info!("Created image directory: {}", self.dir.display());
        }

        let file_name = stored_file_name(original_filename, sender, &Local::now());
        let path = self.dir.join(file_name);

        let data = encode_image(image, output_format(original_filename))?;
        tokio::fs::write(&path, &data)
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        let size = tokio::fs::metadata(&path).await?.len();
        Ok(SavedImage { path, size })
    }
}

/// `<stem>_<YYYYMMDD_HHMMSS>_<sender>.<ext>`, with the original extension kept
/// when it is a known image type and `.jpg` appended otherwise.
pub fn stored_file_name<Tz: TimeZone>(
    original_filename: &str,
    sender: &str,
    at: &DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let safe = sanitize_filename(original_filename);
    let timestamp = at.format("%Y%m%d_%H%M%S");
    let sender_part = sender.replace(['.', ':'], "_");

    match known_image_extension(&safe) {
        Some(ext) => {
            let stem = &safe[..safe.len() - ext.len()];
            format!("{}_{}_{}{}", stem, timestamp, sender_part, ext)
        }
        None => format!("{}_{}_{}.jpg", safe, timestamp, sender_part),
    }
}

/// PNG only when the client named a `.png`; everything else is stored as JPEG.
pub fn output_format(original_filename: &str) -> ImageFormat {
    if original_filename.to_lowercase().ends_with(".png") {
        ImageFormat::Png
    } else {
        ImageFormat::Jpeg
    }
}

fn encode_image(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    // JPEG has no alpha channel or 16-bit depth.
    let converted;
    let image = if format == ImageFormat::Jpeg {
        converted = DynamicImage::ImageRgb8(image.to_rgb8());
        &converted
    } else {
        image
    };

    let mut out = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut out), format)
        .with_context(|| format!("encoding image as {:?}", format))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 25).unwrap()
    }

    #[test]
    fn test_stored_file_name_keeps_known_extension() {
        assert_eq!(
            stored_file_name("cat.png", "192.168.1.5", &at()),
            "cat_20240115_103025_192_168_1_5.png"
        );
        assert_eq!(
            stored_file_name("Holiday.JPEG", "10.0.0.1", &at()),
            "Holiday_20240115_103025_10_0_0_1.JPEG"
        );
    }

    #[test]
    fn test_stored_file_name_defaults_to_jpg() {
        assert_eq!(
            stored_file_name("photo", "127.0.0.1", &at()),
            "photo_20240115_103025_127_0_0_1.jpg"
        );
        assert_eq!(
            stored_file_name("scan.webp", "127.0.0.1", &at()),
            "scan.webp_20240115_103025_127_0_0_1.jpg"
        );
        assert_eq!(
            stored_file_name("../", "::1", &at()),
            ".._20240115_103025___1.jpg"
        );
        assert_eq!(
            stored_file_name("", "127.0.0.1", &at()),
            "unknown_20240115_103025_127_0_0_1.jpg"
        );
    }

    #[test]
    fn test_stored_file_name_ipv6_sender() {
        assert_eq!(
            stored_file_name("cat.png", "fe80::1", &at()),
            "cat_20240115_103025_fe80__1.png"
        );
        assert_eq!(
            stored_file_name("photo", "2001:db8::7", &at()),
            "photo_20240115_103025_2001_db8__7.jpg"
        );
        assert_eq!(
            stored_file_name("cat.png", "::ffff:10.0.0.1", &at()),
            "cat_20240115_103025___ffff_10_0_0_1.png"
        );
    }

    #[test]
    fn test_stored_file_name_unique_per_second_and_sender() {
        let a = stored_file_name("cat.png", "10.0.0.1", &at());
        let b = stored_file_name("cat.png", "10.0.0.1", &(at() + Duration::seconds(1)));
        let c = stored_file_name("cat.png", "10.0.0.2", &at());
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_output_format() {
        assert_eq!(output_format("cat.png"), ImageFormat::Png);
        assert_eq!(output_format("CAT.PNG"), ImageFormat::Png);
        assert_eq!(output_format("cat.gif"), ImageFormat::Jpeg);
        assert_eq!(output_format("photo"), ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn test_save_creates_dir_and_writes_png() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().join("received_images"));
        let img = DynamicImage::new_rgba8(4, 4);

        let saved = store.save(&img, "cat.png", "127.0.0.1").await.unwrap();
        assert!(saved.path.starts_with(store.dir()));
        assert!(saved.path.to_string_lossy().ends_with("_127_0_0_1.png"));
        assert!(saved.size > 0);

        let bytes = std::fs::read(&saved.path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_save_rgba_as_jpeg() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path());
        let img = DynamicImage::new_rgba8(4, 4);

        let saved = store.save(&img, "photo", "127.0.0.1").await.unwrap();
        let bytes = std::fs::read(&saved.path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn test_save_failure_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        // a regular file where the directory should be
        let blocker = tmp.path().join("blocked");
        std::fs::write(&blocker, b"x").unwrap();

        let store = ImageStore::new(&blocker);
        let img = DynamicImage::new_rgb8(2, 2);
        assert!(store.save(&img, "cat.png", "127.0.0.1").await.is_none());
    }
}
