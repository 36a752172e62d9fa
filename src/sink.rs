//! Image persistence sinks.
//!
//! A sink turns a generated image into a uniquely named file inside a
//! deterministic, created-on-demand directory. Two variants cover the
//! platform split: a public, user-visible media location and an
//! application-private data directory. Selection happens here at the
//! boundary, never inside the request client.

use crate::error::{PromptPixError, Result};
use crate::image::{GeneratedImage, ImageFormat};
use chrono::Local;
use std::path::{Path, PathBuf};

/// Fixed subfolder name for generated images.
pub const OUTPUT_FOLDER: &str = "AI_Generated_Images";

const FILE_PREFIX: &str = "image";
const JPEG_QUALITY: u8 = 90;

/// Destination for generated images.
pub trait ImageSink: Send + Sync {
    /// Writes the image and returns the final path.
    fn save(&self, image: &GeneratedImage) -> Result<PathBuf>;
}

/// Writes `image` as a JPEG file under `root`/[`OUTPUT_FOLDER`].
///
/// Pre-encoded JPEG payloads are stored as-is; anything else is decoded
/// and re-encoded. The file name embeds a second-resolution timestamp.
fn write_jpeg(root: &Path, image: &GeneratedImage) -> Result<PathBuf> {
    let dir = root.join(OUTPUT_FOLDER);
    std::fs::create_dir_all(&dir)?;

    let file_name = format!("{FILE_PREFIX}-{}.jpg", Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(file_name);

    if image.format == ImageFormat::Jpeg {
        std::fs::write(&path, &image.data)?;
    } else {
        let pixels = image.decode()?.to_rgb8();
        let mut out = std::io::BufWriter::new(std::fs::File::create(&path)?);
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
        pixels
            .write_with_encoder(encoder)
            .map_err(|e| PromptPixError::Write(std::io::Error::other(e)))?;
    }

    tracing::debug!(path = %path.display(), "image saved");
    Ok(path)
}

/// Sink writing into a public, user-visible media location.
///
/// Platform media-registration side effects (gallery scanning and the
/// like) are the embedding application's concern, not this sink's.
pub struct PublicMediaSink {
    root: PathBuf,
}

impl PublicMediaSink {
    /// Creates a sink rooted at the given public media directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageSink for PublicMediaSink {
    fn save(&self, image: &GeneratedImage) -> Result<PathBuf> {
        write_jpeg(&self.root, image)
    }
}

/// Sink writing into an application-private data directory.
pub struct PrivateDirectorySink {
    root: PathBuf,
}

impl PrivateDirectorySink {
    /// Creates a sink rooted at the given application data directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageSink for PrivateDirectorySink {
    fn save(&self, image: &GeneratedImage) -> Result<PathBuf> {
        write_jpeg(&self.root, image)
    }
}

/// Picks the platform-appropriate sink rooted at `base`.
///
/// Mobile targets get the public media sink so saved images are
/// user-visible; everything else uses the private directory sink.
pub fn default_sink(base: impl Into<PathBuf>) -> Box<dyn ImageSink> {
    if cfg!(any(target_os = "android", target_os = "ios")) {
        Box::new(PublicMediaSink::new(base))
    } else {
        Box::new(PrivateDirectorySink::new(base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{GenerationMetadata, ProviderKind};

    fn png_image() -> GeneratedImage {
        let pixels = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30]));
        let mut bytes = Vec::new();
        pixels
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        GeneratedImage::from_bytes(bytes, ProviderKind::Together, GenerationMetadata::default())
            .unwrap()
    }

    fn jpeg_image() -> GeneratedImage {
        let pixels = image::RgbImage::from_pixel(4, 4, image::Rgb([30, 30, 200]));
        let mut bytes = Vec::new();
        pixels
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Jpeg,
            )
            .unwrap();
        GeneratedImage::from_bytes(
            bytes,
            ProviderKind::Pollinations,
            GenerationMetadata::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_jpeg_payload_is_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PrivateDirectorySink::new(dir.path());

        let image = jpeg_image();
        let path = sink.save(&image).unwrap();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
        assert!(path.starts_with(dir.path().join(OUTPUT_FOLDER)));
        assert_eq!(std::fs::read(&path).unwrap(), image.data);
    }

    #[test]
    fn test_png_payload_is_reencoded_as_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PublicMediaSink::new(dir.path());

        let path = sink.save(&png_image()).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(
            ImageFormat::from_magic_bytes(&written),
            Some(ImageFormat::Jpeg)
        );
    }

    #[test]
    fn test_jpeg_roundtrip_preserves_visual_content() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PrivateDirectorySink::new(dir.path());

        let path = sink.save(&png_image()).unwrap();
        let reloaded = image::open(&path).unwrap().to_rgb8();

        assert_eq!(reloaded.dimensions(), (4, 4));
        // Lossy-JPEG tolerance on a solid color.
        let px = reloaded.get_pixel(0, 0);
        assert!((px[0] as i32 - 200).abs() < 16);
        assert!((px[1] as i32 - 30).abs() < 16);
        assert!((px[2] as i32 - 30).abs() < 16);
    }

    #[test]
    fn test_output_directory_is_created_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("not_yet_there");
        let sink = PrivateDirectorySink::new(&root);

        let path = sink.save(&jpeg_image()).unwrap();
        assert!(path.starts_with(root.join(OUTPUT_FOLDER)));
    }

    #[test]
    fn test_io_failure_maps_to_write_error() {
        let dir = tempfile::tempdir().unwrap();
        // Occupy the root path with a file so the directory cannot be created.
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, b"file").unwrap();

        let sink = PrivateDirectorySink::new(&blocked);
        let result = sink.save(&jpeg_image());
        assert!(matches!(result, Err(PromptPixError::Write(_))));
    }

    #[test]
    fn test_file_name_shape() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PrivateDirectorySink::new(dir.path());

        let path = sink.save(&jpeg_image()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();

        // image-YYYYMMDD_HHmmss.jpg
        assert!(name.starts_with("image-"));
        assert!(name.ends_with(".jpg"));
        let stamp = &name["image-".len()..name.len() - ".jpg".len()];
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
    }
}
