//! Core types for image generation.

use crate::error::{PromptPixError, Result};
use serde::{Deserialize, Serialize};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG format (lossy). This is the storage format.
    #[default]
    Jpeg,
    /// PNG format (lossless).
    Png,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Image provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Together AI (authenticated JSON POST, two-hop download).
    Together,
    /// Pollinations AI (unauthenticated templated GET, single hop).
    Pollinations,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Together => write!(f, "together"),
            Self::Pollinations => write!(f, "pollinations"),
        }
    }
}

/// Resolution choices offered to the user.
///
/// Each provider maps these to its own (width, height) pixel table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// 1:1 square.
    #[default]
    Square,
    /// 16:9 widescreen landscape.
    Widescreen,
    /// 4:3 standard landscape.
    Standard,
    /// 9:16 tall portrait.
    Tall,
}

impl Resolution {
    /// Resolves a raw selection index to a resolution choice.
    ///
    /// Any index outside the defined range falls back to the square entry
    /// rather than failing.
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => Self::Square,
            1 => Self::Widescreen,
            2 => Self::Standard,
            3 => Self::Tall,
            _ => Self::Square,
        }
    }
}

/// Phases of a single generation round trip.
///
/// The round trip takes several seconds and the caller has no other
/// feedback channel, so each transition is reported as it begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Request is being submitted to the provider.
    Submitting,
    /// Provider accepted the request; response is being read.
    Awaiting,
    /// Image bytes are being downloaded.
    Downloading,
    /// Image is being written to storage.
    Saving,
    /// The flow finished successfully.
    Done,
}

impl Progress {
    /// Human-readable status line for this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitting => "Generating image...",
            Self::Awaiting => "Waiting for response...",
            Self::Downloading => "Downloading image...",
            Self::Saving => "Saving image...",
            Self::Done => "Done.",
        }
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Seed used, if the provider accepts one.
    pub seed: Option<u64>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A request to generate an image.
///
/// Constructed fresh per invocation and immutable once sent. The concrete
/// wire fields (model, steps, pixel dimensions) are provider-owned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Resolution choice, mapped to pixels by the provider.
    pub resolution: Resolution,
    /// Explicit seed; providers that use seeds draw a random one if absent.
    pub seed: Option<u64>,
}

impl GenerationRequest {
    /// Creates a new request with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            resolution: Resolution::default(),
            seed: None,
        }
    }

    /// Sets the resolution choice.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets an explicit seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// A generated image with its raw transport bytes and metadata.
///
/// The raw bytes are kept untouched so the image can be persisted
/// losslessly, independent of any re-encoding the display layer performs.
#[derive(Debug, Clone)]
#[must_use = "generated image should be saved or displayed"]
pub struct GeneratedImage {
    /// Raw image bytes as received from the transport.
    pub data: Vec<u8>,
    /// Image format.
    pub format: ImageFormat,
    /// Provider that generated this image.
    pub provider: ProviderKind,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(
        data: Vec<u8>,
        format: ImageFormat,
        provider: ProviderKind,
        metadata: GenerationMetadata,
    ) -> Self {
        Self {
            data,
            format,
            provider,
            metadata,
        }
    }

    /// Creates a new generated image, detecting format from magic bytes.
    pub fn from_bytes(
        data: Vec<u8>,
        provider: ProviderKind,
        metadata: GenerationMetadata,
    ) -> Result<Self> {
        let format = ImageFormat::from_magic_bytes(&data)
            .ok_or_else(|| PromptPixError::Decode("unknown image format".into()))?;
        Ok(Self::new(data, format, provider, metadata))
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Decodes the raw bytes into pixel data.
    pub fn decode(&self) -> Result<image::DynamicImage> {
        image::load_from_memory(&self.data).map_err(|e| PromptPixError::Decode(e.to_string()))
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL, suitable for direct display.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            self.to_base64()
        )
    }
}
