//! Pollinations AI image generation provider (templated GET, single hop).
//!
//! The prompt is URL-encoded into the path of a templated URL together
//! with the pixel dimensions, a model tag, a seed, and an enhance flag.
//! The response body is the image itself; no API key, no second fetch.

use crate::error::{PromptPixError, Result};
use crate::image::provider::{ImageProvider, ProgressObserver};
use crate::image::types::{
    GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, Progress, ProviderKind,
    Resolution,
};
use async_trait::async_trait;
use rand::Rng;
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "https://image.pollinations.ai";
const DEFAULT_MODEL: &str = "flux";

// Provider tuning constants with no documented semantics; kept as opaque
// configuration.
const SEED_RANGE: std::ops::Range<u64> = 0..1_000_000;
const ENHANCE: bool = true;

/// Maps a resolution choice to the pixel sizes used with Pollinations.
fn resolve_size(resolution: Resolution) -> (u32, u32) {
    match resolution {
        Resolution::Square => (1280, 1280),
        Resolution::Widescreen => (1920, 1080),
        Resolution::Standard => (1440, 1080),
        Resolution::Tall => (1080, 1920),
    }
}

/// Builder for [`PollinationsProvider`].
#[derive(Debug, Clone)]
pub struct PollinationsProviderBuilder {
    model: String,
    base_url: String,
}

impl Default for PollinationsProviderBuilder {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl PollinationsProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model tag spliced into the URL.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the API base URL. Intended for tests.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the provider. No credentials are required.
    pub fn build(self) -> PollinationsProvider {
        PollinationsProvider {
            client: reqwest::Client::new(),
            model: self.model,
            base_url: self.base_url,
        }
    }
}

/// Pollinations AI image generation provider.
pub struct PollinationsProvider {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl PollinationsProvider {
    /// Creates a new [`PollinationsProviderBuilder`].
    pub fn builder() -> PollinationsProviderBuilder {
        PollinationsProviderBuilder::new()
    }

    fn request_url(&self, request: &GenerationRequest) -> String {
        format!(
            "{}/prompt/{}",
            self.base_url,
            urlencoding::encode(&request.prompt)
        )
    }
}

#[async_trait]
impl ImageProvider for PollinationsProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
        progress: &dyn ProgressObserver,
    ) -> Result<GeneratedImage> {
        let start = Instant::now();
        let (width, height) = resolve_size(request.resolution);
        let seed = request
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen_range(SEED_RANGE));

        progress.on_phase(Progress::Submitting);
        let response = self
            .client
            .get(self.request_url(request))
            .query(&[
                ("width", width.to_string()),
                ("height", height.to_string()),
                ("model", self.model.clone()),
                ("seed", seed.to_string()),
                ("enhance", ENHANCE.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PromptPixError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        progress.on_phase(Progress::Downloading);
        let data = response.bytes().await?.to_vec();
        tracing::debug!(bytes = data.len(), seed, "image downloaded");

        let duration_ms = start.elapsed().as_millis() as u64;
        let format = ImageFormat::from_magic_bytes(&data).unwrap_or(ImageFormat::Jpeg);

        Ok(GeneratedImage::new(
            data,
            format,
            ProviderKind::Pollinations,
            GenerationMetadata {
                model: Some(self.model.clone()),
                seed: Some(seed),
                duration_ms: Some(duration_ms),
            },
        ))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Pollinations
    }
}
