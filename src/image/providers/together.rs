//! Together AI image generation provider (JSON POST, two-hop).
//!
//! Submits an authenticated POST with the prompt and pixel dimensions,
//! receives a JSON listing of image descriptors, then fetches the first
//! descriptor's URL with a second, unauthenticated GET.

use crate::error::{PromptPixError, Result};
use crate::image::provider::{ImageProvider, ProgressObserver};
use crate::image::types::{
    GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, Progress, ProviderKind,
    Resolution,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "https://api.together.xyz";
const GENERATIONS_PATH: &str = "/v1/images/generations";
const DEFAULT_MODEL: &str = "black-forest-labs/FLUX.1-schnell-Free";
const DEFAULT_STEPS: u32 = 4;

/// Maps a resolution choice to the pixel sizes used with FLUX on Together.
fn resolve_size(resolution: Resolution) -> (u32, u32) {
    match resolution {
        Resolution::Square => (1024, 1024),
        Resolution::Widescreen => (1344, 768),
        Resolution::Standard => (1152, 896),
        Resolution::Tall => (768, 1344),
    }
}

/// Builder for [`TogetherProvider`].
#[derive(Debug, Clone)]
pub struct TogetherProviderBuilder {
    api_key: Option<String>,
    model: String,
    steps: u32,
    base_url: String,
}

impl Default for TogetherProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            steps: DEFAULT_STEPS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl TogetherProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `TOGETHER_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model identifier sent with each request.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the diffusion step count sent with each request.
    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// Overrides the API base URL. Intended for tests.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<TogetherProvider> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("TOGETHER_API_KEY").ok())
            .ok_or(PromptPixError::EmptyCredential)?;

        Ok(TogetherProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            steps: self.steps,
            base_url: self.base_url,
        })
    }
}

/// Together AI image generation provider.
pub struct TogetherProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    steps: u32,
    base_url: String,
}

impl TogetherProvider {
    /// Creates a new [`TogetherProviderBuilder`].
    pub fn builder() -> TogetherProviderBuilder {
        TogetherProviderBuilder::new()
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PromptPixError::Api {
                status: status.as_u16(),
                message: "failed to download image".into(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageProvider for TogetherProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
        progress: &dyn ProgressObserver,
    ) -> Result<GeneratedImage> {
        let start = Instant::now();
        let body = TogetherRequest::from_generation_request(request, &self.model, self.steps);

        progress.on_phase(Progress::Submitting);
        let response = self
            .client
            .post(format!("{}{}", self.base_url, GENERATIONS_PATH))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
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

        progress.on_phase(Progress::Awaiting);
        let listing: TogetherResponse = response.json().await?;

        // Exactly one image is consumed; extra descriptors are ignored.
        let descriptor = listing
            .data
            .into_iter()
            .next()
            .ok_or(PromptPixError::NoImageReturned)?;
        tracing::debug!(url = %descriptor.url, "descriptor received, fetching image");

        progress.on_phase(Progress::Downloading);
        let data = self.download(&descriptor.url).await?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let format = ImageFormat::from_magic_bytes(&data).unwrap_or(ImageFormat::Jpeg);

        Ok(GeneratedImage::new(
            data,
            format,
            ProviderKind::Together,
            GenerationMetadata {
                model: Some(self.model.clone()),
                seed: None,
                duration_ms: Some(duration_ms),
            },
        ))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Together
    }
}

#[derive(Debug, Serialize)]
struct TogetherRequest {
    prompt: String,
    model: String,
    steps: u32,
    width: u32,
    height: u32,
}

impl TogetherRequest {
    fn from_generation_request(req: &GenerationRequest, model: &str, steps: u32) -> Self {
        let (width, height) = resolve_size(req.resolution);
        Self {
            prompt: req.prompt.clone(),
            model: model.to_string(),
            steps,
            width,
            height,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TogetherResponse {
    #[serde(default)]
    data: Vec<ImageDescriptor>,
}

#[derive(Debug, Deserialize)]
struct ImageDescriptor {
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_with_explicit_key() {
        let provider = TogetherProviderBuilder::new().api_key("tgp-test").build();
        assert!(provider.is_ok());
    }

    #[test]
    fn test_builder_without_key_fails() {
        std::env::remove_var("TOGETHER_API_KEY");
        let provider = TogetherProviderBuilder::new().build();
        assert!(matches!(provider, Err(PromptPixError::EmptyCredential)));
    }

    #[test]
    fn test_builder_rejects_blank_key() {
        std::env::remove_var("TOGETHER_API_KEY");
        let provider = TogetherProviderBuilder::new().api_key("   ").build();
        assert!(matches!(provider, Err(PromptPixError::EmptyCredential)));
    }

    #[test]
    fn test_resolution_table() {
        assert_eq!(resolve_size(Resolution::Square), (1024, 1024));
        assert_eq!(resolve_size(Resolution::Widescreen), (1344, 768));
        assert_eq!(resolve_size(Resolution::Standard), (1152, 896));
        assert_eq!(resolve_size(Resolution::Tall), (768, 1344));
    }

    #[test]
    fn test_request_construction() {
        let req = GenerationRequest::new("a red cube").with_resolution(Resolution::Widescreen);
        let wire = TogetherRequest::from_generation_request(&req, DEFAULT_MODEL, DEFAULT_STEPS);

        assert_eq!(wire.prompt, "a red cube");
        assert_eq!(wire.model, "black-forest-labs/FLUX.1-schnell-Free");
        assert_eq!(wire.steps, 4);
        assert_eq!((wire.width, wire.height), (1344, 768));
    }

    #[test]
    fn test_request_serialization_field_names() {
        let req = GenerationRequest::new("a red cube");
        let wire = TogetherRequest::from_generation_request(&req, DEFAULT_MODEL, DEFAULT_STEPS);
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["prompt"], "a red cube");
        assert_eq!(json["width"], 1024);
        assert_eq!(json["height"], 1024);
        assert_eq!(json["steps"], 4);
        assert!(json["model"].is_string());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{"data": [{"url": "https://example.com/a.png"}, {"url": "https://example.com/b.png"}]}"#;
        let resp: TogetherResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.len(), 2);
        assert_eq!(resp.data[0].url, "https://example.com/a.png");
    }

    #[test]
    fn test_response_with_missing_data_field() {
        let resp: TogetherResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.data.is_empty());
    }
}
