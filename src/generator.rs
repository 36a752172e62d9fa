//! The image request client core.
//!
//! [`Generator`] owns the full request/response/save sequence: prompt
//! validation, single-flight gating, the provider round trip, decoding,
//! and persistence through an [`ImageSink`].

use crate::error::{PromptPixError, Result};
use crate::image::{
    GeneratedImage, GenerationRequest, ImageProvider, Progress, ProgressObserver, Resolution,
};
use crate::sink::ImageSink;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of a completed generation.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// Decoded pixel data, ready for display.
    pub pixels: image::DynamicImage,
    /// The image as received from the transport, with metadata.
    pub image: GeneratedImage,
    /// Where the image was written.
    pub path: PathBuf,
}

/// Clears the in-flight flag on every exit path, including early returns
/// and save failures.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Sequential request/response/save client over one provider and one sink.
///
/// At most one generation is in flight at a time; a second invocation
/// while one is outstanding fails with [`PromptPixError::Busy`] instead of
/// dispatching a concurrent network sequence. Every failure is terminal
/// for that invocation; there is no retry logic.
pub struct Generator {
    provider: Arc<dyn ImageProvider>,
    sink: Arc<dyn ImageSink>,
    in_flight: AtomicBool,
}

impl Generator {
    /// Creates a generator over the given provider and sink.
    pub fn new(provider: Arc<dyn ImageProvider>, sink: Arc<dyn ImageSink>) -> Self {
        Self {
            provider,
            sink,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Runs one full generation: validate, request, download, save.
    ///
    /// `resolution_choice` is the raw UI selection index; out-of-range
    /// values fall back to the square entry. Phase transitions are
    /// reported through `progress`.
    pub async fn generate(
        &self,
        prompt: &str,
        resolution_choice: u32,
        progress: &dyn ProgressObserver,
    ) -> Result<GenerationOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PromptPixError::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        if prompt.trim().is_empty() {
            return Err(PromptPixError::EmptyPrompt);
        }

        let request = GenerationRequest::new(prompt)
            .with_resolution(Resolution::from_index(resolution_choice));
        tracing::debug!(
            provider = %self.provider.kind(),
            resolution = ?request.resolution,
            "starting generation"
        );

        let image = self.provider.generate(&request, progress).await?;
        let pixels = image.decode()?;

        progress.on_phase(Progress::Saving);
        let path = self.sink.save(&image)?;

        progress.on_phase(Progress::Done);
        tracing::debug!(path = %path.display(), "generation finished");

        Ok(GenerationOutcome {
            pixels,
            image,
            path,
        })
    }

    /// True while a generation round trip is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}
