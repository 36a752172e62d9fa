//! Image provider trait and progress reporting.

use crate::error::Result;
use crate::image::types::{GeneratedImage, GenerationRequest, Progress, ProviderKind};
use async_trait::async_trait;

/// Observer for phase transitions during a generation round trip.
///
/// Implemented by the presentation layer to surface status lines while a
/// request is in flight. A plain closure works too.
pub trait ProgressObserver: Send + Sync {
    /// Called when the generation flow enters `phase`.
    fn on_phase(&self, phase: Progress);
}

/// Observer that discards all progress events.
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn on_phase(&self, _phase: Progress) {}
}

/// Observer backed by a callback.
pub struct ProgressFn<F>(pub F);

impl<F> ProgressObserver for ProgressFn<F>
where
    F: Fn(Progress) + Send + Sync,
{
    fn on_phase(&self, phase: Progress) {
        (self.0)(phase)
    }
}

/// Trait for image generation providers.
///
/// A provider owns one request shape end to end: building the wire request
/// from a [`GenerationRequest`], the network round trip(s), and resolving
/// the response down to raw image bytes. Failures are terminal for the
/// invocation; no provider retries.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates an image, reporting phase transitions to `progress`.
    async fn generate(
        &self,
        request: &GenerationRequest,
        progress: &dyn ProgressObserver,
    ) -> Result<GeneratedImage>;

    /// Returns the kind of this provider.
    fn kind(&self) -> ProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        match self.kind() {
            ProviderKind::Together => "Together AI",
            ProviderKind::Pollinations => "Pollinations AI",
        }
    }
}
