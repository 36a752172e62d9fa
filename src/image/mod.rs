//! Image generation module.

mod provider;
pub mod providers;
mod types;

pub use provider::{ImageProvider, NullProgress, ProgressFn, ProgressObserver};
pub use types::{
    GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, Progress, ProviderKind,
    Resolution,
};
