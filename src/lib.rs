#![warn(missing_docs)]
//! PromptPix - text-to-image generation with local persistence.
//!
//! This crate turns a text prompt into a saved image file using a
//! third-party generation API, behind one [`ImageProvider`] interface
//! with two variants: Together AI (authenticated JSON POST with a
//! follow-up download) and Pollinations AI (a single templated GET).
//! The main flow is gated behind a one-time API-key entry persisted in a
//! local settings store.
//!
//! # Quick Start
//!
//! ```no_run
//! use promptpix::{
//!     CredentialGate, Generator, JsonFileStore, NullProgress, TogetherProvider, default_sink,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> promptpix::Result<()> {
//!     let gate = CredentialGate::new(JsonFileStore::open("settings.json")?);
//!     if !gate.has_credential() {
//!         gate.set_credential("tgp-...")?;
//!     }
//!
//!     let provider = TogetherProvider::builder()
//!         .api_key(gate.credential().unwrap_or_default())
//!         .build()?;
//!     let generator = Generator::new(Arc::new(provider), Arc::from(default_sink("data")));
//!
//!     let outcome = generator.generate("a red cube", 0, &NullProgress).await?;
//!     println!("saved to {}", outcome.path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `together`: Together AI provider (JSON-POST request shape)
//! - `pollinations`: Pollinations AI provider (GET-URL request shape)

mod error;
mod generator;
pub mod image;
mod settings;
mod sink;

pub use error::{PromptPixError, Result};
pub use generator::{GenerationOutcome, Generator};
pub use settings::{CredentialGate, JsonFileStore, MemoryStore, SettingsStore, CREDENTIAL_KEY};
pub use sink::{default_sink, ImageSink, PrivateDirectorySink, PublicMediaSink, OUTPUT_FOLDER};

pub use image::{
    GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, ImageProvider,
    NullProgress, Progress, ProgressFn, ProgressObserver, ProviderKind, Resolution,
};

#[cfg(feature = "pollinations")]
pub use image::providers::{PollinationsProvider, PollinationsProviderBuilder};

#[cfg(feature = "together")]
pub use image::providers::{TogetherProvider, TogetherProviderBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{PromptPixError, Result};
    pub use crate::generator::{GenerationOutcome, Generator};
    pub use crate::image::{
        GeneratedImage, GenerationRequest, ImageProvider, NullProgress, Progress, ProgressFn,
        ProgressObserver, Resolution,
    };
    pub use crate::settings::{CredentialGate, SettingsStore};
    pub use crate::sink::ImageSink;

    #[cfg(feature = "pollinations")]
    pub use crate::image::providers::PollinationsProvider;

    #[cfg(feature = "together")]
    pub use crate::image::providers::TogetherProvider;
}
