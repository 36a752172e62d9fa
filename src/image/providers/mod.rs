//! Image generation providers.

#[cfg(feature = "pollinations")]
mod pollinations;
#[cfg(feature = "together")]
mod together;

#[cfg(feature = "pollinations")]
pub use pollinations::{PollinationsProvider, PollinationsProviderBuilder};

#[cfg(feature = "together")]
pub use together::{TogetherProvider, TogetherProviderBuilder};
