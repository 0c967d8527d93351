//! AI image-generation vendor integration.
//!
//! [`ImageProvider`] is the capability set every vendor adapter
//! implements: start a training run, poll its status, and generate
//! images from a trained model handle.  All outbound HTTP goes through
//! the bounded-retry transport in [`retry`].

pub mod error;
pub mod handle;
pub mod retry;
pub mod stability;
pub mod types;

mod provider;

pub use error::ProviderError;
pub use handle::ModelHandle;
pub use provider::{create_provider, provider_from_env, ImageProvider, ProviderConfig};
pub use retry::RetryConfig;
