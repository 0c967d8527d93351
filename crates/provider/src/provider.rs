//! The vendor capability trait and provider factory.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use pawtrait_core::pet::PetMeta;

use crate::error::ProviderError;
use crate::retry::RetryConfig;
use crate::stability::StabilityProvider;
use crate::types::{GenerationOutcome, GenerationParams, TrainingOutcome, TrainingStatus};

/// Capability set implemented once per AI vendor.
///
/// Implementations own their transport reliability: every method wraps
/// its HTTP round trips in the bounded-retry policy, so callers see
/// either a result or the final attempt's error.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short vendor name recorded on `pet_models.provider`.
    fn name(&self) -> &'static str;

    /// Start (or approximate) a training run over the pet's photos.
    ///
    /// `images` must be non-empty. The returned handle must be usable
    /// by [`generate_images`](Self::generate_images) once the reported
    /// state reaches `Ready`.
    async fn start_training(
        &self,
        images: &[String],
        meta: &PetMeta,
    ) -> Result<TrainingOutcome, ProviderError>;

    /// Poll a training run. Idempotent and side-effect-free.
    async fn training_status(
        &self,
        provider_model_id: &str,
    ) -> Result<TrainingStatus, ProviderError>;

    /// Generate images from a trained model handle.
    ///
    /// With `reference_images` present the call is image-conditioned
    /// (reference content blended with the style prompt at the
    /// configured influence weight); otherwise it falls back to
    /// text-only generation from the assembled prompt.
    async fn generate_images(
        &self,
        provider_model_id: &str,
        reference_images: &[String],
        params: &GenerationParams,
    ) -> Result<GenerationOutcome, ProviderError>;
}

/// Provider selection and credentials, usually read from the
/// environment.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Vendor name (`stability` is the only implementation today).
    pub provider: String,
    /// Bearer token for the vendor API.
    pub api_key: String,
    /// Transport retry policy shared by all calls.
    pub retry: RetryConfig,
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                        | Default     |
    /// |--------------------------------|-------------|
    /// | `AI_PROVIDER`                  | `stability` |
    /// | `STABILITY_API_KEY`            | (required)  |
    /// | `PROVIDER_MAX_ATTEMPTS`        | `3`         |
    /// | `PROVIDER_INITIAL_DELAY_MS`    | `1000`      |
    /// | `PROVIDER_MAX_DELAY_MS`        | `10000`     |
    /// | `PROVIDER_ATTEMPT_TIMEOUT_SECS`| `120`       |
    pub fn from_env() -> Result<Self, ProviderError> {
        let provider =
            std::env::var("AI_PROVIDER").unwrap_or_else(|_| StabilityProvider::NAME.into());

        let api_key = std::env::var("STABILITY_API_KEY")
            .map_err(|_| ProviderError::Config("STABILITY_API_KEY is not set".into()))?;

        let retry = RetryConfig {
            max_attempts: env_parse("PROVIDER_MAX_ATTEMPTS", 3)? as u32,
            initial_delay: Duration::from_millis(env_parse("PROVIDER_INITIAL_DELAY_MS", 1000)?),
            max_delay: Duration::from_millis(env_parse("PROVIDER_MAX_DELAY_MS", 10_000)?),
            multiplier: 2.0,
            attempt_timeout: Duration::from_secs(env_parse(
                "PROVIDER_ATTEMPT_TIMEOUT_SECS",
                120,
            )?),
        };

        Ok(Self {
            provider,
            api_key,
            retry,
        })
    }
}

/// Instantiate the configured vendor adapter.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn ImageProvider>, ProviderError> {
    match config.provider.as_str() {
        StabilityProvider::NAME => Ok(Arc::new(StabilityProvider::new(
            config.api_key.clone(),
            config.retry.clone(),
        ))),
        other => Err(ProviderError::Config(format!(
            "unsupported provider: {other}"
        ))),
    }
}

/// Convenience: [`ProviderConfig::from_env`] + [`create_provider`].
pub fn provider_from_env() -> Result<Arc<dyn ImageProvider>, ProviderError> {
    create_provider(&ProviderConfig::from_env()?)
}

/// Parse an env var as `u64`, falling back to `default` when unset.
fn env_parse(name: &str, default: u64) -> Result<u64, ProviderError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ProviderError::Config(format!("{name} must be an integer, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}
