//! Stability AI adapter (SDXL text-to-image and image-to-image).
//!
//! Stability has no per-customer fine-tuning, so "training" packages
//! the pet metadata and a bounded sample of the uploaded photos into a
//! self-describing [`ModelHandle`] and truthfully reports `Ready`
//! immediately.  Generation prefers image-conditioned calls when the
//! caller supplies reference images and falls back to text-only
//! otherwise.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;

use pawtrait_core::pet::PetMeta;
use pawtrait_core::prompt::build_prompt;

use crate::error::ProviderError;
use crate::handle::ModelHandle;
use crate::provider::ImageProvider;
use crate::retry::{with_retry, RetryConfig};
use crate::types::{
    GeneratedImage, GenerationOutcome, GenerationParams, ResolvedParams, TrainingOutcome,
    TrainingState, TrainingStatus,
};

/// SDXL engine used for both generation modes.
const ENGINE_ID: &str = "stable-diffusion-xl-1024-v1-0";

/// Default API base URL; overridable for tests.
const DEFAULT_BASE_URL: &str = "https://api.stability.ai/v1";

/// How many training photos are kept inside the virtual model handle
/// as reference material.
pub const SAMPLE_IMAGE_LIMIT: usize = 3;

/// Image artifact in a Stability generation response.
#[derive(Debug, Deserialize)]
struct Artifact {
    base64: String,
    seed: i64,
}

/// Body of a successful generation response.
#[derive(Debug, Deserialize)]
struct ArtifactsResponse {
    artifacts: Vec<Artifact>,
}

/// HTTP adapter for the Stability AI REST API.
pub struct StabilityProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    retry: RetryConfig,
}

impl StabilityProvider {
    /// Vendor name recorded on models trained through this adapter.
    pub const NAME: &'static str = "stability";

    pub fn new(api_key: String, retry: RetryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry,
        }
    }

    /// Point the adapter at a different API host (stub servers in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// One text-to-image attempt. Non-2xx responses become
    /// [`ProviderError::Api`] so the retry layer treats them uniformly
    /// with transport failures.
    async fn text_to_image_once(
        &self,
        prompt: &str,
        negative_prompt: Option<&str>,
        p: &ResolvedParams,
    ) -> Result<ArtifactsResponse, ProviderError> {
        let body = text_request_body(prompt, negative_prompt, p);

        let response = self
            .client
            .post(format!(
                "{}/generation/{ENGINE_ID}/text-to-image",
                self.base_url
            ))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// One image-to-image attempt. The multipart form is rebuilt per
    /// attempt because `reqwest::multipart::Form` is not reusable.
    async fn image_to_image_once(
        &self,
        init_image: &[u8],
        prompt: &str,
        negative_prompt: Option<&str>,
        p: &ResolvedParams,
    ) -> Result<ArtifactsResponse, ProviderError> {
        let mut form = reqwest::multipart::Form::new()
            .part(
                "init_image",
                reqwest::multipart::Part::bytes(init_image.to_vec()).file_name("image.png"),
            )
            .text("init_image_mode", "IMAGE_STRENGTH")
            .text("image_strength", p.image_strength.to_string())
            .text("text_prompts[0][text]", prompt.to_string())
            .text("text_prompts[0][weight]", "1")
            .text("cfg_scale", p.cfg_scale.to_string())
            .text("samples", p.num_images.to_string())
            .text("steps", p.steps.to_string())
            .text("seed", p.seed.to_string());

        if let Some(negative) = negative_prompt.filter(|n| !n.is_empty()) {
            form = form
                .text("text_prompts[1][text]", negative.to_string())
                .text("text_prompts[1][weight]", "-1");
        }

        let response = self
            .client
            .post(format!(
                "{}/generation/{ENGINE_ID}/image-to-image",
                self.base_url
            ))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Resolve an image reference to raw bytes: inline data URLs are
    /// decoded locally, anything else is fetched over HTTP.
    async fn fetch_image_bytes(&self, image_url: &str) -> Result<Vec<u8>, ProviderError> {
        if let Some(data) = image_url.strip_prefix("data:") {
            let encoded = data
                .split_once(',')
                .map(|(_, payload)| payload)
                .ok_or_else(|| ProviderError::Image("malformed data URL".into()))?;
            return BASE64
                .decode(encoded)
                .map_err(|e| ProviderError::Image(format!("data URL decode failed: {e}")));
        }

        let response = self.client.get(image_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Image(format!(
                "reference image fetch returned {status}"
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Check status and deserialize a generation response.
    async fn parse_response(response: reqwest::Response) -> Result<ArtifactsResponse, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<ArtifactsResponse>().await?)
    }
}

/// JSON body for a text-to-image call.
fn text_request_body(
    prompt: &str,
    negative_prompt: Option<&str>,
    p: &ResolvedParams,
) -> serde_json::Value {
    let mut text_prompts = vec![serde_json::json!({ "text": prompt, "weight": 1 })];
    if let Some(negative) = negative_prompt.filter(|n| !n.is_empty()) {
        text_prompts.push(serde_json::json!({ "text": negative, "weight": -1 }));
    }

    serde_json::json!({
        "text_prompts": text_prompts,
        "cfg_scale": p.cfg_scale,
        "height": p.height,
        "width": p.width,
        "steps": p.steps,
        "samples": p.num_images,
        "seed": p.seed,
    })
}

/// Convert a response into the provider-neutral outcome, inlining each
/// artifact as a PNG data URL.
fn into_outcome(response: ArtifactsResponse) -> GenerationOutcome {
    GenerationOutcome {
        images: response
            .artifacts
            .into_iter()
            .map(|a| GeneratedImage {
                url: format!("data:image/png;base64,{}", a.base64),
                seed: Some(a.seed),
            })
            .collect(),
    }
}

#[async_trait]
impl ImageProvider for StabilityProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn start_training(
        &self,
        images: &[String],
        meta: &PetMeta,
    ) -> Result<TrainingOutcome, ProviderError> {
        if images.is_empty() {
            return Err(ProviderError::InvalidInput(
                "training requires at least one image".into(),
            ));
        }

        let handle = ModelHandle::Stability {
            meta: meta.clone(),
            sample_images: images.iter().take(SAMPLE_IMAGE_LIMIT).cloned().collect(),
            image_count: images.len() as u32,
        };

        tracing::info!(
            pet = %meta.name,
            image_count = images.len(),
            "Encoded virtual model handle (no server-side training run)",
        );

        // No vendor-side run exists, so the handle is usable right away.
        Ok(TrainingOutcome {
            provider_model_id: handle.encode(),
            state: TrainingState::Ready,
            estimated_secs: Some(0),
        })
    }

    async fn training_status(
        &self,
        provider_model_id: &str,
    ) -> Result<TrainingStatus, ProviderError> {
        match ModelHandle::decode(provider_model_id) {
            Ok(ModelHandle::Stability { .. }) => Ok(TrainingStatus {
                state: TrainingState::Ready,
                progress: Some(100),
                error: None,
            }),
            Err(e) => Ok(TrainingStatus {
                state: TrainingState::Failed,
                progress: None,
                error: Some(e.to_string()),
            }),
        }
    }

    async fn generate_images(
        &self,
        provider_model_id: &str,
        reference_images: &[String],
        params: &GenerationParams,
    ) -> Result<GenerationOutcome, ProviderError> {
        let ModelHandle::Stability { meta, .. } = ModelHandle::decode(provider_model_id)?;

        let prompt = build_prompt(&meta, params.base_prompt.as_deref());
        let negative = params.negative_prompt.as_deref();
        let resolved = params.resolve();

        let response = if let Some(reference) = reference_images.first() {
            let init_image = self.fetch_image_bytes(reference).await?;
            with_retry(&self.retry, || {
                self.image_to_image_once(&init_image, &prompt, negative, &resolved)
            })
            .await?
        } else {
            with_retry(&self.retry, || {
                self.text_to_image_once(&prompt, negative, &resolved)
            })
            .await?
        };

        if response.artifacts.is_empty() {
            return Err(ProviderError::Image(
                "generation response contained no artifacts".into(),
            ));
        }

        tracing::info!(
            images = response.artifacts.len(),
            seed = resolved.seed,
            "Stability generation succeeded",
        );

        Ok(into_outcome(response))
    }
}
