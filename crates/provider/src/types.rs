//! Request/response types shared by all vendor adapters.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default number of images per generation call.
pub const DEFAULT_NUM_IMAGES: u32 = 4;
/// Default output width in pixels.
pub const DEFAULT_WIDTH: u32 = 1024;
/// Default output height in pixels.
pub const DEFAULT_HEIGHT: u32 = 1024;
/// Default guidance scale (prompt adherence).
pub const DEFAULT_CFG_SCALE: f32 = 7.0;
/// Default diffusion step count.
pub const DEFAULT_STEPS: u32 = 30;
/// Default reference-image influence weight for image-conditioned
/// generation, in `[0, 1]`.
pub const DEFAULT_IMAGE_STRENGTH: f32 = 0.35;

/// Caller-supplied generation parameters.
///
/// Every field is optional; unset fields take the documented defaults
/// at call time via [`GenerationParams::resolve`], set fields are
/// forwarded to the vendor verbatim.  `base_prompt` / `negative_prompt`
/// carry the selected photo pack's style template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_images: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_strength: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

/// [`GenerationParams`] with every numeric field settled.
///
/// The seed is drawn randomly per call unless the caller fixed it, so a
/// fixed seed makes multi-image calls reproducible modulo provider
/// nondeterminism.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedParams {
    pub num_images: u32,
    pub width: u32,
    pub height: u32,
    pub cfg_scale: f32,
    pub steps: u32,
    pub image_strength: f32,
    pub seed: u64,
}

impl GenerationParams {
    /// Settle all numeric parameters, defaulting unset fields and
    /// drawing a random seed if none was fixed.
    pub fn resolve(&self) -> ResolvedParams {
        ResolvedParams {
            num_images: self.num_images.unwrap_or(DEFAULT_NUM_IMAGES),
            width: self.width.unwrap_or(DEFAULT_WIDTH),
            height: self.height.unwrap_or(DEFAULT_HEIGHT),
            cfg_scale: self.cfg_scale.unwrap_or(DEFAULT_CFG_SCALE),
            steps: self.steps.unwrap_or(DEFAULT_STEPS),
            image_strength: self.image_strength.unwrap_or(DEFAULT_IMAGE_STRENGTH),
            seed: self
                .seed
                .unwrap_or_else(|| rand::rng().random_range(0..1_000_000)),
        }
    }
}

/// Reported state of a vendor-side training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingState {
    Pending,
    Training,
    Ready,
    Failed,
}

/// Result of starting a training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Opaque vendor handle; everything generation needs later.
    pub provider_model_id: String,
    /// Adapters without real fine-tuning report `Ready` immediately
    /// rather than faking a pending phase.
    pub state: TrainingState,
    /// Vendor's completion estimate in seconds, if it gave one.
    pub estimated_secs: Option<u64>,
}

/// Snapshot of a training run's progress. Idempotent, side-effect-free.
#[derive(Debug, Clone)]
pub struct TrainingStatus {
    pub state: TrainingState,
    /// Percent complete, 0-100, when the vendor reports it.
    pub progress: Option<u8>,
    pub error: Option<String>,
}

/// One generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Image location: a data URL for inline payloads or an HTTP URL.
    pub url: String,
    /// Seed the vendor actually used for this image.
    pub seed: Option<i64>,
}

/// Result of a generation call. An empty image list on success never
/// occurs — exhausted retries surface the last error instead.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    pub images: Vec<GeneratedImage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_applies_defaults() {
        let p = GenerationParams::default().resolve();
        assert_eq!(p.num_images, 4);
        assert_eq!(p.width, 1024);
        assert_eq!(p.height, 1024);
        assert_eq!(p.cfg_scale, 7.0);
        assert_eq!(p.steps, 30);
        assert_eq!(p.image_strength, 0.35);
        assert!(p.seed < 1_000_000);
    }

    #[test]
    fn resolve_forwards_supplied_values_verbatim() {
        let params = GenerationParams {
            num_images: Some(2),
            width: Some(512),
            height: Some(768),
            cfg_scale: Some(12.5),
            steps: Some(50),
            image_strength: Some(0.8),
            seed: Some(1234),
            ..Default::default()
        };
        let p = params.resolve();
        assert_eq!(p.num_images, 2);
        assert_eq!(p.width, 512);
        assert_eq!(p.height, 768);
        assert_eq!(p.cfg_scale, 12.5);
        assert_eq!(p.steps, 50);
        assert_eq!(p.image_strength, 0.8);
        assert_eq!(p.seed, 1234);
    }

    #[test]
    fn fixed_seed_is_stable_across_resolves() {
        let params = GenerationParams {
            seed: Some(99),
            ..Default::default()
        };
        assert_eq!(params.resolve().seed, 99);
        assert_eq!(params.resolve().seed, 99);
    }

    #[test]
    fn params_deserialize_from_partial_json() {
        let params: GenerationParams =
            serde_json::from_str(r#"{"num_images": 1, "seed": 7}"#).unwrap();
        assert_eq!(params.num_images, Some(1));
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.steps, None);
    }
}
