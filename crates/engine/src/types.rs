//! Payload and view types shared by the service and the executor.

use serde::{Deserialize, Serialize};

use pawtrait_db::models::asset::Asset;
use pawtrait_db::models::job::Job;
use pawtrait_provider::types::GenerationParams;

/// `jobs.parameters` payload for a training job: the snapshot of the
/// pet's uploaded photos at submission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainJobParams {
    pub image_urls: Vec<String>,
}

/// `jobs.parameters` payload for a generation job: the caller's tuning
/// knobs (with the pack's prompts merged in) plus optional explicit
/// reference images.  Without references the generation is text-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateJobParams {
    #[serde(flatten)]
    pub generation: GenerationParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_images: Option<Vec<String>>,
}

/// A job together with the assets it produced, as returned by status
/// lookups.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    pub assets: Vec<Asset>,
}
