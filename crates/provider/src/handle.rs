//! Opaque trained-model handles.
//!
//! Vendors without real fine-tuning approximate "training" by packing
//! the pet metadata and a bounded sample of the uploaded photos into a
//! self-describing token.  The tagged enum keeps one variant per vendor
//! representation, so a future vendor with genuine server-side training
//! can carry a plain run id instead of faking handle encoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use pawtrait_core::pet::PetMeta;

use crate::error::ProviderError;

/// Handle prefix for the Stability virtual-model representation.
const STABILITY_PREFIX: &str = "stability:";

/// Decoded trained-model representation, one variant per vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "vendor", rename_all = "lowercase")]
pub enum ModelHandle {
    /// Stability has no fine-tuning; the handle itself carries the state
    /// generation needs.
    Stability {
        meta: PetMeta,
        /// Up to [`crate::stability::SAMPLE_IMAGE_LIMIT`] reference URLs
        /// kept from the training set.
        sample_images: Vec<String>,
        /// Total number of images the user trained with.
        image_count: u32,
    },
}

impl ModelHandle {
    /// Encode to the wire form stored in `pet_models.provider_model_id`:
    /// a vendor prefix plus base64 JSON.
    pub fn encode(&self) -> String {
        // Serialization of this enum cannot fail: all fields are plain
        // strings and integers.
        let json = serde_json::to_vec(self).unwrap_or_default();
        match self {
            ModelHandle::Stability { .. } => {
                format!("{STABILITY_PREFIX}{}", BASE64.encode(json))
            }
        }
    }

    /// Decode a wire-form handle.
    pub fn decode(raw: &str) -> Result<Self, ProviderError> {
        let encoded = raw
            .strip_prefix(STABILITY_PREFIX)
            .ok_or_else(|| ProviderError::InvalidHandle(format!("unknown handle prefix: {raw:.16}")))?;

        let json = BASE64
            .decode(encoded)
            .map_err(|e| ProviderError::InvalidHandle(format!("base64 decode failed: {e}")))?;

        serde_json::from_slice(&json)
            .map_err(|e| ProviderError::InvalidHandle(format!("handle payload malformed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pawtrait_core::pet::PetSpecies;

    use super::*;

    fn handle() -> ModelHandle {
        ModelHandle::Stability {
            meta: PetMeta {
                name: "Rex".into(),
                species: PetSpecies::Dog,
                breed: Some("Labrador".into()),
                coat_color: Some("golden".into()),
                gender: None,
            },
            sample_images: vec!["https://cdn.example/a.png".into()],
            image_count: 5,
        }
    }

    #[test]
    fn encode_decode_roundtrip() {
        let h = handle();
        let encoded = h.encode();
        assert!(encoded.starts_with("stability:"));
        assert_eq!(ModelHandle::decode(&encoded).unwrap(), h);
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        let err = ModelHandle::decode("replicate:abc").unwrap_err();
        assert_matches!(err, ProviderError::InvalidHandle(_));
    }

    #[test]
    fn garbage_payload_is_rejected() {
        let err = ModelHandle::decode("stability:%%%not-base64%%%").unwrap_err();
        assert_matches!(err, ProviderError::InvalidHandle(_));

        let not_json = format!("stability:{}", BASE64.encode(b"hello"));
        let err = ModelHandle::decode(&not_json).unwrap_err();
        assert_matches!(err, ProviderError::InvalidHandle(_));
    }
}
