//! Pet metadata passed to the image provider.

use serde::{Deserialize, Serialize};

/// Pet species as stored on the `pets` row and encoded into provider
/// model handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetSpecies {
    Cat,
    Dog,
    Other,
}

impl PetSpecies {
    /// English noun used when assembling generation prompts.
    pub fn noun(self) -> &'static str {
        match self {
            PetSpecies::Cat => "cat",
            PetSpecies::Dog => "dog",
            PetSpecies::Other => "pet",
        }
    }

    /// Parse the lowercase database representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cat" => Some(PetSpecies::Cat),
            "dog" => Some(PetSpecies::Dog),
            "other" => Some(PetSpecies::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PetSpecies::Cat => "cat",
            PetSpecies::Dog => "dog",
            PetSpecies::Other => "other",
        }
    }
}

/// Descriptive metadata about one pet.
///
/// Captured at training time and carried inside the provider model
/// handle so generation calls can rebuild the prompt without another
/// database round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetMeta {
    pub name: String,
    pub species: PetSpecies,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coat_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_roundtrip() {
        for s in [PetSpecies::Cat, PetSpecies::Dog, PetSpecies::Other] {
            assert_eq!(PetSpecies::parse(s.as_str()), Some(s));
        }
        assert_eq!(PetSpecies::parse("hamster"), None);
    }

    #[test]
    fn meta_serializes_without_empty_fields() {
        let meta = PetMeta {
            name: "Mochi".into(),
            species: PetSpecies::Cat,
            breed: None,
            coat_color: None,
            gender: None,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["species"], "cat");
        assert!(json.get("breed").is_none());
    }
}
