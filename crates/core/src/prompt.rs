//! Generation prompt assembly.
//!
//! A prompt is built from the pet's metadata, a fixed quality suffix,
//! and the selected photo pack's base prompt.  The pack's negative
//! prompt is forwarded separately and never merged in here.

use crate::pet::PetMeta;

/// Quality hint appended to every prompt before the pack's base prompt.
const QUALITY_SUFFIX: &str = "high quality, detailed, professional photography";

/// Assemble the positive prompt for a generation call.
///
/// Order: subject description, breed, coat color, quality suffix, then
/// the pack-level base prompt (if any).  Parts are comma-joined.
pub fn build_prompt(meta: &PetMeta, base_prompt: Option<&str>) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(5);

    parts.push(format!(
        "A beautiful {} named {}",
        meta.species.noun(),
        meta.name
    ));

    if let Some(breed) = meta.breed.as_deref().filter(|b| !b.is_empty()) {
        parts.push(breed.to_string());
    }
    if let Some(color) = meta.coat_color.as_deref().filter(|c| !c.is_empty()) {
        parts.push(format!("{color} colored"));
    }

    parts.push(QUALITY_SUFFIX.to_string());

    if let Some(base) = base_prompt.filter(|b| !b.is_empty()) {
        parts.push(base.to_string());
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::PetSpecies;

    fn meta() -> PetMeta {
        PetMeta {
            name: "Rex".into(),
            species: PetSpecies::Dog,
            breed: Some("Labrador".into()),
            coat_color: Some("golden".into()),
            gender: None,
        }
    }

    #[test]
    fn full_prompt_order() {
        let prompt = build_prompt(&meta(), Some("wearing an astronaut suit"));
        assert_eq!(
            prompt,
            "A beautiful dog named Rex, Labrador, golden colored, \
             high quality, detailed, professional photography, \
             wearing an astronaut suit"
        );
    }

    #[test]
    fn optional_fields_are_skipped() {
        let meta = PetMeta {
            name: "Mochi".into(),
            species: PetSpecies::Cat,
            breed: None,
            coat_color: None,
            gender: None,
        };
        let prompt = build_prompt(&meta, None);
        assert_eq!(
            prompt,
            "A beautiful cat named Mochi, high quality, detailed, professional photography"
        );
    }

    #[test]
    fn empty_base_prompt_is_ignored() {
        let prompt = build_prompt(&meta(), Some(""));
        assert!(!prompt.ends_with(", "));
    }
}
