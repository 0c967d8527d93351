pub mod credits;
pub mod generation;
pub mod jobs;
pub mod pets;
pub mod photo_packs;
