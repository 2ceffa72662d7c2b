//! Materials and their cache

pub mod material;
pub mod material_cache;

pub use material::{Material, MaterialKey};
pub use material_cache::MaterialCache;
