//! Material and its cache key

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::gpu::{TextureApi, TextureId};

/// Cache key: the texture and shader paths a material was requested with
///
/// Paths are compared as given, with no normalisation. The hash XORs the
/// three per-path hashes, so permuted triples of equal-hash strings
/// collide; equality still tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialKey {
    /// Texture file path
    pub texture: String,
    /// Vertex shader path
    pub vertex_shader: String,
    /// Fragment shader path
    pub fragment_shader: String,
}

impl MaterialKey {
    /// Build a key from the three request paths
    pub fn new(texture: impl Into<String>, vertex_shader: impl Into<String>, fragment_shader: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            vertex_shader: vertex_shader.into(),
            fragment_shader: fragment_shader.into(),
        }
    }

    fn string_hash(value: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    /// Combined hash of the three paths
    pub fn combined_hash(&self) -> u64 {
        Self::string_hash(&self.texture)
            ^ Self::string_hash(&self.vertex_shader)
            ^ Self::string_hash(&self.fragment_shader)
    }
}

impl Hash for MaterialKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.combined_hash());
    }
}

/// A texture paired with the shader program that draws it
///
/// The texture name is only a plain identifier; the GPU object lives until
/// [`Material::release`] is called with the owning context.
#[derive(Debug, PartialEq, Eq)]
pub struct Material {
    texture: TextureId,
    vertex_shader: String,
    fragment_shader: String,
}

impl Material {
    /// Create a material for an uploaded texture
    pub fn new(texture: TextureId, vertex_shader: impl Into<String>, fragment_shader: impl Into<String>) -> Self {
        Self {
            texture,
            vertex_shader: vertex_shader.into(),
            fragment_shader: fragment_shader.into(),
        }
    }

    /// GPU texture name
    pub const fn texture(&self) -> TextureId {
        self.texture
    }

    /// Vertex shader path
    pub fn vertex_shader(&self) -> &str {
        &self.vertex_shader
    }

    /// Fragment shader path
    pub fn fragment_shader(&self) -> &str {
        &self.fragment_shader
    }

    /// Delete the texture object
    pub fn release<A: TextureApi + ?Sized>(&self, api: &mut A) {
        log::trace!("Releasing texture {}", self.texture);
        api.delete_texture(self.texture);
    }
}
