//! Classification of texture targets for storage and upload calls

use super::container::TextureTarget;
use crate::gpu::gl;

/// Number of dimensions of the storage and sub-image calls for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimensionality {
    /// `TexStorage1D` / `TexSubImage1D`
    One,
    /// `TexStorage2D` / `TexSubImage2D`
    Two,
    /// `TexStorage3D` / `TexSubImage3D`
    Three,
}

/// How a target maps onto GL storage
///
/// Array layers and cube faces consume the last storage dimension, so a 1D
/// array is allocated as 2D and a 2D array or cube array as 3D.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLayout {
    /// Target this layout was computed for
    pub target: TextureTarget,
    /// Dimensionality of the storage and upload calls
    pub dimensionality: Dimensionality,
    /// Whether array layers occupy the last dimension
    pub arrayed: bool,
    /// Whether the target has six faces per layer
    pub cube_like: bool,
}

impl TargetLayout {
    /// Classify a target
    pub const fn classify(target: TextureTarget) -> Self {
        let (dimensionality, arrayed, cube_like) = match target {
            TextureTarget::Texture1D => (Dimensionality::One, false, false),
            TextureTarget::Texture1DArray => (Dimensionality::Two, true, false),
            TextureTarget::Texture2D => (Dimensionality::Two, false, false),
            TextureTarget::Cube => (Dimensionality::Two, false, true),
            TextureTarget::Texture2DArray => (Dimensionality::Three, true, false),
            TextureTarget::Texture3D => (Dimensionality::Three, false, false),
            TextureTarget::CubeArray => (Dimensionality::Three, true, true),
        };

        Self {
            target,
            dimensionality,
            arrayed,
            cube_like,
        }
    }

    /// GL binding point for the target
    pub const fn gl_target(self) -> u32 {
        match self.target {
            TextureTarget::Texture1D => gl::TEXTURE_1D,
            TextureTarget::Texture1DArray => gl::TEXTURE_1D_ARRAY,
            TextureTarget::Texture2D => gl::TEXTURE_2D,
            TextureTarget::Texture2DArray => gl::TEXTURE_2D_ARRAY,
            TextureTarget::Texture3D => gl::TEXTURE_3D,
            TextureTarget::Cube => gl::TEXTURE_CUBE_MAP,
            TextureTarget::CubeArray => gl::TEXTURE_CUBE_MAP_ARRAY,
        }
    }

    /// Target to pass to the sub-image call for one face
    ///
    /// Plain cubemaps upload each face through its own face target, in
    /// +X, -X, +Y, -Y, +Z, -Z order. Cube arrays address faces as layers.
    pub fn upload_target(self, face: usize) -> u32 {
        if self.cube_like && !self.arrayed {
            // face < 6 for cube containers
            gl::TEXTURE_CUBE_MAP_POSITIVE_X + u32::try_from(face).unwrap_or(0)
        } else {
            self.gl_target()
        }
    }

    /// Layer index inside the last dimension for one (layer, face) image
    pub const fn layer_offset(self, layer: usize, face: usize, faces: usize) -> usize {
        if self.cube_like {
            layer * faces + face
        } else {
            layer
        }
    }
}
