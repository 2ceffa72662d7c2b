//! Pixel formats and their OpenGL 3.3 translation

use super::container::{Extent3d, Swizzle};
use crate::gpu::gl;

/// Pixel formats the loader can decode and upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum PixelFormat {
    R8Unorm,
    Rg8Unorm,
    Rgb8Unorm,
    Bgr8Unorm,
    Rgba8Unorm,
    Rgba8Srgb,
    Bgra8Unorm,
    Bgra8Srgb,
    Rgba16Float,
    Rgba32Float,
    Bc1RgbUnorm,
    Bc1RgbaUnorm,
    Bc1RgbaSrgb,
    Bc2Unorm,
    Bc2Srgb,
    Bc3Unorm,
    Bc3Srgb,
    Bc4Unorm,
    Bc4Snorm,
    Bc5Unorm,
    Bc5Snorm,
    Bc6hUfloat,
    Bc6hSfloat,
    Bc7Unorm,
    Bc7Srgb,
}

impl PixelFormat {
    /// Whether texels are stored in 4x4 compressed blocks
    pub const fn is_compressed(self) -> bool {
        matches!(
            self,
            Self::Bc1RgbUnorm
                | Self::Bc1RgbaUnorm
                | Self::Bc1RgbaSrgb
                | Self::Bc2Unorm
                | Self::Bc2Srgb
                | Self::Bc3Unorm
                | Self::Bc3Srgb
                | Self::Bc4Unorm
                | Self::Bc4Snorm
                | Self::Bc5Unorm
                | Self::Bc5Snorm
                | Self::Bc6hUfloat
                | Self::Bc6hSfloat
                | Self::Bc7Unorm
                | Self::Bc7Srgb
        )
    }

    /// Texels covered by one block along x and y
    pub const fn block_dimensions(self) -> (u32, u32) {
        if self.is_compressed() {
            (4, 4)
        } else {
            (1, 1)
        }
    }

    /// Bytes per block (per texel for uncompressed formats)
    pub const fn block_size(self) -> usize {
        match self {
            Self::R8Unorm => 1,
            Self::Rg8Unorm => 2,
            Self::Rgb8Unorm | Self::Bgr8Unorm => 3,
            Self::Rgba8Unorm | Self::Rgba8Srgb | Self::Bgra8Unorm | Self::Bgra8Srgb => 4,
            Self::Bc1RgbUnorm
            | Self::Bc1RgbaUnorm
            | Self::Bc1RgbaSrgb
            | Self::Bc4Unorm
            | Self::Bc4Snorm
            | Self::Rgba16Float => 8,
            Self::Rgba32Float
            | Self::Bc2Unorm
            | Self::Bc2Srgb
            | Self::Bc3Unorm
            | Self::Bc3Srgb
            | Self::Bc5Unorm
            | Self::Bc5Snorm
            | Self::Bc6hUfloat
            | Self::Bc6hSfloat
            | Self::Bc7Unorm
            | Self::Bc7Srgb => 16,
        }
    }

    /// Bytes needed for one image of the given extent
    ///
    /// `None` if the size does not fit in `usize`.
    pub fn level_size(self, extent: Extent3d) -> Option<usize> {
        let (block_width, block_height) = self.block_dimensions();
        let blocks_x = usize::try_from(extent.width.div_ceil(block_width)).ok()?;
        let blocks_y = usize::try_from(extent.height.div_ceil(block_height)).ok()?;
        let depth = usize::try_from(extent.depth).ok()?;
        blocks_x
            .checked_mul(blocks_y)?
            .checked_mul(depth)?
            .checked_mul(self.block_size())
    }

    /// Translate to GL internal/external/type enumerations plus swizzle
    pub fn translate(self, swizzles: [Swizzle; 4]) -> GlFormat {
        let (internal, external, ty) = match self {
            Self::R8Unorm => (gl::R8, gl::RED, gl::UNSIGNED_BYTE),
            Self::Rg8Unorm => (gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
            Self::Rgb8Unorm => (gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
            Self::Bgr8Unorm => (gl::RGB8, gl::BGR, gl::UNSIGNED_BYTE),
            Self::Rgba8Unorm => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
            Self::Rgba8Srgb => (gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_BYTE),
            Self::Bgra8Unorm => (gl::RGBA8, gl::BGRA, gl::UNSIGNED_BYTE),
            Self::Bgra8Srgb => (gl::SRGB8_ALPHA8, gl::BGRA, gl::UNSIGNED_BYTE),
            Self::Rgba16Float => (gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT),
            Self::Rgba32Float => (gl::RGBA32F, gl::RGBA, gl::FLOAT),
            Self::Bc1RgbUnorm => (gl::COMPRESSED_RGB_S3TC_DXT1_EXT, gl::NONE, gl::NONE),
            Self::Bc1RgbaUnorm => (gl::COMPRESSED_RGBA_S3TC_DXT1_EXT, gl::NONE, gl::NONE),
            Self::Bc1RgbaSrgb => (gl::COMPRESSED_SRGB_ALPHA_S3TC_DXT1_EXT, gl::NONE, gl::NONE),
            Self::Bc2Unorm => (gl::COMPRESSED_RGBA_S3TC_DXT3_EXT, gl::NONE, gl::NONE),
            Self::Bc2Srgb => (gl::COMPRESSED_SRGB_ALPHA_S3TC_DXT3_EXT, gl::NONE, gl::NONE),
            Self::Bc3Unorm => (gl::COMPRESSED_RGBA_S3TC_DXT5_EXT, gl::NONE, gl::NONE),
            Self::Bc3Srgb => (gl::COMPRESSED_SRGB_ALPHA_S3TC_DXT5_EXT, gl::NONE, gl::NONE),
            Self::Bc4Unorm => (gl::COMPRESSED_RED_RGTC1, gl::NONE, gl::NONE),
            Self::Bc4Snorm => (gl::COMPRESSED_SIGNED_RED_RGTC1, gl::NONE, gl::NONE),
            Self::Bc5Unorm => (gl::COMPRESSED_RG_RGTC2, gl::NONE, gl::NONE),
            Self::Bc5Snorm => (gl::COMPRESSED_SIGNED_RG_RGTC2, gl::NONE, gl::NONE),
            Self::Bc6hUfloat => (gl::COMPRESSED_RGB_BPTC_UNSIGNED_FLOAT, gl::NONE, gl::NONE),
            Self::Bc6hSfloat => (gl::COMPRESSED_RGB_BPTC_SIGNED_FLOAT, gl::NONE, gl::NONE),
            Self::Bc7Unorm => (gl::COMPRESSED_RGBA_BPTC_UNORM, gl::NONE, gl::NONE),
            Self::Bc7Srgb => (gl::COMPRESSED_SRGB_ALPHA_BPTC_UNORM, gl::NONE, gl::NONE),
        };

        GlFormat {
            internal,
            external,
            ty,
            swizzles: swizzles.map(swizzle_enum),
        }
    }
}

/// GL enumerations describing how a [`PixelFormat`] is stored and uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlFormat {
    /// Sized internal format passed to storage and compressed uploads
    pub internal: u32,
    /// Client pixel format for raw uploads (`NONE` when compressed)
    pub external: u32,
    /// Client component type for raw uploads (`NONE` when compressed)
    pub ty: u32,
    /// Values for `TEXTURE_SWIZZLE_R/G/B/A`
    pub swizzles: [u32; 4],
}

const fn swizzle_enum(swizzle: Swizzle) -> u32 {
    match swizzle {
        Swizzle::Red => gl::RED,
        Swizzle::Green => gl::GREEN,
        Swizzle::Blue => gl::BLUE,
        Swizzle::Alpha => gl::ALPHA,
        Swizzle::Zero => gl::ZERO,
        Swizzle::One => gl::ONE,
    }
}
