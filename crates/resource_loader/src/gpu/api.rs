//! Texture API trait implemented by GPU backends

use std::fmt;
use std::num::NonZeroU32;

/// Identifier of a GPU-resident texture object
///
/// Zero is never a valid texture name, so "no texture" is expressed as
/// `Option<TextureId>` rather than a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(NonZeroU32);

impl TextureId {
    /// Wrap a raw texture name, returning `None` for the zero sentinel
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// The raw GL texture name
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// The raw name as a non-zero integer
    pub const fn raw(self) -> NonZeroU32 {
        self.0
    }
}

impl From<NonZeroU32> for TextureId {
    fn from(raw: NonZeroU32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Texture object calls needed by the loader
///
/// Method names and argument order follow the GL entry points they stand
/// for. Enumerations are raw GL values (see [`crate::gpu::gl`]); sizes and
/// offsets are `GLint`/`GLsizei`-style `i32`.
pub trait TextureApi {
    /// Whether an extended entry point (e.g. `"glTexStorage2D"`) resolved
    fn has_entry_point(&self, name: &str) -> bool;

    /// `glGenTextures` for a single name
    ///
    /// `requested` is the uploader's next counter value. Backends whose
    /// driver chooses names return the driver's name instead. `None` means
    /// the driver created no texture object.
    fn gen_texture(&mut self, requested: TextureId) -> Option<TextureId>;

    /// `glBindTexture`
    fn bind_texture(&mut self, target: u32, texture: TextureId);

    /// `glTexParameteri`
    fn tex_parameter_i32(&mut self, target: u32, parameter: u32, value: i32);

    /// `glPixelStorei`
    fn pixel_store_i32(&mut self, parameter: u32, value: i32);

    /// `glTexStorage1D`
    fn tex_storage_1d(&mut self, target: u32, levels: i32, internal_format: u32, width: i32);

    /// `glTexStorage2D`
    fn tex_storage_2d(
        &mut self,
        target: u32,
        levels: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    );

    /// `glTexStorage3D`
    fn tex_storage_3d(
        &mut self,
        target: u32,
        levels: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        depth: i32,
    );

    /// `glTexSubImage1D`
    fn tex_sub_image_1d(
        &mut self,
        target: u32,
        level: i32,
        x_offset: i32,
        width: i32,
        format: u32,
        ty: u32,
        pixels: &[u8],
    );

    /// `glTexSubImage2D`
    fn tex_sub_image_2d(
        &mut self,
        target: u32,
        level: i32,
        x_offset: i32,
        y_offset: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: &[u8],
    );

    /// `glTexSubImage3D`
    fn tex_sub_image_3d(
        &mut self,
        target: u32,
        level: i32,
        x_offset: i32,
        y_offset: i32,
        z_offset: i32,
        width: i32,
        height: i32,
        depth: i32,
        format: u32,
        ty: u32,
        pixels: &[u8],
    );

    /// `glCompressedTexSubImage1D`
    fn compressed_tex_sub_image_1d(
        &mut self,
        target: u32,
        level: i32,
        x_offset: i32,
        width: i32,
        internal_format: u32,
        pixels: &[u8],
    );

    /// `glCompressedTexSubImage2D`
    fn compressed_tex_sub_image_2d(
        &mut self,
        target: u32,
        level: i32,
        x_offset: i32,
        y_offset: i32,
        width: i32,
        height: i32,
        internal_format: u32,
        pixels: &[u8],
    );

    /// `glCompressedTexSubImage3D`
    fn compressed_tex_sub_image_3d(
        &mut self,
        target: u32,
        level: i32,
        x_offset: i32,
        y_offset: i32,
        z_offset: i32,
        width: i32,
        height: i32,
        depth: i32,
        internal_format: u32,
        pixels: &[u8],
    );

    /// `glTexImage2D`, used by the plain image loader
    fn tex_image_2d(
        &mut self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: &[u8],
    );

    /// `glGenerateMipmap`
    fn generate_mipmap(&mut self, target: u32);

    /// `glDeleteTextures` for a single name
    fn delete_texture(&mut self, texture: TextureId);
}
