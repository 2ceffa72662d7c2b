//! Headless backend that records texture calls
//!
//! Nothing is executed; each call is appended to a log that tests and
//! tooling can inspect. Pixel payloads are reduced to their byte length.

use std::collections::HashSet;

use super::{TextureApi, TextureId};

/// A texture call observed by [`RecordingApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum GlCall {
    GenTexture { texture: u32 },
    BindTexture { target: u32, texture: u32 },
    TexParameter { target: u32, parameter: u32, value: i32 },
    PixelStore { parameter: u32, value: i32 },
    TexStorage1D { target: u32, levels: i32, internal_format: u32, width: i32 },
    TexStorage2D { target: u32, levels: i32, internal_format: u32, width: i32, height: i32 },
    TexStorage3D {
        target: u32,
        levels: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        depth: i32,
    },
    TexSubImage1D { target: u32, level: i32, x_offset: i32, width: i32, format: u32, ty: u32, bytes: usize },
    TexSubImage2D {
        target: u32,
        level: i32,
        offset: [i32; 2],
        size: [i32; 2],
        format: u32,
        ty: u32,
        bytes: usize,
    },
    TexSubImage3D {
        target: u32,
        level: i32,
        offset: [i32; 3],
        size: [i32; 3],
        format: u32,
        ty: u32,
        bytes: usize,
    },
    CompressedTexSubImage1D { target: u32, level: i32, x_offset: i32, width: i32, internal_format: u32, bytes: usize },
    CompressedTexSubImage2D {
        target: u32,
        level: i32,
        offset: [i32; 2],
        size: [i32; 2],
        internal_format: u32,
        bytes: usize,
    },
    CompressedTexSubImage3D {
        target: u32,
        level: i32,
        offset: [i32; 3],
        size: [i32; 3],
        internal_format: u32,
        bytes: usize,
    },
    TexImage2D {
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        bytes: usize,
    },
    GenerateMipmap { target: u32 },
    DeleteTexture { texture: u32 },
}

impl GlCall {
    /// Whether this call allocates texture storage
    pub const fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::TexStorage1D { .. } | Self::TexStorage2D { .. } | Self::TexStorage3D { .. }
        )
    }

    /// Whether this call writes pixel data into existing storage
    pub const fn is_sub_image(&self) -> bool {
        matches!(
            self,
            Self::TexSubImage1D { .. }
                | Self::TexSubImage2D { .. }
                | Self::TexSubImage3D { .. }
                | Self::CompressedTexSubImage1D { .. }
                | Self::CompressedTexSubImage2D { .. }
                | Self::CompressedTexSubImage3D { .. }
        )
    }
}

/// Backend that records every call instead of executing it
#[derive(Debug, Default)]
pub struct RecordingApi {
    calls: Vec<GlCall>,
    missing_entry_points: HashSet<String>,
    refuse_names: bool,
}

impl RecordingApi {
    /// A backend exposing every extended entry point
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend exposing none of the extended entry points
    pub fn unsupported() -> Self {
        let mut api = Self::new();
        api.missing_entry_points = super::REQUIRED_ENTRY_POINTS
            .iter()
            .map(|name| (*name).to_string())
            .collect();
        api
    }

    /// Report `name` as unresolvable
    #[must_use]
    pub fn without_entry_point(mut self, name: &str) -> Self {
        self.missing_entry_points.insert(name.to_string());
        self
    }

    /// Fail every texture name request, as a driver out of names would
    #[must_use]
    pub fn without_texture_names(mut self) -> Self {
        self.refuse_names = true;
        self
    }

    /// Calls recorded so far
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Drain the recorded calls
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of recorded calls
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    fn record(&mut self, call: GlCall) {
        log::trace!("{:?}", call);
        self.calls.push(call);
    }
}

impl TextureApi for RecordingApi {
    fn has_entry_point(&self, name: &str) -> bool {
        !self.missing_entry_points.contains(name)
    }

    fn gen_texture(&mut self, requested: TextureId) -> Option<TextureId> {
        if self.refuse_names {
            return None;
        }
        self.record(GlCall::GenTexture { texture: requested.get() });
        Some(requested)
    }

    fn bind_texture(&mut self, target: u32, texture: TextureId) {
        self.record(GlCall::BindTexture { target, texture: texture.get() });
    }

    fn tex_parameter_i32(&mut self, target: u32, parameter: u32, value: i32) {
        self.record(GlCall::TexParameter { target, parameter, value });
    }

    fn pixel_store_i32(&mut self, parameter: u32, value: i32) {
        self.record(GlCall::PixelStore { parameter, value });
    }

    fn tex_storage_1d(&mut self, target: u32, levels: i32, internal_format: u32, width: i32) {
        self.record(GlCall::TexStorage1D { target, levels, internal_format, width });
    }

    fn tex_storage_2d(&mut self, target: u32, levels: i32, internal_format: u32, width: i32, height: i32) {
        self.record(GlCall::TexStorage2D { target, levels, internal_format, width, height });
    }

    fn tex_storage_3d(
        &mut self,
        target: u32,
        levels: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        depth: i32,
    ) {
        self.record(GlCall::TexStorage3D { target, levels, internal_format, width, height, depth });
    }

    fn tex_sub_image_1d(
        &mut self,
        target: u32,
        level: i32,
        x_offset: i32,
        width: i32,
        format: u32,
        ty: u32,
        pixels: &[u8],
    ) {
        self.record(GlCall::TexSubImage1D {
            target,
            level,
            x_offset,
            width,
            format,
            ty,
            bytes: pixels.len(),
        });
    }

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
    ) {
        self.record(GlCall::TexSubImage2D {
            target,
            level,
            offset: [x_offset, y_offset],
            size: [width, height],
            format,
            ty,
            bytes: pixels.len(),
        });
    }

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
    ) {
        self.record(GlCall::TexSubImage3D {
            target,
            level,
            offset: [x_offset, y_offset, z_offset],
            size: [width, height, depth],
            format,
            ty,
            bytes: pixels.len(),
        });
    }

    fn compressed_tex_sub_image_1d(
        &mut self,
        target: u32,
        level: i32,
        x_offset: i32,
        width: i32,
        internal_format: u32,
        pixels: &[u8],
    ) {
        self.record(GlCall::CompressedTexSubImage1D {
            target,
            level,
            x_offset,
            width,
            internal_format,
            bytes: pixels.len(),
        });
    }

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
    ) {
        self.record(GlCall::CompressedTexSubImage2D {
            target,
            level,
            offset: [x_offset, y_offset],
            size: [width, height],
            internal_format,
            bytes: pixels.len(),
        });
    }

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
    ) {
        self.record(GlCall::CompressedTexSubImage3D {
            target,
            level,
            offset: [x_offset, y_offset, z_offset],
            size: [width, height, depth],
            internal_format,
            bytes: pixels.len(),
        });
    }

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
    ) {
        self.record(GlCall::TexImage2D {
            target,
            level,
            internal_format,
            width,
            height,
            format,
            ty,
            bytes: pixels.len(),
        });
    }

    fn generate_mipmap(&mut self, target: u32) {
        self.record(GlCall::GenerateMipmap { target });
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.record(GlCall::DeleteTexture { texture: texture.get() });
    }
}
