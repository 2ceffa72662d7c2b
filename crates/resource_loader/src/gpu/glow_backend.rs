//! OpenGL backend on top of `glow`
//!
//! `glow` resolves every function when the context is created and offers no
//! way to ask which ones came back null, so the loader is queried for the
//! extended entry points first. The 1D sub-image uploads are not wrapped by
//! `glow` and are called through pointers taken from the same loader.

#![allow(unsafe_code)]

use std::collections::HashSet;
use std::ffi::c_void;

use glow::{CompressedPixelUnpackData, HasContext, PixelUnpackData};

use super::{TextureApi, TextureId, REQUIRED_ENTRY_POINTS};

type TexSubImage1DFn = unsafe extern "system" fn(u32, i32, i32, i32, u32, u32, *const c_void);
type CompressedTexSubImage1DFn = unsafe extern "system" fn(u32, i32, i32, i32, u32, i32, *const c_void);

/// [`TextureApi`] backed by a live OpenGL context
pub struct GlowApi {
    gl: glow::Context,
    resolved: HashSet<&'static str>,
    tex_sub_image_1d: Option<TexSubImage1DFn>,
    compressed_tex_sub_image_1d: Option<CompressedTexSubImage1DFn>,
}

impl GlowApi {
    /// Build the backend from a proc-address loader
    ///
    /// # Safety
    ///
    /// The context the loader belongs to must be current on this thread for
    /// as long as the backend is used, and the loader must return either null
    /// or a valid pointer for the named GL function.
    pub unsafe fn from_loader_function<F>(mut loader: F) -> Self
    where
        F: FnMut(&str) -> *const c_void,
    {
        let resolved = REQUIRED_ENTRY_POINTS
            .iter()
            .copied()
            .filter(|name| !loader(name).is_null())
            .collect();

        let ptr = loader("glTexSubImage1D");
        let tex_sub_image_1d = if ptr.is_null() {
            None
        } else {
            Some(std::mem::transmute::<*const c_void, TexSubImage1DFn>(ptr))
        };

        let ptr = loader("glCompressedTexSubImage1D");
        let compressed_tex_sub_image_1d = if ptr.is_null() {
            None
        } else {
            Some(std::mem::transmute::<*const c_void, CompressedTexSubImage1DFn>(ptr))
        };

        let gl = glow::Context::from_loader_function(loader);
        log::info!("OpenGL context: {:?}", gl.version());

        Self {
            gl,
            resolved,
            tex_sub_image_1d,
            compressed_tex_sub_image_1d,
        }
    }

    /// The wrapped context
    pub const fn context(&self) -> &glow::Context {
        &self.gl
    }

    const fn native(texture: TextureId) -> glow::NativeTexture {
        glow::NativeTexture(texture.raw())
    }
}

impl TextureApi for GlowApi {
    fn has_entry_point(&self, name: &str) -> bool {
        self.resolved.contains(name)
    }

    fn gen_texture(&mut self, _requested: TextureId) -> Option<TextureId> {
        match unsafe { self.gl.create_texture() } {
            Ok(texture) => Some(TextureId::from(texture.0)),
            Err(e) => {
                log::warn!("glGenTextures failed: {}", e);
                None
            }
        }
    }

    fn bind_texture(&mut self, target: u32, texture: TextureId) {
        unsafe { self.gl.bind_texture(target, Some(Self::native(texture))) }
    }

    fn tex_parameter_i32(&mut self, target: u32, parameter: u32, value: i32) {
        unsafe { self.gl.tex_parameter_i32(target, parameter, value) }
    }

    fn pixel_store_i32(&mut self, parameter: u32, value: i32) {
        unsafe { self.gl.pixel_store_i32(parameter, value) }
    }

    fn tex_storage_1d(&mut self, target: u32, levels: i32, internal_format: u32, width: i32) {
        unsafe { self.gl.tex_storage_1d(target, levels, internal_format, width) }
    }

    fn tex_storage_2d(&mut self, target: u32, levels: i32, internal_format: u32, width: i32, height: i32) {
        unsafe { self.gl.tex_storage_2d(target, levels, internal_format, width, height) }
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
        unsafe {
            self.gl
                .tex_storage_3d(target, levels, internal_format, width, height, depth);
        }
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
        match self.tex_sub_image_1d {
            Some(f) => unsafe { f(target, level, x_offset, width, format, ty, pixels.as_ptr().cast()) },
            None => log::warn!("glTexSubImage1D is not available; 1D upload skipped"),
        }
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
        unsafe {
            self.gl.tex_sub_image_2d(
                target,
                level,
                x_offset,
                y_offset,
                width,
                height,
                format,
                ty,
                PixelUnpackData::Slice(Some(pixels)),
            );
        }
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
        unsafe {
            self.gl.tex_sub_image_3d(
                target,
                level,
                x_offset,
                y_offset,
                z_offset,
                width,
                height,
                depth,
                format,
                ty,
                PixelUnpackData::Slice(Some(pixels)),
            );
        }
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
        let Ok(size) = i32::try_from(pixels.len()) else {
            log::warn!("Compressed 1D level of {} bytes is too large to upload", pixels.len());
            return;
        };

        match self.compressed_tex_sub_image_1d {
            Some(f) => unsafe {
                f(target, level, x_offset, width, internal_format, size, pixels.as_ptr().cast());
            },
            None => log::warn!("glCompressedTexSubImage1D is not available; 1D upload skipped"),
        }
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
        unsafe {
            self.gl.compressed_tex_sub_image_2d(
                target,
                level,
                x_offset,
                y_offset,
                width,
                height,
                internal_format,
                CompressedPixelUnpackData::Slice(pixels),
            );
        }
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
        unsafe {
            self.gl.compressed_tex_sub_image_3d(
                target,
                level,
                x_offset,
                y_offset,
                z_offset,
                width,
                height,
                depth,
                internal_format,
                CompressedPixelUnpackData::Slice(pixels),
            );
        }
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
        unsafe {
            self.gl.tex_image_2d(
                target,
                level,
                internal_format,
                width,
                height,
                0,
                format,
                ty,
                PixelUnpackData::Slice(Some(pixels)),
            );
        }
    }

    fn generate_mipmap(&mut self, target: u32) {
        unsafe { self.gl.generate_mipmap(target) }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        unsafe { self.gl.delete_texture(Self::native(texture)) }
    }
}
