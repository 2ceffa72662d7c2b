//! Plain image loading for texture data
//!
//! PNG, JPEG, BMP and TGA files are decoded through the `image` crate to
//! RGBA8. Unlike container textures, these are uploaded right here with a
//! single `glTexImage2D` plus generated mipmaps.

use std::path::Path;

use bitflags::bitflags;

use crate::gpu::{gl, TextureApi, TextureId};
use crate::texture::{DecodeError, TextureUploader};

/// Decoded RGBA8 image ready for GPU upload
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
        let path_ref = path.as_ref();

        log::trace!("Loading image from: {:?}", path_ref);

        let img = image::open(path_ref)
            .map_err(|e| DecodeError::UnsupportedFormat(format!("Failed to load image: {e}")))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::debug!("Loaded image {}x{} from {:?}", width, height, path_ref);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }

    /// Load an image from memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| DecodeError::UnsupportedFormat(format!("Failed to load image from bytes: {e}")))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::debug!("Loaded image {}x{} from memory", width, height);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }

    /// Create a solid color image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            data: color.repeat(pixel_count),
            width,
            height,
        }
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

bitflags! {
    /// Sampling setup applied by [`ImageLoader`] after upload
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageLoadFlags: u32 {
        /// Repeat wrapping on S and T (clamp to edge otherwise)
        const REPEATS = 1 << 0;
        /// Generate a mip chain and sample it trilinearly
        const MIPMAPS = 1 << 1;
    }
}

impl Default for ImageLoadFlags {
    fn default() -> Self {
        Self::REPEATS | Self::MIPMAPS
    }
}

/// Loads plain images straight into 2D textures
///
/// Texture names come from the uploader's counter so they never collide
/// with container uploads. The entry-point capability is not consulted;
/// only core GL calls are issued.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLoader {
    flags: ImageLoadFlags,
}

impl ImageLoader {
    /// Create a loader with the given sampling flags
    pub const fn new(flags: ImageLoadFlags) -> Self {
        Self { flags }
    }

    /// Sampling flags in use
    pub const fn flags(&self) -> ImageLoadFlags {
        self.flags
    }

    /// Decode an image file and upload it
    pub fn load_file<A: TextureApi + ?Sized>(
        &self,
        uploader: &mut TextureUploader,
        api: &mut A,
        path: impl AsRef<Path>,
    ) -> Option<TextureId> {
        let path = path.as_ref();
        match ImageData::from_file(path) {
            Ok(image) => self.upload(uploader, api, &image),
            Err(e) => {
                log::debug!("Image load failed for {:?}: {}", path, e);
                None
            }
        }
    }

    /// Decode an in-memory image and upload it
    pub fn load_memory<A: TextureApi + ?Sized>(
        &self,
        uploader: &mut TextureUploader,
        api: &mut A,
        bytes: &[u8],
    ) -> Option<TextureId> {
        match ImageData::from_bytes(bytes) {
            Ok(image) => self.upload(uploader, api, &image),
            Err(e) => {
                log::debug!("Image decode from memory failed ({} bytes): {}", bytes.len(), e);
                None
            }
        }
    }

    /// Upload decoded pixels into a new 2D texture
    pub fn upload<A: TextureApi + ?Sized>(
        &self,
        uploader: &mut TextureUploader,
        api: &mut A,
        image: &ImageData,
    ) -> Option<TextureId> {
        let (Ok(width), Ok(height)) = (i32::try_from(image.width), i32::try_from(image.height)) else {
            log::warn!("Image too large to upload: {}x{}", image.width, image.height);
            return None;
        };
        if width == 0 || height == 0 {
            return None;
        }

        let id = uploader.allocate_id(api)?;
        let target = gl::TEXTURE_2D;
        let wrap = if self.flags.contains(ImageLoadFlags::REPEATS) { gl::REPEAT } else { gl::CLAMP_TO_EDGE };
        let min_filter = if self.flags.contains(ImageLoadFlags::MIPMAPS) { gl::LINEAR_MIPMAP_LINEAR } else { gl::LINEAR };

        api.bind_texture(target, id);
        api.pixel_store_i32(gl::UNPACK_ALIGNMENT, 1);
        api.tex_parameter_i32(target, gl::TEXTURE_WRAP_S, wrap as i32);
        api.tex_parameter_i32(target, gl::TEXTURE_WRAP_T, wrap as i32);
        api.tex_parameter_i32(target, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
        api.tex_parameter_i32(target, gl::TEXTURE_MIN_FILTER, min_filter as i32);
        api.tex_image_2d(
            target,
            0,
            gl::RGBA8 as i32,
            width,
            height,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            &image.data,
        );
        if self.flags.contains(ImageLoadFlags::MIPMAPS) {
            api.generate_mipmap(target);
        }

        Some(id)
    }
}
