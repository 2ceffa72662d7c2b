//! Container upload to GPU texture objects

use std::num::NonZeroU32;
use std::path::Path;

use super::container::TextureContainer;
use super::layout::{Dimensionality, TargetLayout};
use crate::gpu::{gl, Capability, EntryPointResolver, TextureApi, TextureId};

/// File extensions routed to the container decoder
pub const CONTAINER_EXTENSIONS: [&str; 3] = ["dds", "ktx", "ktx2"];

/// Whether a path names a container file (case-insensitive extension check)
pub fn is_container_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|ext| CONTAINER_EXTENSIONS.contains(&ext.as_str()))
}

fn gl_int(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn gl_size(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Uploads texture containers and hands out texture names
///
/// Holds the texture-name counter and the entry-point capability for one
/// GL context. Independent contexts get independent uploaders.
#[derive(Debug)]
pub struct TextureUploader {
    /// `None` once every name up to `u32::MAX` has been handed out
    next_id: Option<NonZeroU32>,
    resolver: EntryPointResolver,
}

impl Default for TextureUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureUploader {
    /// Create an uploader whose first texture name is 1
    pub fn new() -> Self {
        Self {
            next_id: Some(NonZeroU32::MIN),
            resolver: EntryPointResolver::new(),
        }
    }

    /// Entry-point capability; `Unresolved` until the first container upload
    pub const fn capability(&self) -> Capability {
        self.resolver.capability()
    }

    /// Reserve the next texture name with the backend
    ///
    /// Names are never reused. Returns `None` once the counter is exhausted
    /// or when the backend cannot create a texture object.
    pub fn allocate_id<A: TextureApi + ?Sized>(&mut self, api: &mut A) -> Option<TextureId> {
        let Some(requested) = self.next_id else {
            log::warn!("Texture names exhausted; refusing to create another texture");
            return None;
        };
        let id = api.gen_texture(TextureId::from(requested))?;
        self.next_id = requested.checked_add(1);
        Some(id)
    }

    /// Decode a container file and upload it
    ///
    /// Returns `None` when the file cannot be read or decoded, or when the
    /// context lacks the required entry points.
    pub fn load_file<A: TextureApi + ?Sized>(
        &mut self,
        api: &mut A,
        path: impl AsRef<Path>,
    ) -> Option<TextureId> {
        let path = path.as_ref();
        match TextureContainer::open(path) {
            Ok(texture) if !texture.is_empty() => self.create_texture(api, texture),
            Ok(_) => None,
            Err(e) => {
                log::debug!("Container load failed for {:?}: {}", path, e);
                None
            }
        }
    }

    /// Decode an in-memory container and upload it
    pub fn load_memory<A: TextureApi + ?Sized>(&mut self, api: &mut A, bytes: &[u8]) -> Option<TextureId> {
        match TextureContainer::decode(bytes) {
            Ok(texture) if !texture.is_empty() => self.create_texture(api, texture),
            Ok(_) => None,
            Err(e) => {
                log::debug!("Container decode from memory failed ({} bytes): {}", bytes.len(), e);
                None
            }
        }
    }

    /// Create a texture object holding every image of the container
    ///
    /// Allocates immutable storage for all levels, then uploads each
    /// (layer, face, level) image in that nesting order.
    pub fn create_texture<A: TextureApi + ?Sized>(
        &mut self,
        api: &mut A,
        texture: TextureContainer,
    ) -> Option<TextureId> {
        if !self.resolver.ensure_resolved(api) {
            return None;
        }

        let format = texture.format().translate(texture.swizzles());
        let layout = TargetLayout::classify(texture.target());
        let target = layout.gl_target();
        let levels = gl_int(texture.levels());
        let compressed = texture.format().is_compressed();

        let id = self.allocate_id(api)?;
        api.bind_texture(target, id);
        api.tex_parameter_i32(target, gl::TEXTURE_BASE_LEVEL, 0);
        api.tex_parameter_i32(target, gl::TEXTURE_MAX_LEVEL, levels - 1);
        api.tex_parameter_i32(target, gl::TEXTURE_SWIZZLE_R, format.swizzles[0] as i32);
        api.tex_parameter_i32(target, gl::TEXTURE_SWIZZLE_G, format.swizzles[1] as i32);
        api.tex_parameter_i32(target, gl::TEXTURE_SWIZZLE_B, format.swizzles[2] as i32);
        api.tex_parameter_i32(target, gl::TEXTURE_SWIZZLE_A, format.swizzles[3] as i32);

        let extent = texture.extent();
        let face_total = gl_int(texture.layers() * texture.faces());

        match layout.dimensionality {
            Dimensionality::One => {
                api.tex_storage_1d(target, levels, format.internal, gl_size(extent.width));
            }
            Dimensionality::Two => {
                // A plain cube keeps the face height here. Its six faces are
                // addressed by per-face targets, not by rows of storage.
                let height = if layout.arrayed { face_total } else { gl_size(extent.height) };
                api.tex_storage_2d(target, levels, format.internal, gl_size(extent.width), height);
            }
            Dimensionality::Three => {
                let depth = if layout.arrayed { face_total } else { gl_size(extent.depth) };
                api.tex_storage_3d(
                    target,
                    levels,
                    format.internal,
                    gl_size(extent.width),
                    gl_size(extent.height),
                    depth,
                );
            }
        }

        for layer in 0..texture.layers() {
            for face in 0..texture.faces() {
                for level in 0..texture.levels() {
                    let level_extent = texture.level_extent(level);
                    let (width, height, depth) = (
                        gl_size(level_extent.width),
                        gl_size(level_extent.height),
                        gl_size(level_extent.depth),
                    );
                    let upload_target = layout.upload_target(face);
                    let layer_gl = gl_int(layout.layer_offset(layer, face, texture.faces()));
                    let pixels = texture.data(layer, face, level);
                    let level = gl_int(level);

                    match layout.dimensionality {
                        Dimensionality::One if compressed => {
                            api.compressed_tex_sub_image_1d(upload_target, level, 0, width, format.internal, pixels);
                        }
                        Dimensionality::One => {
                            api.tex_sub_image_1d(upload_target, level, 0, width, format.external, format.ty, pixels);
                        }
                        Dimensionality::Two => {
                            let (y_offset, height) = if layout.arrayed { (layer_gl, 1) } else { (0, height) };
                            if compressed {
                                api.compressed_tex_sub_image_2d(
                                    upload_target,
                                    level,
                                    0,
                                    y_offset,
                                    width,
                                    height,
                                    format.internal,
                                    pixels,
                                );
                            } else {
                                api.tex_sub_image_2d(
                                    upload_target,
                                    level,
                                    0,
                                    y_offset,
                                    width,
                                    height,
                                    format.external,
                                    format.ty,
                                    pixels,
                                );
                            }
                        }
                        Dimensionality::Three => {
                            let (z_offset, depth) = if layout.arrayed { (layer_gl, 1) } else { (0, depth) };
                            if compressed {
                                api.compressed_tex_sub_image_3d(
                                    upload_target,
                                    level,
                                    0,
                                    0,
                                    z_offset,
                                    width,
                                    height,
                                    depth,
                                    format.internal,
                                    pixels,
                                );
                            } else {
                                api.tex_sub_image_3d(
                                    upload_target,
                                    level,
                                    0,
                                    0,
                                    z_offset,
                                    width,
                                    height,
                                    depth,
                                    format.external,
                                    format.ty,
                                    pixels,
                                );
                            }
                        }
                    }
                }
            }
        }

        log::debug!(
            "Uploaded {:?} texture {} ({}x{}x{}, {} levels, {} layers, {} faces, {:?})",
            texture.target(),
            id,
            extent.width,
            extent.height,
            extent.depth,
            texture.levels(),
            texture.layers(),
            texture.faces(),
            texture.format()
        );

        Some(id)
    }
}
