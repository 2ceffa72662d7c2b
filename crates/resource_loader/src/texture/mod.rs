//! Texture containers and their upload to the GPU
//!
//! A [`TextureContainer`] is the decoded form of a DDS or KTX2 file: every
//! mip level of every face of every array layer, plus the metadata needed
//! to allocate matching GPU storage. [`TextureUploader`] turns a container
//! into a texture object through a [`crate::gpu::TextureApi`].

mod container;
mod dds;
mod format;
mod ktx;
mod layout;
mod uploader;

pub use container::{DecodeError, Extent3d, Swizzle, TextureContainer, TextureTarget, IDENTITY_SWIZZLES};
pub use format::{GlFormat, PixelFormat};
pub use layout::{Dimensionality, TargetLayout};
pub use uploader::{is_container_extension, TextureUploader, CONTAINER_EXTENSIONS};
