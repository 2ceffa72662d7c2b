//! # Resource Loader
//!
//! Texture loading and material caching for the mesh editor's OpenGL viewport.
//!
//! ## Features
//!
//! - **Container Textures**: DDS and KTX2 files with mip chains, arrays and cubemaps
//! - **Plain Images**: PNG, JPEG, BMP and TGA through the `image` crate
//! - **Archive Fallback**: Textures resolved from mounted game archives
//! - **Material Cache**: One material per (texture, vertex shader, fragment shader)
//! - **Headless Backend**: Every GPU call can be recorded instead of executed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resource_loader::prelude::*;
//!
//! let mut config = ConfigStore::default();
//! config.set("BSATextureScan", "true");
//! config.set("GameDataPath", "C:/Games/Skyrim/Data/");
//!
//! let mut loader = ResourceLoader::new(RecordingApi::new(), config);
//! let material = loader.add_material(
//!     "C:/Games/Skyrim/Data/textures/actors/character/female/femalebody_1.dds",
//!     "res/shaders/default.vert",
//!     "res/shaders/default.frag",
//! );
//! assert!(material.is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod gpu;
pub mod texture;
pub mod assets;

/// Common imports for loader users
pub mod prelude {
    pub use crate::{
        assets::{
            Archive, ArchiveList, ImageLoader, Material, MaterialError, MaterialKey,
            MemoryArchive, ResourceLoader, ZipArchive,
        },
        config::{Config, ConfigError, ConfigStore},
        gpu::{Capability, GlCall, RecordingApi, TextureApi, TextureId},
        texture::{
            PixelFormat, TextureContainer, TextureTarget, TextureUploader,
        },
    };

    #[cfg(feature = "glow")]
    pub use crate::gpu::GlowApi;
}
