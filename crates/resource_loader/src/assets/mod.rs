//! Asset loading: plain images, archives and the material cache

pub mod archive;
pub mod image_loader;
pub mod materials;
pub mod resource_loader;

pub use archive::{normalize_path, Archive, ArchiveError, ArchiveList, MemoryArchive, ZipArchive};
pub use image_loader::{ImageData, ImageLoadFlags, ImageLoader};
pub use materials::{Material, MaterialCache, MaterialKey};
pub use resource_loader::{archive_relative_path, MaterialError, ResourceLoader};
