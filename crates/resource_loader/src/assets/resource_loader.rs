//! Material resolution and caching
//!
//! [`ResourceLoader::add_material`] turns a texture path and a shader pair
//! into a shared [`Material`]. Texture bytes are looked for in this order,
//! stopping at the first upload that succeeds:
//!
//! 1. the container decoder, if the extension is `dds`, `ktx` or `ktx2`
//! 2. the plain image loader on the same file
//! 3. with `BSATextureScan = "true"`, the mounted archives, using the path
//!    relative to `GameDataPath`, retrying 1 and 2 on the extracted bytes
//!
//! Failures are logged and returned, never cached.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::archive::ArchiveList;
use super::image_loader::ImageLoader;
use super::materials::{Material, MaterialCache, MaterialKey};
use crate::config::ConfigStore;
use crate::gpu::{TextureApi, TextureId};
use crate::texture::{is_container_extension, TextureUploader};

/// Material loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterialError {
    /// No loader or archive produced a texture
    #[error("Texture file '{0}' not found.")]
    TextureNotFound(String),

    /// Archive fallback is enabled but `GameDataPath` is not configured
    #[error("Texture file '{0}' not found (GameDataPath is not set).")]
    MissingGameDataPath(String),
}

/// Strip the game data directory from `path` and turn it into an archive path
pub fn archive_relative_path(path: &str, game_data_path: &str) -> String {
    let relative = if game_data_path.is_empty() { path.to_string() } else { path.replace(game_data_path, "") };
    relative.replace('\\', "/").trim_start_matches('/').to_string()
}

/// Texture and material loader bound to one GPU context
pub struct ResourceLoader<A: TextureApi> {
    api: A,
    config: ConfigStore,
    archives: ArchiveList,
    uploader: TextureUploader,
    image_loader: ImageLoader,
    materials: MaterialCache,
}

impl<A: TextureApi> ResourceLoader<A> {
    /// Create a loader with no mounted archives
    pub fn new(api: A, config: ConfigStore) -> Self {
        Self::with_archives(api, config, ArchiveList::new())
    }

    /// Create a loader over an existing archive list
    pub fn with_archives(api: A, config: ConfigStore, archives: ArchiveList) -> Self {
        Self {
            api,
            config,
            archives,
            uploader: TextureUploader::new(),
            image_loader: ImageLoader::default(),
            materials: MaterialCache::new(),
        }
    }

    /// Get or create the material for a texture and shader pair
    ///
    /// Repeated calls with identical paths return the same [`Arc`] without
    /// touching the filesystem or the GPU.
    pub fn add_material(
        &mut self,
        texture_file: &str,
        vertex_shader: &str,
        fragment_shader: &str,
    ) -> Result<Arc<Material>, MaterialError> {
        let key = MaterialKey::new(texture_file, vertex_shader, fragment_shader);
        if let Some(material) = self.materials.get_cached(&key) {
            return Ok(material);
        }

        let texture = self.resolve_texture(texture_file).inspect_err(|e| log::warn!("{e}"))?;

        log::debug!("Created material for {} with texture {}", texture_file, texture);
        Ok(self.materials.insert(key, Material::new(texture, vertex_shader, fragment_shader)))
    }

    fn resolve_texture(&mut self, texture_file: &str) -> Result<TextureId, MaterialError> {
        let is_container = is_container_extension(texture_file);

        if let Some(id) = self.load_from_file(texture_file, is_container) {
            return Ok(id);
        }

        if !self.config.bsa_texture_scan() {
            return Err(MaterialError::TextureNotFound(texture_file.to_string()));
        }

        let Some(game_data_path) = self.config.game_data_path() else {
            return Err(MaterialError::MissingGameDataPath(texture_file.to_string()));
        };

        let archive_path = archive_relative_path(texture_file, game_data_path);
        log::trace!("Searching archives for {}", archive_path);

        let bytes = self
            .archives
            .find_file(&archive_path)
            .ok_or_else(|| MaterialError::TextureNotFound(texture_file.to_string()))?;

        self.load_from_memory(&bytes, is_container)
            .ok_or_else(|| MaterialError::TextureNotFound(texture_file.to_string()))
    }

    fn load_from_file(&mut self, path: &str, is_container: bool) -> Option<TextureId> {
        let path = Path::new(path);
        if is_container {
            if let Some(id) = self.uploader.load_file(&mut self.api, path) {
                return Some(id);
            }
        }
        self.image_loader.load_file(&mut self.uploader, &mut self.api, path)
    }

    fn load_from_memory(&mut self, bytes: &[u8], is_container: bool) -> Option<TextureId> {
        if is_container {
            if let Some(id) = self.uploader.load_memory(&mut self.api, bytes) {
                return Some(id);
            }
        }
        self.image_loader.load_memory(&mut self.uploader, &mut self.api, bytes)
    }

    /// Cached material for the given paths, without loading
    pub fn get_cached(&self, texture_file: &str, vertex_shader: &str, fragment_shader: &str) -> Option<Arc<Material>> {
        self.materials.get_cached(&MaterialKey::new(texture_file, vertex_shader, fragment_shader))
    }

    /// Whether a material for the given paths is cached
    pub fn is_cached(&self, texture_file: &str, vertex_shader: &str, fragment_shader: &str) -> bool {
        self.materials.is_cached(&MaterialKey::new(texture_file, vertex_shader, fragment_shader))
    }

    /// Number of cached materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether no material is cached
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Release every material's texture and empty the cache
    pub fn cleanup(&mut self) {
        let count = self.materials.len();
        self.materials.release_all(&mut self.api);
        log::debug!("Released {} material(s)", count);
    }

    /// GPU backend
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Mutable GPU backend
    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    /// Configuration store
    pub const fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Mutable configuration store
    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    /// Mounted archives
    pub const fn archives(&self) -> &ArchiveList {
        &self.archives
    }

    /// Mutable mounted archives
    pub fn archives_mut(&mut self) -> &mut ArchiveList {
        &mut self.archives
    }

    /// Texture uploader for this context
    pub const fn uploader(&self) -> &TextureUploader {
        &self.uploader
    }

    /// Material cache
    pub const fn materials(&self) -> &MaterialCache {
        &self.materials
    }
}

impl<A: TextureApi + std::fmt::Debug> std::fmt::Debug for ResourceLoader<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("api", &self.api)
            .field("config", &self.config)
            .field("archives", &self.archives)
            .field("uploader", &self.uploader)
            .field("materials", &self.materials.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryArchive;
    use crate::config::{BSA_TEXTURE_SCAN, GAME_DATA_PATH};
    use crate::gpu::RecordingApi;

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_archive_relative_path() {
        assert_eq!(
            archive_relative_path("C:\\Games\\Data\\textures\\a.dds", "C:\\Games\\Data\\"),
            "textures/a.dds"
        );
        assert_eq!(archive_relative_path("/data/textures/a.dds", "/data"), "textures/a.dds");
        assert_eq!(archive_relative_path("textures\\a.dds", ""), "textures/a.dds");
    }

    #[test]
    fn test_missing_file_without_scan() {
        let mut loader = ResourceLoader::new(RecordingApi::new(), ConfigStore::new());

        let result = loader.add_material("no/such/file.png", "v", "f");
        assert_eq!(result.unwrap_err(), MaterialError::TextureNotFound("no/such/file.png".to_string()));
        assert!(loader.is_empty());
    }

    #[test]
    fn test_scan_requires_game_data_path() {
        let mut config = ConfigStore::new();
        config.set(BSA_TEXTURE_SCAN, "true");
        let mut loader = ResourceLoader::new(RecordingApi::new(), config);

        let result = loader.add_material("textures/a.png", "v", "f");
        assert!(matches!(result, Err(MaterialError::MissingGameDataPath(_))));
    }

    #[test]
    fn test_plain_image_from_archive() {
        let mut config = ConfigStore::new();
        config.set(BSA_TEXTURE_SCAN, "true");
        config.set(GAME_DATA_PATH, "/missing/data/");
        let mut loader = ResourceLoader::new(RecordingApi::new(), config);
        loader
            .archives_mut()
            .mount(MemoryArchive::new("textures.bsa").with_file("textures/grass.png", png_bytes()));

        let material = loader.add_material("/missing/data/textures/grass.png", "v", "f").unwrap();
        assert_eq!(material.texture().get(), 1);
        assert_eq!(material.vertex_shader(), "v");
        assert!(loader.is_cached("/missing/data/textures/grass.png", "v", "f"));
    }

    #[test]
    fn test_cleanup_releases_textures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, png_bytes()).unwrap();
        let path = path.to_string_lossy().into_owned();

        let mut loader = ResourceLoader::new(RecordingApi::new(), ConfigStore::new());
        let material = loader.add_material(&path, "v", "f").unwrap();
        loader.api_mut().take_calls();

        loader.cleanup();

        assert!(loader.is_empty());
        assert_eq!(
            loader.api().calls(),
            &[crate::gpu::GlCall::DeleteTexture { texture: material.texture().get() }]
        );
    }
}
