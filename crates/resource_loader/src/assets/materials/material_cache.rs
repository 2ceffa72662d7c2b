//! Material cache for deduplicating uploaded materials
//!
//! One [`Material`] per [`MaterialKey`]. Entries are only ever added by a
//! successful load and only removed by [`MaterialCache::clear`].

use std::collections::HashMap;
use std::sync::Arc;

use super::material::{Material, MaterialKey};
use crate::gpu::TextureApi;

/// Cache storage: key -> shared material
#[derive(Debug, Default)]
pub struct MaterialCache {
    cache: HashMap<MaterialKey, Arc<Material>>,
}

impl MaterialCache {
    /// Create a new empty material cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached material without loading
    pub fn get_cached(&self, key: &MaterialKey) -> Option<Arc<Material>> {
        self.cache.get(key).map(Arc::clone)
    }

    /// Check if a material is cached
    pub fn is_cached(&self, key: &MaterialKey) -> bool {
        self.cache.contains_key(key)
    }

    /// Store a material and return the shared handle
    ///
    /// An existing entry under the same key is kept and returned instead.
    pub fn insert(&mut self, key: MaterialKey, material: Material) -> Arc<Material> {
        Arc::clone(self.cache.entry(key).or_insert_with(|| Arc::new(material)))
    }

    /// Release every material's texture and clear the cache
    pub fn release_all<A: TextureApi + ?Sized>(&mut self, api: &mut A) {
        for (_, material) in self.cache.drain() {
            material.release(api);
        }
    }

    /// Clear all cached materials without touching their textures
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Get the number of cached materials
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Iterate over cached materials in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&MaterialKey, &Arc<Material>)> {
        self.cache.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{GlCall, RecordingApi, TextureId};

    fn material(id: u32) -> Material {
        Material::new(TextureId::new(id).unwrap(), "a.vert", "a.frag")
    }

    #[test]
    fn test_cache_basic() {
        let mut cache = MaterialCache::new();
        assert!(cache.is_empty());

        let key = MaterialKey::new("tex.dds", "a.vert", "a.frag");
        let mat1 = cache.insert(key.clone(), material(1));
        assert_eq!(cache.len(), 1);

        let mat2 = cache.get_cached(&key).unwrap();
        assert!(Arc::ptr_eq(&mat1, &mat2));
    }

    #[test]
    fn test_insert_keeps_existing_entry() {
        let mut cache = MaterialCache::new();
        let key = MaterialKey::new("tex.dds", "a.vert", "a.frag");

        let first = cache.insert(key.clone(), material(1));
        let second = cache.insert(key, material(2));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.texture().get(), 1);
    }

    #[test]
    fn test_different_shaders_same_texture() {
        let mut cache = MaterialCache::new();

        let mat1 = cache.insert(MaterialKey::new("tex.dds", "a.vert", "a.frag"), material(1));
        let mat2 = cache.insert(MaterialKey::new("tex.dds", "a.vert", "b.frag"), material(2));

        assert_eq!(cache.len(), 2);
        assert!(!Arc::ptr_eq(&mat1, &mat2));
    }

    #[test]
    fn test_release_all() {
        let mut cache = MaterialCache::new();
        let mut api = RecordingApi::new();
        cache.insert(MaterialKey::new("a.dds", "v", "f"), material(1));
        cache.insert(MaterialKey::new("b.dds", "v", "f"), material(2));

        cache.release_all(&mut api);

        assert!(cache.is_empty());
        let mut deleted: Vec<_> = api
            .calls()
            .iter()
            .filter_map(|c| match c {
                GlCall::DeleteTexture { texture } => Some(*texture),
                _ => None,
            })
            .collect();
        deleted.sort_unstable();
        assert_eq!(deleted, [1, 2]);
    }

    #[test]
    fn test_clear() {
        let mut cache = MaterialCache::new();
        let key = MaterialKey::new("tex.dds", "a.vert", "a.frag");
        cache.insert(key.clone(), material(1));

        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(!cache.is_cached(&key));
    }
}
