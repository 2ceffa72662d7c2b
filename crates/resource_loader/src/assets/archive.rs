//! Mounted game archives
//!
//! Archives expose files under virtual paths such as
//! `textures/actors/character/body.dds`. Lookups are case-insensitive and
//! treat `\` and `/` alike.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use thiserror::Error;

/// Archive mounting and extraction errors
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Failed to open or read the archive
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip reader rejected the archive
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// No entry at the requested virtual path
    #[error("File not found in archive: {0}")]
    FileNotFound(String),
}

/// Normalise a virtual path for lookup: lowercase, `/` separated, no leading `/`
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_lowercase()
}

/// A container of files addressed by virtual path
pub trait Archive {
    /// Display name, usually the archive's file name
    fn name(&self) -> &str;

    /// Whether a file exists at `path`
    fn has_file(&self, path: &str) -> bool;

    /// Extract the file at `path`
    fn file_contents(&mut self, path: &str) -> Result<Vec<u8>, ArchiveError>;
}

/// Ordered list of mounted archives
///
/// Earlier mounts take priority over later ones.
#[derive(Default)]
pub struct ArchiveList {
    archives: Vec<Box<dyn Archive>>,
}

impl ArchiveList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount an archive after all existing ones
    pub fn mount(&mut self, archive: impl Archive + 'static) {
        log::debug!("Mounted archive {}", archive.name());
        self.archives.push(Box::new(archive));
    }

    /// Mount every zip file given, skipping (and logging) those that fail to open
    pub fn mount_zips<P: AsRef<Path>>(&mut self, paths: impl IntoIterator<Item = P>) -> usize {
        let mut mounted = 0;
        for path in paths {
            let path = path.as_ref();
            match ZipArchive::open(path) {
                Ok(archive) => {
                    self.mount(archive);
                    mounted += 1;
                }
                Err(e) => log::warn!("Failed to mount archive {}: {}", path.display(), e),
            }
        }
        mounted
    }

    /// Unmount all archives
    pub fn clear(&mut self) {
        self.archives.clear();
    }

    /// Number of mounted archives
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Whether no archive is mounted
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Names of the mounted archives in priority order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.archives.iter().map(|a| a.name())
    }

    /// Extract `path` from the first archive that yields it
    ///
    /// Archives are tried in mount order. One that lists the file but
    /// fails to extract it, or holds it empty, is skipped. Returns `None`
    /// if no archive produces any bytes.
    pub fn find_file(&mut self, path: &str) -> Option<Vec<u8>> {
        for archive in self.archives.iter_mut().filter(|a| a.has_file(path)) {
            match archive.file_contents(path) {
                Ok(bytes) if !bytes.is_empty() => {
                    log::debug!("Found {} in archive {} ({} bytes)", path, archive.name(), bytes.len());
                    return Some(bytes);
                }
                Ok(_) => log::debug!("Skipping empty {} in archive {}", path, archive.name()),
                Err(e) => log::debug!("Failed to extract {} from {}: {}", path, archive.name(), e),
            }
        }
        None
    }
}

impl std::fmt::Debug for ArchiveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Archive held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    name: String,
    files: HashMap<String, Vec<u8>>,
}

impl MemoryArchive {
    /// Create an empty archive
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: HashMap::new(),
        }
    }

    /// Add or replace a file
    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.files.insert(normalize_path(path), bytes.into());
    }

    /// Builder form of [`MemoryArchive::insert`]
    #[must_use]
    pub fn with_file(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl Archive for MemoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_file(&self, path: &str) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    fn file_contents(&mut self, path: &str) -> Result<Vec<u8>, ArchiveError> {
        self.files
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| ArchiveError::FileNotFound(path.to_string()))
    }
}

/// Zip archive, opened from disk or any seekable reader
pub struct ZipArchive<R: Read + Seek = BufReader<File>> {
    name: String,
    zip: zip::ZipArchive<R>,
    entries: HashMap<String, String>,
}

impl ZipArchive {
    /// Open a zip file from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let reader = BufReader::new(File::open(path)?);
        Self::from_reader(name, reader)
    }
}

impl<R: Read + Seek> ZipArchive<R> {
    /// Read the central directory of a zip stream
    pub fn from_reader(name: impl Into<String>, reader: R) -> Result<Self, ArchiveError> {
        let zip = zip::ZipArchive::new(reader)?;
        let entries = zip
            .file_names()
            .filter(|entry| !entry.ends_with('/'))
            .map(|entry| (normalize_path(entry), entry.to_string()))
            .collect();

        Ok(Self {
            name: name.into(),
            zip,
            entries,
        })
    }

    /// Number of file entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no file entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: Read + Seek> Archive for ZipArchive<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_file(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize_path(path))
    }

    fn file_contents(&mut self, path: &str) -> Result<Vec<u8>, ArchiveError> {
        let entry = self
            .entries
            .get(&normalize_path(path))
            .ok_or_else(|| ArchiveError::FileNotFound(path.to_string()))?;

        let mut file = self.zip.by_name(entry)?;
        let mut bytes = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl<R: Read + Seek> std::fmt::Debug for ZipArchive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchive")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, bytes) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("\\Textures\\Armor\\Iron.DDS"), "textures/armor/iron.dds");
        assert_eq!(normalize_path("meshes/a.nif"), "meshes/a.nif");
    }

    #[test]
    fn test_memory_archive_lookup() {
        let mut archive = MemoryArchive::new("test.bsa").with_file("textures/a.dds", vec![1, 2, 3]);

        assert!(archive.has_file("Textures\\A.dds"));
        assert!(!archive.has_file("textures/b.dds"));
        assert_eq!(archive.file_contents("textures/a.dds").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            archive.file_contents("textures/b.dds"),
            Err(ArchiveError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_first_archive_wins() {
        let mut list = ArchiveList::new();
        list.mount(MemoryArchive::new("first").with_file("textures/a.dds", vec![1]));
        list.mount(MemoryArchive::new("second").with_file("textures/a.dds", vec![2]));
        list.mount(MemoryArchive::new("third").with_file("textures/b.dds", vec![3]));

        assert_eq!(list.find_file("textures/a.dds"), Some(vec![1]));
        assert_eq!(list.find_file("textures/b.dds"), Some(vec![3]));
        assert_eq!(list.find_file("textures/c.dds"), None);
        assert_eq!(list.names().collect::<Vec<_>>(), ["first", "second", "third"]);
    }

    #[test]
    fn test_empty_entry_falls_through_to_next_archive() {
        let mut list = ArchiveList::new();
        list.mount(MemoryArchive::new("empty").with_file("textures/a.dds", Vec::new()));
        list.mount(MemoryArchive::new("full").with_file("textures/a.dds", vec![9]));

        assert_eq!(list.find_file("textures/a.dds"), Some(vec![9]));
    }

    #[test]
    fn test_only_empty_entries_is_not_found() {
        let mut list = ArchiveList::new();
        list.mount(MemoryArchive::new("empty").with_file("textures/a.dds", Vec::new()));

        assert_eq!(list.find_file("textures/a.dds"), None);
    }

    #[test]
    fn test_zip_archive() {
        let bytes = zip_bytes(&[("Textures/Sky.dds", b"sky"), ("textures/readme.txt", b"")]);
        let mut archive = ZipArchive::from_reader("test.zip", Cursor::new(bytes)).unwrap();

        assert_eq!(archive.len(), 2);
        assert!(archive.has_file("textures/sky.dds"));
        assert_eq!(archive.file_contents("TEXTURES\\SKY.DDS").unwrap(), b"sky");
    }

    #[test]
    fn test_mount_zips_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.zip");
        std::fs::write(&good, zip_bytes(&[("a.dds", b"a")])).unwrap();
        let bad = dir.path().join("bad.zip");
        std::fs::write(&bad, b"not a zip").unwrap();

        let mut list = ArchiveList::new();
        assert_eq!(list.mount_zips([&good, &bad]), 1);
        assert_eq!(list.names().collect::<Vec<_>>(), ["good.zip"]);
    }
}
