//! Warnings logged by material resolution
//!
//! Installs its own logger, so it lives in a separate test binary from the
//! env_logger based tests.

use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};
use resource_loader::config::{BSA_TEXTURE_SCAN, GAME_DATA_PATH};
use resource_loader::prelude::*;

struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};
static INSTALL: Once = Once::new();

fn install_logger() {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Warnings containing `needle`; tests run in parallel, so each filters on its own text
fn warnings_containing(needle: &str) -> Vec<String> {
    LOGGER
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, message)| *level == Level::Warn && message.contains(needle))
        .map(|(_, message)| message.clone())
        .collect()
}

fn dxt1_dds() -> Vec<u8> {
    let mut out = Vec::new();
    let mut put = |v: u32| out.extend_from_slice(&v.to_le_bytes());

    put(u32::from_le_bytes(*b"DDS "));
    put(124);
    put(0x1 | 0x2 | 0x4 | 0x1000);
    put(4);
    put(4);
    put(8);
    put(0);
    put(1);
    for _ in 0..11 {
        put(0);
    }
    put(32);
    put(0x4);
    put(u32::from_le_bytes(*b"DXT1"));
    for _ in 0..5 {
        put(0);
    }
    put(0x1000);
    for _ in 0..4 {
        put(0);
    }

    out.extend_from_slice(&[0x55; 8]);
    out
}

#[test]
fn test_missing_texture_is_logged_as_not_found() {
    install_logger();
    let mut config = ConfigStore::new();
    config.set(BSA_TEXTURE_SCAN, "false");
    let mut loader = ResourceLoader::new(RecordingApi::new(), config);

    let result = loader.add_material("meshes/clutter/not_there.dds", "a.vert", "a.frag");

    assert!(result.is_err());
    assert_eq!(
        warnings_containing("not_there.dds"),
        ["Texture file 'meshes/clutter/not_there.dds' not found."]
    );
}

#[test]
fn test_unsupported_context_warns_once() {
    install_logger();
    let mut config = ConfigStore::new();
    config.set(BSA_TEXTURE_SCAN, "true");
    config.set(GAME_DATA_PATH, "/data/");
    let mut loader = ResourceLoader::new(RecordingApi::unsupported(), config);
    loader
        .archives_mut()
        .mount(MemoryArchive::new("Textures.bsa").with_file("textures/sky.dds", dxt1_dds()));

    assert!(loader.add_material("/data/textures/sky.dds", "a.vert", "a.frag").is_err());
    assert!(loader.add_material("/data/textures/sky.dds", "b.vert", "b.frag").is_err());

    let capability = warnings_containing("OpenGL features required for container texture uploads");
    assert_eq!(capability.len(), 1);
    assert!(capability[0].contains("glTexStorage2D"));
    assert_eq!(warnings_containing("/data/textures/sky.dds").len(), 2);
}
