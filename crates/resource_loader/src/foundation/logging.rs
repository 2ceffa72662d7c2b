//! Logging utilities

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Honours `RUST_LOG`; defaults to `warn` so missing textures and
/// unsupported GL features are visible without any setup.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Initialize logging, ignoring an already installed logger
///
/// Used by tests and by hosts that may have configured logging themselves.
pub fn try_init() -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init()
        .is_ok()
}
