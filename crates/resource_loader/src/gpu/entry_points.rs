//! One-time detection of the GL entry points needed for container uploads
//!
//! Immutable storage (GL 4.2) and compressed sub-image uploads (GL 1.3) are
//! not guaranteed by the context the host window creates. They are looked up
//! once; if any is missing the container upload path stays disabled for the
//! life of the resolver.

use super::TextureApi;

/// Entry points the container uploader calls
pub const REQUIRED_ENTRY_POINTS: [&str; 7] = [
    "glTexStorage1D",
    "glTexStorage2D",
    "glTexStorage3D",
    "glCompressedTexSubImage1D",
    "glCompressedTexSubImage2D",
    "glCompressedTexSubImage3D",
    "glTexSubImage3D",
];

/// Result of entry-point detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capability {
    /// Detection has not run yet
    #[default]
    Unresolved,
    /// Every required entry point is available
    Supported,
    /// At least one entry point is missing; uploads are skipped
    Unsupported,
}

/// Lazily resolves [`REQUIRED_ENTRY_POINTS`] against a backend
///
/// Transitions `Unresolved -> Supported | Unsupported` exactly once.
#[derive(Debug, Clone, Default)]
pub struct EntryPointResolver {
    state: Capability,
}

impl EntryPointResolver {
    /// Create an unresolved resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state without triggering detection
    pub const fn capability(&self) -> Capability {
        self.state
    }

    /// Run detection if it has not run yet and report whether uploads are possible
    pub fn ensure_resolved<A: TextureApi + ?Sized>(&mut self, api: &A) -> bool {
        if self.state == Capability::Unresolved {
            let missing: Vec<&str> = REQUIRED_ENTRY_POINTS
                .iter()
                .copied()
                .filter(|name| !api.has_entry_point(name))
                .collect();

            if missing.is_empty() {
                log::debug!("All texture storage entry points resolved");
                self.state = Capability::Supported;
            } else {
                log::warn!(
                    "OpenGL features required for container texture uploads aren't there (missing: {})",
                    missing.join(", ")
                );
                self.state = Capability::Unsupported;
            }
        }

        self.state == Capability::Supported
    }
}
