//! GPU abstraction for texture creation
//!
//! The loader never talks to OpenGL directly. Every call goes through the
//! [`TextureApi`] trait so the same upload code can drive a real context
//! ([`GlowApi`], behind the `glow` feature) or the headless
//! [`RecordingApi`] used by tests and tooling.

pub mod gl;
mod api;
mod entry_points;
mod recording;

#[cfg(feature = "glow")]
mod glow_backend;

pub use api::{TextureApi, TextureId};
pub use entry_points::{Capability, EntryPointResolver, REQUIRED_ENTRY_POINTS};
pub use recording::{GlCall, RecordingApi};

#[cfg(feature = "glow")]
pub use glow_backend::GlowApi;
