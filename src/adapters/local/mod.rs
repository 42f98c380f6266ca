//! Local adapters.

pub mod fs;

pub use fs::FsCaptionSource;
