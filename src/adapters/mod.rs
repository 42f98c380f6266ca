//! Adapters - Concrete implementations of ports.

pub mod apivideo;
pub mod local;
