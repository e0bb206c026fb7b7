//! Utilities

pub mod blob;

pub use blob::load_blob;
