// file: src/state/mod.rs
// description: on-disk application state module exports
// reference: internal module structure

pub mod registry;
pub mod sessions;
pub mod store;

pub use registry::DocumentRegistry;
pub use sessions::SessionStore;
