pub mod classify;
pub mod client;
pub mod error;
pub mod models;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use models::{ArtifactDescriptor, ReleaseCatalog, VersionMap};
