//! Domain models shared across the pipeline.

pub mod storage;
pub mod video;

pub use storage::{SignedUrl, StorageObject};
pub use video::{AspectClass, ContainerGeometry};
