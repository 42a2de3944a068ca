//! file: core/src/catalog/mod.rs
//! description: the block catalog, its localization labels and the generator
//! that fills them from an API schema.

pub mod entry;
pub mod err;
pub mod generator;
pub mod hash;
pub mod store;

pub use entry::{CatalogEntry, EntryKind};
pub use err::CatalogError;
pub use generator::{BlockGenerator, DEFAULT_EVENT_MARKER, GenerationReport};
pub use hash::hash;
pub use store::{Catalog, Localization};
