//! Blockwright core: the visual block model, its Java source emission, and
//! the offline catalog generator that turns an API schema into blocks.

pub mod blocks;
pub mod catalog;
pub mod config;
pub mod error;
pub mod location;
pub mod program;
pub mod registry;
pub mod schema;
pub mod types;

pub use blocks::{BlockDefinition, BlockKind, BlockNode, BlockRecord, BlockTree, NodeId};
pub use catalog::{BlockGenerator, Catalog, CatalogEntry, GenerationReport, Localization};
pub use config::{GeneratorConfig, run_generator};
pub use error::{BlockwrightErrorExt, Level, generate_error_report};
pub use location::{Location, Span};
pub use program::{PluginModule, ProgramSource, emit_program};
pub use registry::BlockRegistry;
pub use schema::ApiSchema;
pub use types::{TypeDescriptor, TypeHierarchy};

/// Registry of built-in blocks plus every entry of `catalog`.
pub fn registry_from_catalog(catalog: &Catalog, labels: &Localization) -> BlockRegistry {
    let mut registry = BlockRegistry::with_builtins();
    registry.load_catalog(catalog, labels);
    registry
}
