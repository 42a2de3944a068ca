//! file: core/src/blocks/mod.rs
//! description: the visual block model.
//!
//! Definitions are shared templates, nodes live in a `BlockTree` arena, and
//! each node kind carries its own emission and validation rules.

pub mod definition;
pub mod emit;
pub mod err;
pub mod kind;
pub mod parameter;
pub mod record;
pub mod tree;
pub mod validate;

pub use definition::{BlockDefinition, Growth, MemberRef};
pub use err::{BlockDiagnostic, RecordError, TreeError};
pub use kind::{BlockKind, BlockRole};
pub use parameter::{Parameter, ParameterList, ParameterSpec, ParameterValue};
pub use record::{BlockRecord, Deserializer, ParameterRecord};
pub use tree::{BlockNode, BlockTree, Link, NodeId, Previous, Validity};
