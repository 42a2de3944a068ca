//! file: core/src/registry.rs
//! description: lookup table of block definitions by id.
//!
//! The registry owns one shared definition per block id: the built-in
//! literal and control-flow blocks plus one per catalog entry. Nodes are
//! created through it so that every node of the same id shares its template.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::blocks::record::{BlockRecord, Deserializer};
use crate::blocks::{BlockDefinition, BlockKind, BlockTree, NodeId, ParameterSpec, TreeError};
use crate::catalog::{Catalog, Localization};
use crate::error::BlockwrightErrorExt;
use crate::types::TypeDescriptor;

#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    definitions: BTreeMap<String, Arc<BlockDefinition>>,
}

fn builtin_definitions() -> Vec<BlockDefinition> {
    let string = TypeDescriptor::string;
    let boolean = TypeDescriptor::boolean;
    let negate = || ParameterSpec::choice(&["false", "true"]);
    vec![
        BlockDefinition::expression("expr-string", BlockKind::StringLiteral, string())
            .with_parameter(ParameterSpec::literal(string(), "")),
        BlockDefinition::expression("expr-number", BlockKind::NumberLiteral, TypeDescriptor::number())
            .with_parameter(ParameterSpec::literal(TypeDescriptor::number(), "0")),
        BlockDefinition::expression("expr-boolean", BlockKind::BooleanLiteral, boolean())
            .with_parameter(ParameterSpec::choice(&["true", "false"])),
        BlockDefinition::expression("expr-combine-strings", BlockKind::CombineStrings, string())
            .with_growth(ParameterSpec::expression(string()), 2, 10),
        BlockDefinition::expression("expr-negate-boolean", BlockKind::NegateBoolean, boolean())
            .with_parameter(ParameterSpec::expression(boolean())),
        BlockDefinition::expression("expr-colored-string", BlockKind::ColoredString, string())
            .with_parameter(ParameterSpec::expression(string())),
        BlockDefinition::expression("expr-directory-files", BlockKind::DirectoryFiles, TypeDescriptor::list())
            .with_parameter(ParameterSpec::expression(TypeDescriptor::of("java.io.File"))),
        BlockDefinition::expression(
            "expr-new-config",
            BlockKind::NewConfig,
            TypeDescriptor::of("org.bukkit.configuration.ConfigurationSection"),
        ),
        BlockDefinition::expression("expr-event", BlockKind::EventInstance, TypeDescriptor::any()),
        BlockDefinition::container("stat-if-statement", BlockKind::IfStatement)
            .with_parameter(ParameterSpec::expression(boolean()))
            .with_parameter(negate()),
        BlockDefinition::container("stat-else-if-statement", BlockKind::ElseIfStatement)
            .with_parameter(ParameterSpec::expression(boolean()))
            .with_parameter(negate()),
        BlockDefinition::container("stat-else-statement", BlockKind::ElseStatement),
        BlockDefinition::container("stat-while-loop", BlockKind::WhileLoop)
            .with_parameter(ParameterSpec::expression(boolean())),
    ]
}

impl BlockRegistry {
    pub fn new() -> Self {
        BlockRegistry::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = BlockRegistry::new();
        for definition in builtin_definitions() {
            registry.register(definition);
        }
        registry
    }

    /// Add `definition` unless its id is taken. Returns whether it was added.
    pub fn register(&mut self, definition: BlockDefinition) -> bool {
        if self.definitions.contains_key(definition.id()) {
            return false;
        }
        self.definitions.insert(definition.id().to_string(), Arc::new(definition));
        true
    }

    /// One definition per catalog entry. Returns how many were added.
    pub fn load_catalog(&mut self, catalog: &Catalog, labels: &Localization) -> usize {
        let added = catalog
            .iter()
            .filter(|entry| self.register(BlockDefinition::from_catalog_entry(entry, labels)))
            .count();
        debug!("registered {} catalog blocks", added);
        added
    }

    pub fn get(&self, id: &str) -> Option<&Arc<BlockDefinition>> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions ordered by id.
    pub fn definitions(&self) -> impl Iterator<Item = &Arc<BlockDefinition>> {
        self.definitions.values()
    }

    /// Fresh detached node of block `id`.
    pub fn create_block(&self, tree: &mut BlockTree, id: &str) -> Result<NodeId, Box<dyn BlockwrightErrorExt>> {
        match self.get(id) {
            Some(definition) => Ok(tree.create_block(Arc::clone(definition))),
            None => Err(TreeError::boxed(
                format!("Unknown block id '{}'", id),
                "blockwright.registry.create_block",
                None,
            )),
        }
    }

    /// Rebuild a detached node (and everything it owns) from a persisted record.
    pub fn create_block_from_record(
        &self,
        tree: &mut BlockTree,
        record: &BlockRecord,
    ) -> Result<NodeId, Box<dyn BlockwrightErrorExt>> {
        Deserializer::new(self).deserialize(tree, record)
    }
}
