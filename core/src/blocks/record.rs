//! file: core/src/blocks/record.rs
//! description: persisted form of block trees.
//!
//! A record stores a node as `{ id, parameters, children? }`, where each
//! parameter is a string (literal text or selected option), a nested record,
//! or `null` for an empty expression slot. Rehydration goes through the
//! registry so every node is rebuilt from its shared definition.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::blocks::err::RecordError;
use crate::blocks::parameter::ParameterValue;
use crate::blocks::tree::{BlockTree, NodeId};
use crate::error::{BlockwrightErrorExt, Level};
use crate::registry::BlockRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: String,
    #[serde(default)]
    pub parameters: Vec<ParameterRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BlockRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterRecord {
    Block(Box<BlockRecord>),
    Value(String),
    Empty,
}

impl BlockRecord {
    pub fn new(id: &str) -> Self {
        BlockRecord { id: id.to_string(), parameters: Vec::new(), children: None }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.parameters.push(ParameterRecord::Value(value.to_string()));
        self
    }

    pub fn with_block(mut self, record: BlockRecord) -> Self {
        self.parameters.push(ParameterRecord::Block(Box::new(record)));
        self
    }

    pub fn with_empty(mut self) -> Self {
        self.parameters.push(ParameterRecord::Empty);
        self
    }

    pub fn with_child(mut self, record: BlockRecord) -> Self {
        self.children.get_or_insert_with(Vec::new).push(record);
        self
    }
}

/// Persist node `id` and everything it owns. `None` for a removed node.
pub fn serialize(tree: &BlockTree, id: NodeId) -> Option<BlockRecord> {
    let node = tree.get(id)?;
    let parameters = node
        .parameters()
        .iter()
        .map(|param| match param.value() {
            ParameterValue::Literal(text) => ParameterRecord::Value(text.clone()),
            ParameterValue::Choice { .. } => {
                ParameterRecord::Value(param.selected().unwrap_or_default().to_string())
            }
            ParameterValue::Expression(Some(nested)) => match serialize(tree, *nested) {
                Some(record) => ParameterRecord::Block(Box::new(record)),
                None => ParameterRecord::Empty,
            },
            ParameterValue::Expression(None) => ParameterRecord::Empty,
        })
        .collect();
    let children = node
        .is_container()
        .then(|| node.children().iter().filter_map(|child| serialize(tree, *child)).collect());
    Some(BlockRecord {
        id: node.definition().id().to_string(),
        parameters,
        children,
    })
}

/// Every root of the tree, in order.
pub fn serialize_forest(tree: &BlockTree) -> Vec<BlockRecord> {
    tree.roots().iter().filter_map(|root| serialize(tree, *root)).collect()
}

/// Rebuilds nodes from records, collecting a diagnostic for every record it
/// had to drop.
pub struct Deserializer<'r> {
    registry: &'r BlockRegistry,
    diagnostics: Vec<Box<dyn BlockwrightErrorExt>>,
}

impl<'r> Deserializer<'r> {
    pub fn new(registry: &'r BlockRegistry) -> Self {
        Deserializer { registry, diagnostics: Vec::new() }
    }

    pub fn diagnostics(&self) -> &[Box<dyn BlockwrightErrorExt>] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Box<dyn BlockwrightErrorExt>> {
        self.diagnostics
    }

    /// Rebuild one detached node. On failure nothing of it stays in the tree.
    pub fn deserialize(&mut self, tree: &mut BlockTree, record: &BlockRecord) -> Result<NodeId, Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.blocks.record.deserialize";
        let definition = self
            .registry
            .get(&record.id)
            .cloned()
            .ok_or_else(|| RecordError::boxed("Unknown block id".into(), ISSUER, &record.id))?;
        let id = tree.create_block(definition);
        match self.fill(tree, id, record) {
            Ok(()) => {
                tree.update(id);
                Ok(id)
            }
            Err(e) => {
                tree.discard(id);
                Err(e)
            }
        }
    }

    fn fill(&mut self, tree: &mut BlockTree, id: NodeId, record: &BlockRecord) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.blocks.record.fill";
        tree.resize_parameters(id, record.parameters.len()).map_err(|(min, max)| {
            let message = if min == max {
                format!("Expected {} parameters but found {}", min, record.parameters.len())
            } else {
                format!("Expected {} to {} parameters but found {}", min, max, record.parameters.len())
            };
            RecordError::boxed(message, ISSUER, &record.id)
        })?;

        for (slot, value) in record.parameters.iter().enumerate() {
            let current = tree
                .get(id)
                .and_then(|node| node.parameters().get(slot))
                .map(|param| param.value().clone());
            match (current, value) {
                (Some(ParameterValue::Literal(_)), ParameterRecord::Value(text)) => {
                    tree.set_parameter_literal(id, slot, text)?;
                }
                (Some(ParameterValue::Choice { .. }), ParameterRecord::Value(option)) => {
                    tree.select_choice(id, slot, option)?;
                }
                (Some(ParameterValue::Expression(_)), ParameterRecord::Empty) => {}
                (Some(ParameterValue::Expression(_)), ParameterRecord::Block(nested)) => {
                    let nested_id = self.deserialize(tree, nested)?;
                    if let Err(e) = tree.set_parameter_block(id, slot, nested_id) {
                        tree.discard(nested_id);
                        return Err(e);
                    }
                }
                _ => {
                    return Err(RecordError::boxed(
                        format!("Parameter {} does not match the block's parameter shape", slot + 1),
                        ISSUER,
                        &record.id,
                    ));
                }
            }
        }

        let is_container = tree.get(id).map(|node| node.is_container()).unwrap_or(false);
        match &record.children {
            Some(children) if is_container => {
                for child in children {
                    self.attach_child(tree, id, child);
                }
            }
            Some(children) if !children.is_empty() => {
                return Err(RecordError::boxed("Block cannot hold children".into(), ISSUER, &record.id));
            }
            _ => {}
        }
        Ok(())
    }

    fn attach_child(&mut self, tree: &mut BlockTree, parent: NodeId, record: &BlockRecord) {
        let attached = self.deserialize(tree, record).and_then(|child| {
            tree.append_child(parent, child).inspect_err(|_| tree.discard(child))
        });
        if let Err(e) = attached {
            self.drop_record(e);
        }
    }

    fn drop_record(&mut self, error: Box<dyn BlockwrightErrorExt>) {
        warn!("dropping block record: {}", error.message());
        self.diagnostics.push(error);
    }

    /// Rebuild and append every root record; failing roots are dropped and
    /// reported through `diagnostics`.
    pub fn deserialize_forest(&mut self, tree: &mut BlockTree, records: &[BlockRecord]) -> Vec<NodeId> {
        let mut roots = Vec::new();
        for record in records {
            let placed = self
                .deserialize(tree, record)
                .and_then(|root| tree.append_root(root).map(|()| root).inspect_err(|_| tree.discard(root)));
            match placed {
                Ok(root) => roots.push(root),
                Err(e) => self.drop_record(e),
            }
        }
        roots
    }
}

/// Read a JSON array of root records.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<BlockRecord>, Box<dyn BlockwrightErrorExt>> {
    const ISSUER: &str = "blockwright.blocks.record.load_records";
    let raw = std::fs::read_to_string(&path).map_err(|e| {
        Box::new(RecordError::with(
            Level::Critical,
            format!("read {}: {}", path.as_ref().display(), e),
            ISSUER,
            "",
        )) as Box<dyn BlockwrightErrorExt>
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        Box::new(RecordError::with(
            Level::Critical,
            format!("parse {}: {}", path.as_ref().display(), e),
            ISSUER,
            "",
        )) as Box<dyn BlockwrightErrorExt>
    })
}

/// Load a saved program into `tree`. Returns the diagnostics of dropped records.
pub fn load_tree<P: AsRef<Path>>(
    path: P,
    registry: &BlockRegistry,
    tree: &mut BlockTree,
) -> Result<Vec<Box<dyn BlockwrightErrorExt>>, Box<dyn BlockwrightErrorExt>> {
    let records = load_records(path)?;
    let mut deserializer = Deserializer::new(registry);
    deserializer.deserialize_forest(tree, &records);
    Ok(deserializer.into_diagnostics())
}

/// Write every root of `tree` as a JSON array.
pub fn save_tree<P: AsRef<Path>>(tree: &BlockTree, path: P) -> Result<(), Box<dyn BlockwrightErrorExt>> {
    const ISSUER: &str = "blockwright.blocks.record.save_tree";
    let io_error = |message: String| {
        Box::new(RecordError::with(Level::Critical, message, ISSUER, "")) as Box<dyn BlockwrightErrorExt>
    };
    let json = serde_json::to_string_pretty(&serialize_forest(tree)).map_err(|e| io_error(format!("encode tree: {}", e)))?;
    std::fs::write(&path, json).map_err(|e| io_error(format!("write {}: {}", path.as_ref().display(), e)))
}
