//! file: core/src/blocks/tree.rs
//! description: arena storage for block nodes and structural edits.
//!
//! Nodes live in an indexed pool owned by `BlockTree` and refer to each other
//! by `NodeId`. Ownership runs downward only: a container owns its child
//! sequence, an expression slot owns its nested node. The upward `Link`
//! (parent / previous sibling / owning slot) is an index used for contextual
//! validation, never for ownership.
//!
//! Every structural edit re-runs `update()` on the sequence it touched and
//! on any inserted subtree before returning, so callers never observe a
//! partially validated tree.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::blocks::definition::BlockDefinition;
use crate::blocks::emit::EmitContext;
use crate::blocks::err::{BlockDiagnostic, TreeError};
use crate::blocks::kind::BlockRole;
use crate::blocks::parameter::{Parameter, ParameterList, ParameterValue};
use crate::blocks::validate::{self, ValidateContext};
use crate::error::BlockwrightErrorExt;
use crate::types::TypeHierarchy;

/// Handle to a node. Arena slots are reused after `remove`, and the
/// generation makes a handle to a freed node stay dead instead of naming
/// whatever node takes its slot next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}

/// What stands immediately before a node in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Previous {
    /// The anonymous connector at the head of every sequence.
    Connector,
    Block(NodeId),
}

/// Upward back-reference of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Detached,
    /// Member of the root sequence (`parent == None`) or of a container body.
    Sequence { parent: Option<NodeId>, previous: Previous },
    /// Held by expression slot `index` of `owner`.
    Slot { owner: NodeId, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    Unvalidated,
    Valid,
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct BlockNode {
    definition: Arc<BlockDefinition>,
    parameters: ParameterList,
    children: Option<Vec<NodeId>>,
    link: Link,
    validity: Validity,
}

impl BlockNode {
    fn new(definition: Arc<BlockDefinition>) -> Self {
        let parameters = definition.instantiate();
        let children = definition.is_container().then(Vec::new);
        BlockNode {
            definition,
            parameters,
            children,
            link: Link::Detached,
            validity: Validity::Unvalidated,
        }
    }

    pub fn definition(&self) -> &Arc<BlockDefinition> {
        &self.definition
    }

    pub fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    /// Child sequence; empty for non-containers.
    pub fn children(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_container(&self) -> bool {
        self.children.is_some()
    }

    pub fn link(&self) -> Link {
        self.link
    }

    /// Enclosing node: the container of a sequence member or the owner of a slot.
    pub fn parent(&self) -> Option<NodeId> {
        match self.link {
            Link::Sequence { parent, .. } => parent,
            Link::Slot { owner, .. } => Some(owner),
            Link::Detached => None,
        }
    }

    pub fn previous(&self) -> Option<Previous> {
        match self.link {
            Link::Sequence { previous, .. } => Some(previous),
            _ => None,
        }
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn is_valid(&self) -> bool {
        self.validity == Validity::Valid
    }

    pub fn invalid_message(&self) -> Option<&str> {
        match &self.validity {
            Validity::Invalid(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<BlockNode>,
}

/// Arena of block nodes plus the root sequence of the program.
#[derive(Debug, Clone)]
pub struct BlockTree {
    nodes: Vec<Slot>,
    free: Vec<usize>,
    roots: Vec<NodeId>,
    hierarchy: TypeHierarchy,
}

impl Default for BlockTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockTree {
    pub fn new() -> Self {
        Self::with_hierarchy(TypeHierarchy::with_builtins())
    }

    pub fn with_hierarchy(hierarchy: TypeHierarchy) -> Self {
        BlockTree {
            nodes: Vec::new(),
            free: Vec::new(),
            roots: Vec::new(),
            hierarchy,
        }
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    pub fn hierarchy_mut(&mut self) -> &mut TypeHierarchy {
        &mut self.hierarchy
    }

    /// Build a detached, unvalidated node with default parameters.
    pub fn create_block(&mut self, definition: Arc<BlockDefinition>) -> NodeId {
        let node = BlockNode::new(definition);
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.nodes[index];
                slot.generation = slot.generation.wrapping_add(1);
                slot.node = Some(node);
                NodeId { index, generation: slot.generation }
            }
            None => {
                self.nodes.push(Slot { generation: 0, node: Some(node) });
                NodeId { index: self.nodes.len() - 1, generation: 0 }
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&BlockNode> {
        self.nodes
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut BlockNode> {
        self.nodes
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Live node ids in index order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.node.is_some())
            .map(|(index, slot)| NodeId { index, generation: slot.generation })
            .collect()
    }

    fn node(&self, id: NodeId, issuer: &str) -> Result<&BlockNode, Box<dyn BlockwrightErrorExt>> {
        self.get(id)
            .ok_or_else(|| TreeError::boxed("Unknown or removed node".into(), issuer, Some(id)))
    }

    fn node_mut(&mut self, id: NodeId, issuer: &str) -> Result<&mut BlockNode, Box<dyn BlockwrightErrorExt>> {
        self.get_mut(id)
            .ok_or_else(|| TreeError::boxed("Unknown or removed node".into(), issuer, Some(id)))
    }

    /// Whether `ancestor` encloses `id` (through sequences or slots).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.get(id).and_then(BlockNode::parent);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.get(node).and_then(BlockNode::parent);
        }
        false
    }

    /// `id` and everything it owns, parents before descendants.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else { continue };
            out.push(current);
            let mut owned: Vec<NodeId> = node.parameters.nested_nodes();
            owned.extend_from_slice(node.children());
            stack.extend(owned.into_iter().rev());
        }
        out
    }

    // ------- Sequences -------

    pub fn append_root(&mut self, id: NodeId) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        let index = self.roots.len();
        self.insert_into_sequence(None, index, id)
    }

    pub fn insert_root(&mut self, index: usize, id: NodeId) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        self.insert_into_sequence(None, index, id)
    }

    pub fn append_child(&mut self, parent: NodeId, id: NodeId) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        let index = self.node(parent, "blockwright.blocks.tree.append_child")?.children().len();
        self.insert_into_sequence(Some(parent), index, id)
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, id: NodeId) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        self.insert_into_sequence(Some(parent), index, id)
    }

    fn insert_into_sequence(
        &mut self,
        parent: Option<NodeId>,
        index: usize,
        id: NodeId,
    ) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.blocks.tree.insert";
        let node = self.node(id, ISSUER)?;
        if node.link != Link::Detached {
            return Err(TreeError::boxed("Node is already placed; detach it first".into(), ISSUER, Some(id)));
        }
        if !node.definition.role().is_sequence_member() {
            return Err(TreeError::boxed(
                format!("'{}' is an expression and cannot be placed in a sequence", node.definition.id()),
                ISSUER,
                Some(id),
            ));
        }
        if let Some(parent) = parent {
            if parent == id || self.is_ancestor(id, parent) {
                return Err(TreeError::boxed("A block cannot contain itself".into(), ISSUER, Some(id)));
            }
            if !self.node(parent, ISSUER)?.is_container() {
                return Err(TreeError::boxed("Target is not a container".into(), ISSUER, Some(parent)));
            }
        }
        let len = self.sequence(parent).len();
        if index > len {
            return Err(TreeError::boxed(
                format!("Insert position {} is past the end of a sequence of {}", index, len),
                ISSUER,
                parent,
            ));
        }

        match self.sequence_mut(parent) {
            Some(sequence) => sequence.insert(index, id),
            None => return Err(TreeError::boxed("Target is not a container".into(), ISSUER, parent)),
        }
        self.relink_sequence(parent);
        self.update_subtree(id);
        self.update_sequence(parent);
        Ok(())
    }

    fn sequence(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            None => &self.roots,
            Some(p) => self.get(p).map(BlockNode::children).unwrap_or(&[]),
        }
    }

    fn sequence_mut(&mut self, parent: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            None => Some(&mut self.roots),
            Some(p) => self.get_mut(p).and_then(|n| n.children.as_mut()),
        }
    }

    fn relink_sequence(&mut self, parent: Option<NodeId>) {
        let members: Vec<NodeId> = self.sequence(parent).to_vec();
        let mut previous = Previous::Connector;
        for id in members {
            if let Some(node) = self.get_mut(id) {
                node.link = Link::Sequence { parent, previous };
            }
            previous = Previous::Block(id);
        }
    }

    fn update_sequence(&mut self, parent: Option<NodeId>) {
        let members: Vec<NodeId> = self.sequence(parent).to_vec();
        for id in members {
            self.update(id);
        }
    }

    /// Unlink `id` from wherever it is placed; the subtree stays alive.
    pub fn detach(&mut self, id: NodeId) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.blocks.tree.detach";
        let link = self.node(id, ISSUER)?.link;
        match link {
            Link::Detached => return Ok(()),
            Link::Sequence { parent, .. } => {
                if let Some(sequence) = self.sequence_mut(parent) {
                    sequence.retain(|member| *member != id);
                }
                self.set_link(id, Link::Detached);
                self.relink_sequence(parent);
                self.update_sequence(parent);
            }
            Link::Slot { owner, index } => {
                if let Some(param) = self.node_mut(owner, ISSUER)?.parameters.get_mut(index) {
                    *param.value_mut() = ParameterValue::Expression(None);
                }
                self.set_link(id, Link::Detached);
                self.update(owner);
            }
        }
        self.update_subtree(id);
        Ok(())
    }

    /// Detach `id` and free it together with everything it owns.
    pub fn remove(&mut self, id: NodeId) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        self.detach(id)?;
        self.free_subtree(id);
        Ok(())
    }

    /// Reorder or reparent a sequence member. `index` is taken after detaching.
    pub fn move_node(&mut self, id: NodeId, parent: Option<NodeId>, index: usize) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.blocks.tree.move_node";
        if let Some(p) = parent {
            if p == id || self.is_ancestor(id, p) {
                return Err(TreeError::boxed("A block cannot contain itself".into(), ISSUER, Some(id)));
            }
        }
        let node = self.node(id, ISSUER)?;
        if !node.definition.role().is_sequence_member() {
            return Err(TreeError::boxed(
                format!("'{}' is an expression; place it with set_parameter_block", node.definition.id()),
                ISSUER,
                Some(id),
            ));
        }
        let old = node.link;
        self.detach(id)?;
        if let Err(e) = self.insert_into_sequence(parent, index, id) {
            // put it back where it was so a refused move is not a deletion
            if let Link::Sequence { parent: old_parent, previous } = old {
                let position = match previous {
                    Previous::Connector => 0,
                    Previous::Block(prev) => self
                        .sequence(old_parent)
                        .iter()
                        .position(|m| *m == prev)
                        .map(|p| p + 1)
                        .unwrap_or(0),
                };
                self.insert_into_sequence(old_parent, position, id)?;
            }
            return Err(e);
        }
        Ok(())
    }

    fn set_link(&mut self, id: NodeId, link: Link) {
        if let Some(node) = self.get_mut(id) {
            node.link = link;
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        for node in self.descendants(id) {
            if let Some(slot) = self.nodes.get_mut(node.index) {
                slot.node = None;
            }
            self.free.push(node.index);
        }
        debug!("freed subtree rooted at node {}", id);
    }

    // ------- Parameters -------

    /// Place expression node `id` into expression slot `slot` of `owner`.
    /// A block already in the slot is freed.
    pub fn set_parameter_block(&mut self, owner: NodeId, slot: usize, id: NodeId) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.blocks.tree.set_parameter_block";
        let node = self.node(id, ISSUER)?;
        if node.link != Link::Detached {
            return Err(TreeError::boxed("Node is already placed; detach it first".into(), ISSUER, Some(id)));
        }
        if node.definition.role() != BlockRole::Expression {
            return Err(TreeError::boxed(
                format!("'{}' does not produce a value", node.definition.id()),
                ISSUER,
                Some(id),
            ));
        }
        if owner == id || self.is_ancestor(id, owner) {
            return Err(TreeError::boxed("A block cannot contain itself".into(), ISSUER, Some(id)));
        }
        let previous = match self.node(owner, ISSUER)?.parameters.get(slot).map(Parameter::value) {
            Some(ParameterValue::Expression(previous)) => *previous,
            Some(_) => {
                return Err(TreeError::boxed(format!("Parameter {} is not an expression slot", slot), ISSUER, Some(owner)));
            }
            None => {
                return Err(TreeError::boxed(format!("Parameter {} does not exist", slot), ISSUER, Some(owner)));
            }
        };
        if let Some(previous) = previous {
            self.free_subtree(previous);
        }
        if let Some(param) = self.node_mut(owner, ISSUER)?.parameters.get_mut(slot) {
            *param.value_mut() = ParameterValue::Expression(Some(id));
        }
        self.set_link(id, Link::Slot { owner, index: slot });
        self.update_subtree(id);
        self.update(owner);
        Ok(())
    }

    /// Set the text of literal slot `slot`.
    pub fn set_parameter_literal(&mut self, owner: NodeId, slot: usize, text: &str) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.blocks.tree.set_parameter_literal";
        match self.node_mut(owner, ISSUER)?.parameters.get_mut(slot).map(Parameter::value_mut) {
            Some(ParameterValue::Literal(value)) => *value = text.to_string(),
            Some(_) => return Err(TreeError::boxed(format!("Parameter {} is not a literal", slot), ISSUER, Some(owner))),
            None => return Err(TreeError::boxed(format!("Parameter {} does not exist", slot), ISSUER, Some(owner))),
        }
        self.update(owner);
        Ok(())
    }

    /// Select `option` in choice slot `slot`.
    pub fn select_choice(&mut self, owner: NodeId, slot: usize, option: &str) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.blocks.tree.select_choice";
        match self.node_mut(owner, ISSUER)?.parameters.get_mut(slot).map(Parameter::value_mut) {
            Some(ParameterValue::Choice { options, selected }) => match options.iter().position(|o| o == option) {
                Some(position) => *selected = position,
                None => {
                    return Err(TreeError::boxed(
                        format!("'{}' is not one of {:?}", option, options),
                        ISSUER,
                        Some(owner),
                    ));
                }
            },
            Some(_) => return Err(TreeError::boxed(format!("Parameter {} is not a choice", slot), ISSUER, Some(owner))),
            None => return Err(TreeError::boxed(format!("Parameter {} does not exist", slot), ISSUER, Some(owner))),
        }
        self.update(owner);
        Ok(())
    }

    /// Empty expression slot `slot`, freeing the block it held.
    pub fn clear_parameter(&mut self, owner: NodeId, slot: usize) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.blocks.tree.clear_parameter";
        let nested = self
            .node(owner, ISSUER)?
            .parameters
            .get(slot)
            .ok_or_else(|| TreeError::boxed(format!("Parameter {} does not exist", slot), ISSUER, Some(owner)))?
            .nested();
        if let Some(nested) = nested {
            self.remove(nested)?;
        }
        Ok(())
    }

    /// Add one operand to a growable block. `false` at the upper bound.
    pub fn increase_size(&mut self, id: NodeId) -> bool {
        let grown = match self.get_mut(id) {
            Some(node) => node.parameters.increase(),
            None => false,
        };
        if grown {
            self.update(id);
        }
        grown
    }

    /// Drop the last operand of a growable block. `false` at the lower bound.
    pub fn decrease_size(&mut self, id: NodeId) -> bool {
        let removed = match self.get_mut(id) {
            Some(node) => node.parameters.decrease(),
            None => None,
        };
        match removed {
            Some(param) => {
                if let Some(nested) = param.nested() {
                    self.free_subtree(nested);
                }
                self.update(id);
                true
            }
            None => false,
        }
    }

    /// Resize a fresh node's parameter list to a persisted length.
    pub(crate) fn resize_parameters(&mut self, id: NodeId, len: usize) -> Result<(), (usize, usize)> {
        let removed = match self.get_mut(id) {
            Some(node) => node.parameters.resize(len)?,
            None => return Err((0, 0)),
        };
        for nested in removed.iter().filter_map(Parameter::nested) {
            self.free_subtree(nested);
        }
        Ok(())
    }

    /// Free a node that was never placed (used to roll back failed rehydration).
    pub(crate) fn discard(&mut self, id: NodeId) {
        if self.get(id).map(|n| n.link == Link::Detached).unwrap_or(false) {
            self.free_subtree(id);
        }
    }

    // ------- Validation -------

    /// Revalidate one node against its context. Returns whether it is valid.
    pub fn update(&mut self, id: NodeId) -> bool {
        let outcome = match self.get(id) {
            Some(node) => validate::check(&ValidateContext::new(self, id, node)),
            None => return false,
        };
        let validity = match outcome {
            Ok(()) => Validity::Valid,
            Err(message) => Validity::Invalid(message),
        };
        let valid = validity == Validity::Valid;
        if let Some(node) = self.get_mut(id) {
            node.validity = validity;
        }
        valid
    }

    /// Revalidate `id` and everything it owns.
    pub fn update_subtree(&mut self, id: NodeId) {
        for node in self.descendants(id) {
            self.update(node);
        }
    }

    pub fn update_all(&mut self) {
        for id in self.ids() {
            self.update(id);
        }
    }

    pub fn invalid_nodes(&self) -> Vec<NodeId> {
        self.ids()
            .into_iter()
            .filter(|id| self.get(*id).map(|n| n.invalid_message().is_some()).unwrap_or(false))
            .collect()
    }

    pub fn diagnostics(&self) -> Vec<BlockDiagnostic> {
        self.ids()
            .into_iter()
            .filter_map(|id| {
                let node = self.get(id)?;
                node.invalid_message().map(|message| BlockDiagnostic {
                    node: id,
                    block_id: node.definition.id().to_string(),
                    message: message.to_string(),
                })
            })
            .collect()
    }

    /// No node is currently invalid.
    pub fn is_compilable(&self) -> bool {
        self.invalid_nodes().is_empty()
    }

    // ------- Emission -------

    /// Render `id` and everything it owns as target source text.
    /// A removed node renders as the empty string.
    pub fn emit_source(&self, id: NodeId) -> String {
        match self.get(id) {
            Some(node) => {
                let ctx = EmitContext::new(self, id, node);
                (node.definition.kind().emitter())(&ctx)
            }
            None => String::new(),
        }
    }
}
