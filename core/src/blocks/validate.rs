//! file: core/src/blocks/validate.rs
//! description: per-kind validity rules.
//!
//! Validation looks at a node's parameters and its placement. Every node first
//! passes the shared parameter type check, then the rule its kind selects in
//! `BlockKind::validator`. A rule returns the message shown to the user when
//! the node is invalid.

use crate::blocks::definition::BlockDefinition;
use crate::blocks::kind::BlockKind;
use crate::blocks::parameter::ParameterValue;
use crate::blocks::tree::{BlockNode, BlockTree, Link, NodeId, Previous};

pub struct ValidateContext<'a> {
    tree: &'a BlockTree,
    id: NodeId,
    node: &'a BlockNode,
}

impl<'a> ValidateContext<'a> {
    pub(crate) fn new(tree: &'a BlockTree, id: NodeId, node: &'a BlockNode) -> Self {
        ValidateContext { tree, id, node }
    }

    pub fn tree(&self) -> &BlockTree {
        self.tree
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &BlockNode {
        self.node
    }

    pub fn definition(&self) -> &BlockDefinition {
        self.node.definition()
    }

    pub fn previous(&self) -> Option<Previous> {
        self.node.previous()
    }

    /// Enclosing nodes, innermost first.
    pub fn ancestors(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.node.parent();
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.tree.get(id).and_then(BlockNode::parent);
        }
        out
    }

    pub fn literal(&self, index: usize) -> Option<&str> {
        match self.node.parameters().get(index)?.value() {
            ParameterValue::Literal(text) => Some(text),
            _ => None,
        }
    }
}

/// Shared type check followed by the kind's own rule.
pub fn check(ctx: &ValidateContext<'_>) -> Result<(), String> {
    check_parameter_types(ctx)?;
    (ctx.definition().kind().validator())(ctx)
}

fn check_parameter_types(ctx: &ValidateContext<'_>) -> Result<(), String> {
    for (index, param) in ctx.node.parameters().iter().enumerate() {
        let Some(nested) = param.nested() else { continue };
        let Some(node) = ctx.tree.get(nested) else { continue };
        let expected = param.expected_type();
        match node.definition().return_type() {
            Some(actual) if expected.accepts(actual, ctx.tree.hierarchy()) => {}
            Some(actual) => {
                return Err(format!(
                    "Parameter {} expects {} but got {}",
                    index + 1,
                    expected.simple_name(),
                    actual.simple_name()
                ));
            }
            None => {
                return Err(format!(
                    "Parameter {} expects {} but got a block without a value",
                    index + 1,
                    expected.simple_name()
                ));
            }
        }
    }
    Ok(())
}

pub fn always_valid(_ctx: &ValidateContext<'_>) -> Result<(), String> {
    Ok(())
}

pub fn number_literal(ctx: &ValidateContext<'_>) -> Result<(), String> {
    let text = ctx.literal(0).unwrap_or_default();
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(()),
        _ => Err(format!("'{}' is not a number", text)),
    }
}

pub fn follows_if_branch(ctx: &ValidateContext<'_>) -> Result<(), String> {
    let opens = match ctx.previous() {
        Some(Previous::Block(prev)) => ctx
            .tree
            .get(prev)
            .map(|n| n.definition().kind().opens_branch())
            .unwrap_or(false),
        _ => false,
    };
    if opens {
        Ok(())
    } else {
        Err("Else blocks must directly follow an if or else-if block".to_string())
    }
}

pub fn inside_event_handler(ctx: &ValidateContext<'_>) -> Result<(), String> {
    let inside = ctx.ancestors().into_iter().any(|id| {
        ctx.tree
            .get(id)
            .map(|n| n.definition().kind() == BlockKind::EventHandler)
            .unwrap_or(false)
    });
    if inside {
        Ok(())
    } else {
        Err("The event value is only available inside an event handler".to_string())
    }
}

pub fn top_level_only(ctx: &ValidateContext<'_>) -> Result<(), String> {
    match ctx.node.link() {
        Link::Sequence { parent: None, .. } | Link::Detached => Ok(()),
        _ => Err("Event handlers must be placed at the top level".to_string()),
    }
}
