//! file: core/src/blocks/emit.rs
//! description: per-kind source emission rules.
//!
//! Each function renders one node from its current state and recurses into
//! nested slots and child sequences through `EmitContext`. Emission never
//! mutates the tree.

use crate::blocks::definition::BlockDefinition;
use crate::blocks::kind::BlockRole;
use crate::blocks::parameter::ParameterValue;
use crate::blocks::tree::{BlockNode, BlockTree, NodeId};

pub struct EmitContext<'a> {
    tree: &'a BlockTree,
    id: NodeId,
    node: &'a BlockNode,
}

impl<'a> EmitContext<'a> {
    pub(crate) fn new(tree: &'a BlockTree, id: NodeId, node: &'a BlockNode) -> Self {
        EmitContext { tree, id, node }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn definition(&self) -> &BlockDefinition {
        self.node.definition()
    }

    pub fn parameter_count(&self) -> usize {
        self.node.parameters().len()
    }

    /// Source of parameter `index`. String literals are quoted, other
    /// literals are emitted as typed, empty expression slots emit `null`.
    pub fn arg(&self, index: usize) -> String {
        let Some(param) = self.node.parameters().get(index) else {
            return "null".to_string();
        };
        match param.value() {
            ParameterValue::Literal(text) if param.expected_type().is_string() => java_string_literal(text),
            ParameterValue::Literal(text) => text.clone(),
            ParameterValue::Expression(Some(nested)) => self.tree.emit_source(*nested),
            ParameterValue::Expression(None) => "null".to_string(),
            ParameterValue::Choice { .. } => param.selected().unwrap_or_default().to_string(),
        }
    }

    /// Sources of parameters `from..`, comma separated.
    pub fn joined_args(&self, from: usize) -> String {
        (from..self.parameter_count())
            .map(|i| self.arg(i))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Concatenated source of the child sequence.
    pub fn child_source(&self) -> String {
        self.node
            .children()
            .iter()
            .map(|child| self.tree.emit_source(*child))
            .collect()
    }

    fn terminate(&self, expression: String) -> String {
        if self.definition().role() == BlockRole::Statement {
            expression + ";"
        } else {
            expression
        }
    }
}

pub fn java_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

pub fn first_argument(ctx: &EmitContext<'_>) -> String {
    ctx.arg(0)
}

/// Left fold: `(((a+b)+c)+d)`.
pub fn combine_strings(ctx: &EmitContext<'_>) -> String {
    let mut java = format!("({}+{})", ctx.arg(0), ctx.arg(1));
    for i in 2..ctx.parameter_count() {
        java = format!("({}+{})", java, ctx.arg(i));
    }
    java
}

pub fn negate_boolean(ctx: &EmitContext<'_>) -> String {
    format!("(!{})", ctx.arg(0))
}

pub fn colored_string(ctx: &EmitContext<'_>) -> String {
    format!("ChatColor.translateAlternateColorCodes('&',{})", ctx.arg(0))
}

pub fn directory_files(ctx: &EmitContext<'_>) -> String {
    format!("PluginMain.createList({}.listFiles())", ctx.arg(0))
}

pub fn new_config(_ctx: &EmitContext<'_>) -> String {
    "new org.bukkit.configuration.file.YamlConfiguration()".to_string()
}

pub fn event_instance(_ctx: &EmitContext<'_>) -> String {
    "event".to_string()
}

fn condition(ctx: &EmitContext<'_>) -> String {
    if ctx.arg(1) == "true" {
        format!("!{}", ctx.arg(0))
    } else {
        ctx.arg(0)
    }
}

pub fn if_statement(ctx: &EmitContext<'_>) -> String {
    format!("if ({}) {{{}}}", condition(ctx), ctx.child_source())
}

pub fn else_if_statement(ctx: &EmitContext<'_>) -> String {
    format!("else if ({}) {{{}}}", condition(ctx), ctx.child_source())
}

pub fn else_statement(ctx: &EmitContext<'_>) -> String {
    format!("else {{{}}}", ctx.child_source())
}

pub fn while_loop(ctx: &EmitContext<'_>) -> String {
    format!("while ({}) {{{}}}", ctx.arg(0), ctx.child_source())
}

fn member_class(ctx: &EmitContext<'_>) -> String {
    ctx.definition()
        .member()
        .map(|m| m.class.source_name())
        .unwrap_or_else(|| "Object".to_string())
}

fn member_name(ctx: &EmitContext<'_>) -> String {
    ctx.definition()
        .member()
        .and_then(|m| m.name.clone())
        .unwrap_or_default()
}

fn is_static_member(ctx: &EmitContext<'_>) -> bool {
    ctx.definition().member().map(|m| m.is_static).unwrap_or(false)
}

pub fn constructor(ctx: &EmitContext<'_>) -> String {
    format!("new {}({})", member_class(ctx), ctx.joined_args(0))
}

pub fn method_call(ctx: &EmitContext<'_>) -> String {
    let call = if is_static_member(ctx) {
        format!("{}.{}({})", member_class(ctx), member_name(ctx), ctx.joined_args(0))
    } else {
        format!("{}.{}({})", ctx.arg(0), member_name(ctx), ctx.joined_args(1))
    };
    ctx.terminate(call)
}

pub fn field_access(ctx: &EmitContext<'_>) -> String {
    if is_static_member(ctx) {
        format!("{}.{}", member_class(ctx), member_name(ctx))
    } else {
        format!("{}.{}", ctx.arg(0), member_name(ctx))
    }
}

pub fn event_handler(ctx: &EmitContext<'_>) -> String {
    let simple = ctx
        .definition()
        .member()
        .map(|m| m.class.simple_name())
        .unwrap_or_else(|| "Event".to_string());
    format!(
        "@EventHandler public void on{}{}({} event) {{{}}}",
        simple,
        ctx.id(),
        member_class(ctx),
        ctx.child_source()
    )
}

#[cfg(test)]
mod tests {
    use super::java_string_literal;

    #[test]
    fn string_literals_are_escaped() {
        assert_eq!(java_string_literal("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
        assert_eq!(java_string_literal(""), "\"\"");
    }
}
