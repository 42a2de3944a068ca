//! file: core/src/blocks/definition.rs
//! description: immutable block templates.
//!
//! A `BlockDefinition` is the template every node of one block type is built
//! from: its stable id, kind, role, return type and parameter shape.
//! Definitions are created once (built-ins or catalog entries), shared by
//! `Arc`, and never mutated afterwards.

use crate::blocks::kind::{BlockKind, BlockRole};
use crate::blocks::parameter::{ParameterList, ParameterSpec};
use crate::catalog::{CatalogEntry, EntryKind, Localization};
use crate::types::TypeDescriptor;

/// Growth rule of a growable parameter list. Bounds count all parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Growth {
    pub spec: ParameterSpec,
    pub min: usize,
    pub max: usize,
}

/// Platform member a catalog-backed block calls into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub class: TypeDescriptor,
    /// Method or field name; `None` for constructors and events.
    pub name: Option<String>,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDefinition {
    id: String,
    kind: BlockKind,
    role: BlockRole,
    return_type: Option<TypeDescriptor>,
    category: Option<String>,
    title: Option<String>,
    parameter_labels: Vec<String>,
    parameters: Vec<ParameterSpec>,
    growth: Option<Growth>,
    member: Option<MemberRef>,
    plugin_module: Option<String>,
}

impl BlockDefinition {
    fn new(id: &str, kind: BlockKind, role: BlockRole, return_type: Option<TypeDescriptor>) -> Self {
        BlockDefinition {
            id: id.to_string(),
            kind,
            role,
            return_type,
            category: None,
            title: None,
            parameter_labels: Vec::new(),
            parameters: Vec::new(),
            growth: None,
            member: None,
            plugin_module: None,
        }
    }

    pub fn expression(id: &str, kind: BlockKind, return_type: TypeDescriptor) -> Self {
        Self::new(id, kind, BlockRole::Expression, Some(return_type))
    }

    pub fn statement(id: &str, kind: BlockKind) -> Self {
        Self::new(id, kind, BlockRole::Statement, None)
    }

    pub fn container(id: &str, kind: BlockKind) -> Self {
        Self::new(id, kind, BlockRole::Container, None)
    }

    pub fn with_parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Make the parameter list growable within `[min, max]` total parameters.
    pub fn with_growth(mut self, spec: ParameterSpec, min: usize, max: usize) -> Self {
        self.growth = Some(Growth { spec, min, max });
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_parameter_labels(mut self, labels: Vec<String>) -> Self {
        self.parameter_labels = labels;
        self
    }

    pub fn with_member(mut self, member: MemberRef) -> Self {
        self.member = Some(member);
        self
    }

    pub fn with_plugin_module(mut self, module: Option<String>) -> Self {
        self.plugin_module = module;
        self
    }

    /// Build the definition backing one catalog entry. Display strings come
    /// from the `<id>.title`, `<id>.category` and `<id>.parameters` labels.
    pub fn from_catalog_entry(entry: &CatalogEntry, labels: &Localization) -> Self {
        let class = entry
            .class
            .as_deref()
            .or(entry.event.as_deref())
            .map(TypeDescriptor::of)
            .unwrap_or_else(TypeDescriptor::object);
        let declared: Vec<ParameterSpec> = entry
            .parameters
            .iter()
            .map(|p| ParameterSpec::expression(TypeDescriptor::of(p.as_str())))
            .collect();
        let receiver = ParameterSpec::expression(class.clone());

        let mut def = match entry.kind() {
            EntryKind::Event => BlockDefinition::container(&entry.id, BlockKind::EventHandler).with_member(MemberRef {
                class: class.clone(),
                name: None,
                is_static: false,
            }),
            EntryKind::Constructor => {
                BlockDefinition::expression(&entry.id, BlockKind::Constructor, class.clone()).with_member(MemberRef {
                    class: class.clone(),
                    name: None,
                    is_static: false,
                })
            }
            EntryKind::Method => {
                let mut def = match &entry.return_type {
                    Some(ret) => BlockDefinition::expression(&entry.id, BlockKind::MethodCall, TypeDescriptor::of(ret.as_str())),
                    None => BlockDefinition::statement(&entry.id, BlockKind::MethodCall),
                };
                if !entry.is_static {
                    def = def.with_parameter(receiver.clone());
                }
                def.with_member(MemberRef {
                    class: class.clone(),
                    name: entry.method.clone(),
                    is_static: entry.is_static,
                })
            }
            EntryKind::Field => {
                let ret = entry
                    .return_type
                    .as_deref()
                    .map(TypeDescriptor::of)
                    .unwrap_or_else(TypeDescriptor::object);
                let mut def = BlockDefinition::expression(&entry.id, BlockKind::FieldAccess, ret);
                if !entry.is_static {
                    def = def.with_parameter(receiver.clone());
                }
                def.with_member(MemberRef {
                    class: class.clone(),
                    name: entry.field.clone(),
                    is_static: entry.is_static,
                })
            }
        };
        for spec in declared {
            def = def.with_parameter(spec);
        }

        let parameter_labels = labels
            .get(&format!("{}.parameters", entry.id))
            .map(|s| s.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        def.with_title(labels.get(&format!("{}.title", entry.id)).map(str::to_string))
            .with_category(labels.get(&format!("{}.category", entry.id)).map(str::to_string))
            .with_parameter_labels(parameter_labels)
            .with_plugin_module(entry.plugin_module.clone())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn role(&self) -> BlockRole {
        self.role
    }

    pub fn is_container(&self) -> bool {
        self.role == BlockRole::Container
    }

    pub fn return_type(&self) -> Option<&TypeDescriptor> {
        self.return_type.as_ref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Display title, falling back to the id.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    pub fn parameter_labels(&self) -> &[String] {
        &self.parameter_labels
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn growth(&self) -> Option<&Growth> {
        self.growth.as_ref()
    }

    pub fn member(&self) -> Option<&MemberRef> {
        self.member.as_ref()
    }

    pub fn plugin_module(&self) -> Option<&str> {
        self.plugin_module.as_deref()
    }

    /// Inclusive bounds on the parameter count of nodes built from this definition.
    pub fn parameter_bounds(&self) -> (usize, usize) {
        match &self.growth {
            Some(g) => (g.min.max(self.parameters.len()), g.max.max(g.min).max(self.parameters.len())),
            None => (self.parameters.len(), self.parameters.len()),
        }
    }

    /// Factory for a fresh node's parameters (growable lists filled to `min`).
    pub fn instantiate(&self) -> ParameterList {
        let items = self.parameters.iter().map(ParameterSpec::instantiate).collect();
        match &self.growth {
            Some(g) => ParameterList::growable(items, g.spec.clone(), g.min, g.max),
            None => ParameterList::fixed(items),
        }
    }
}
