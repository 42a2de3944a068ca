//! file: core/src/catalog/entry.rs
//! description: one persisted catalog entry.

use serde::{Deserialize, Serialize};

/// What platform member an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Event,
    Constructor,
    Method,
    Field,
}

/// Absent keys are omitted on write; `static` is only written when true.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(rename = "static", default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(rename = "plugin-module", default, skip_serializing_if = "Option::is_none")]
    pub plugin_module: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl CatalogEntry {
    pub fn event(id: String, class: &str) -> Self {
        CatalogEntry { id, event: Some(class.to_string()), ..Default::default() }
    }

    pub fn constructor(id: String, class: &str, parameters: Vec<String>) -> Self {
        CatalogEntry { id, class: Some(class.to_string()), parameters, ..Default::default() }
    }

    pub fn method(
        id: String,
        class: &str,
        name: &str,
        parameters: Vec<String>,
        return_type: Option<String>,
        is_static: bool,
    ) -> Self {
        CatalogEntry {
            id,
            class: Some(class.to_string()),
            method: Some(name.to_string()),
            parameters,
            return_type,
            is_static,
            ..Default::default()
        }
    }

    pub fn field(id: String, class: &str, name: &str, field_type: String, is_static: bool) -> Self {
        CatalogEntry {
            id,
            class: Some(class.to_string()),
            field: Some(name.to_string()),
            return_type: Some(field_type),
            is_static,
            ..Default::default()
        }
    }

    pub fn with_plugin_module(mut self, module: Option<String>) -> Self {
        self.plugin_module = module;
        self
    }

    pub fn kind(&self) -> EntryKind {
        if self.event.is_some() {
            EntryKind::Event
        } else if self.method.is_some() {
            EntryKind::Method
        } else if self.field.is_some() {
            EntryKind::Field
        } else {
            EntryKind::Constructor
        }
    }
}
