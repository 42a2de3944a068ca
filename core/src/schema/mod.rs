//! file: core/src/schema/mod.rs
//! description: declarative description of the platform API.
//!
//! The catalog generator reads class and member declarations from `.api`
//! schema files instead of inspecting a running platform. Several files merge
//! into one `ApiSchema`; lookups by class name are what the generator and the
//! type hierarchy build on.

pub mod err;
pub mod model;
pub mod parser;

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::Path;

use log::{debug, warn};

use crate::error::{BlockwrightErrorExt, Level};
use crate::schema::err::{ResolutionError, SchemaError};

pub use model::{
    ApiClass, ApiConstructor, ApiField, ApiMethod, ApiParameter, ClassKind, Modifier, Modifiers, TypeRef,
    parameter_names,
};

#[derive(Debug, Clone, Default)]
pub struct ApiSchema {
    classes: BTreeMap<String, ApiClass>,
}

impl ApiSchema {
    pub fn new() -> Self {
        ApiSchema::default()
    }

    pub fn parse(source: &str, file: &str) -> Result<ApiSchema, Box<dyn BlockwrightErrorExt>> {
        let mut schema = ApiSchema::new();
        schema.add_source(source, file)?;
        Ok(schema)
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<ApiSchema, Box<dyn BlockwrightErrorExt>> {
        let mut schema = ApiSchema::new();
        schema.add_file(path)?;
        Ok(schema)
    }

    /// Merge every file matching `pattern` into one schema.
    pub fn load_glob(pattern: &str) -> Result<ApiSchema, Box<dyn BlockwrightErrorExt>> {
        let mut schema = ApiSchema::new();
        schema.add_glob(pattern)?;
        Ok(schema)
    }

    /// Merge every file matching `pattern`. Returns how many files were read.
    pub fn add_glob(&mut self, pattern: &str) -> Result<usize, Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.schema.add_glob";
        let paths = glob::glob(pattern)
            .map_err(|e| SchemaError::boxed(format!("Invalid schema pattern '{}': {}", pattern, e), ISSUER, None))?;
        let mut files = 0;
        for entry in paths {
            let path = entry.map_err(|e| SchemaError::boxed(format!("Unreadable schema path: {}", e), ISSUER, None))?;
            self.add_file(&path)?;
            files += 1;
        }
        if files == 0 {
            warn!("schema pattern '{}' matched no files", pattern);
        }
        Ok(files)
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            Box::new(SchemaError::with(
                Level::Critical,
                format!("read {}: {}", path.display(), e),
                "blockwright.schema.add_file",
                None,
                None,
            )) as Box<dyn BlockwrightErrorExt>
        })?;
        self.add_source(&source, &path.display().to_string())
    }

    /// Parse `source` and merge its classes. A class may only be declared once.
    pub fn add_source(&mut self, source: &str, file: &str) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        let classes = parser::parse_classes(source, file)?;
        debug!("parsed {} classes from {}", classes.len(), file);
        for class in classes {
            if let Some(existing) = self.classes.get(&class.name) {
                return Err(SchemaError::boxed(
                    format!("Class '{}' is already declared at {}", class.name, existing.location),
                    "blockwright.schema.add_source",
                    Some(class.location.clone()),
                ));
            }
            self.classes.insert(class.name.clone(), class);
        }
        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&ApiClass> {
        self.classes.get(name)
    }

    /// All classes ordered by name.
    pub fn classes(&self) -> impl Iterator<Item = &ApiClass> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Top-level classes declared directly in `package`.
    pub fn top_level_classes(&self, package: &str) -> Vec<&ApiClass> {
        self.classes
            .values()
            .filter(|c| c.is_top_level() && c.package() == package)
            .collect()
    }

    /// Member classes of `class`, each resolved independently.
    pub fn nested_classes(&self, class: &ApiClass) -> Vec<Result<&ApiClass, ResolutionError>> {
        class
            .nested
            .iter()
            .map(|name| self.class(name).ok_or_else(|| ResolutionError::new(name, &class.name)))
            .collect()
    }

    /// Whether `class` is `marker` or reaches it through superclasses and
    /// interfaces. Types missing from the schema end the walk on that branch.
    pub fn is_assignable(&self, marker: &str, class: &str) -> bool {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([class]);
        while let Some(current) = queue.pop_front() {
            if current == marker {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(declared) = self.class(current) {
                queue.extend(declared.superclass.as_deref());
                queue.extend(declared.interfaces.iter().map(String::as_str));
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
        public abstract class org.bukkit.event.Event { }
        public class org.bukkit.event.player.PlayerEvent extends org.bukkit.event.Event { }
        public class org.bukkit.event.player.PlayerJoinEvent extends org.bukkit.event.player.PlayerEvent {
            nested org.bukkit.event.player.PlayerJoinEvent$Missing;
        }
        public interface org.example.Loop extends org.example.Loop { }
    "#;

    #[test]
    fn assignability_walks_supertypes() {
        let schema = ApiSchema::parse(SOURCE, "events.api").unwrap();
        assert!(schema.is_assignable("org.bukkit.event.Event", "org.bukkit.event.player.PlayerJoinEvent"));
        assert!(!schema.is_assignable("org.bukkit.event.Event", "org.example.Loop"));
    }

    #[test]
    fn unresolved_nested_classes_are_reported_per_class() {
        let schema = ApiSchema::parse(SOURCE, "events.api").unwrap();
        let join = schema.class("org.bukkit.event.player.PlayerJoinEvent").unwrap();
        let nested = schema.nested_classes(join);
        assert_eq!(nested.len(), 1);
        assert_eq!(
            nested[0].as_ref().unwrap_err().class(),
            "org.bukkit.event.player.PlayerJoinEvent$Missing"
        );
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let mut schema = ApiSchema::parse("class a.B { }", "one.api").unwrap();
        assert!(schema.add_source("class a.B { }", "two.api").is_err());
    }

    #[test]
    fn top_level_classes_filter_by_package() {
        let schema = ApiSchema::parse(SOURCE, "events.api").unwrap();
        let names: Vec<&str> = schema
            .top_level_classes("org.bukkit.event.player")
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["org.bukkit.event.player.PlayerEvent", "org.bukkit.event.player.PlayerJoinEvent"]
        );
    }
}
