//! file: core/src/catalog/generator.rs
//! description: walks an API schema and appends catalog entries and labels.
//!
//! The generator is a one-shot batch: load both stores, walk the requested
//! packages and classes, then write both files once. Entries are keyed by
//! the hash of the member's reflective signature, so re-running over the
//! same schema adds nothing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::catalog::entry::CatalogEntry;
use crate::catalog::err::CatalogError;
use crate::catalog::hash::hash;
use crate::catalog::store::{Catalog, Localization};
use crate::error::BlockwrightErrorExt;
use crate::schema::err::ResolutionError;
use crate::schema::{ApiClass, ApiParameter, ApiSchema, parameter_names};

pub const DEFAULT_EVENT_MARKER: &str = "org.bukkit.event.Event";

/// Counters for one generator instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub classes_scanned: usize,
    pub classes_skipped: usize,
    pub entries_added: usize,
    pub labels_added: usize,
}

pub struct BlockGenerator {
    directory: PathBuf,
    blocks_path: PathBuf,
    lang_path: PathBuf,
    catalog: Catalog,
    localization: Localization,
    blacklist: HashSet<String>,
    category: Option<String>,
    plugin_module: Option<String>,
    event_marker: String,
    visited: HashSet<String>,
    report: GenerationReport,
}

impl BlockGenerator {
    /// Open the stores `blocks_file` and `lang_file` inside `directory`.
    /// Missing files start empty; unreadable ones are an error.
    pub fn new<P: AsRef<Path>>(directory: P, blocks_file: &str, lang_file: &str) -> Result<Self, Box<dyn BlockwrightErrorExt>> {
        let directory = directory.as_ref().to_path_buf();
        let blocks_path = directory.join(blocks_file);
        let lang_path = directory.join(lang_file);
        let catalog = Catalog::load(&blocks_path)?;
        let localization = Localization::load(&lang_path)?;
        info!(
            "loaded {} catalog entries and {} labels from {}",
            catalog.len(),
            localization.len(),
            directory.display()
        );
        Ok(BlockGenerator {
            directory,
            blocks_path,
            lang_path,
            catalog,
            localization,
            blacklist: HashSet::new(),
            category: None,
            plugin_module: None,
            event_marker: DEFAULT_EVENT_MARKER.to_string(),
            visited: HashSet::new(),
            report: GenerationReport::default(),
        })
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = Some(category.to_string());
    }

    pub fn set_plugin_module(&mut self, module: &str) {
        self.plugin_module = Some(module.to_string());
    }

    /// Skip a class (`class a.b.C`), member (reflective signature) or method name.
    pub fn add_to_blacklist(&mut self, entry: &str) {
        self.blacklist.insert(entry.to_string());
    }

    pub fn set_event_marker(&mut self, marker: &str) {
        self.event_marker = marker.to_string();
    }

    /// Clear the category and plugin module of the previous job.
    pub fn reset(&mut self) {
        self.category = None;
        self.plugin_module = None;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn localization(&self) -> &Localization {
        &self.localization
    }

    pub fn report(&self) -> GenerationReport {
        self.report
    }

    /// Every top-level class of `package`, then its member classes.
    /// Returns the number of entries added.
    pub fn generate(&mut self, schema: &ApiSchema, package: &str) -> usize {
        let before = self.report.entries_added;
        let classes = schema.top_level_classes(package);
        if classes.is_empty() {
            warn!("no classes declared in package '{}'", package);
        }
        let mut walked = HashSet::new();
        for class in classes {
            self.generate_package_class(schema, class, &mut walked);
        }
        let added = self.report.entries_added - before;
        info!("package {}: {} new entries", package, added);
        added
    }

    fn generate_package_class<'s>(&mut self, schema: &'s ApiSchema, class: &'s ApiClass, walked: &mut HashSet<&'s str>) {
        if !walked.insert(class.name.as_str()) {
            return;
        }
        if class.anonymous || class.deprecated || self.blacklist.contains(&class.signature()) {
            debug!("skipping class {}", class.name);
            self.report.classes_skipped += 1;
        } else {
            self.generate_members(schema, class);
        }
        for nested in schema.nested_classes(class) {
            match nested {
                Ok(nested) => self.generate_package_class(schema, nested, walked),
                Err(e) => {
                    warn!("{}", e);
                    self.report.classes_skipped += 1;
                }
            }
        }
    }

    /// A single named class, without the package-level class filters.
    pub fn generate_class(&mut self, schema: &ApiSchema, name: &str) -> Result<usize, Box<dyn BlockwrightErrorExt>> {
        let class = schema
            .class(name)
            .ok_or_else(|| Box::new(ResolutionError::new(name, "generator job")) as Box<dyn BlockwrightErrorExt>)?;
        let before = self.report.entries_added;
        self.generate_members(schema, class);
        Ok(self.report.entries_added - before)
    }

    fn generate_members(&mut self, schema: &ApiSchema, class: &ApiClass) {
        if !self.visited.insert(class.name.clone()) {
            return;
        }
        self.report.classes_scanned += 1;

        if schema.is_assignable(&self.event_marker, &class.name) {
            let entry = CatalogEntry::event(hash(&class.signature()), &class.name)
                .with_plugin_module(self.plugin_module.clone());
            self.add_entry(entry);
            return;
        }

        let simple = class.simple_name().to_string();

        for constructor in &class.constructors {
            let signature = class.constructor_signature(constructor);
            if !constructor.modifiers.is_public() || constructor.deprecated || self.blacklist.contains(&signature) {
                continue;
            }
            let id = hash(&signature);
            let entry = CatalogEntry::constructor(id.clone(), &class.name, binary_names(&constructor.parameters))
                .with_plugin_module(self.plugin_module.clone());
            // constructor blocks have no receiver slot, so no class name label
            if self.add_entry(entry) && !constructor.parameters.is_empty() {
                self.put_label(&format!("{}.parameters", id), &parameter_names(&constructor.parameters).join(","));
            }
            self.put_common_labels(&id, &format!("New {}", simple));
        }

        for method in &class.methods {
            let signature = class.method_signature(method);
            if !method.modifiers.is_public()
                || method.deprecated
                || self.blacklist.contains(&signature)
                || self.blacklist.contains(&method.name)
            {
                continue;
            }
            let id = hash(&signature);
            let is_static = method.modifiers.is_static();
            let return_type = (!method.return_type.is_void()).then(|| method.return_type.binary_name());
            let entry = CatalogEntry::method(
                id.clone(),
                &class.name,
                &method.name,
                binary_names(&method.parameters),
                return_type,
                is_static,
            )
            .with_plugin_module(self.plugin_module.clone());
            if self.add_entry(entry) && (!is_static || !method.parameters.is_empty()) {
                let mut names = Vec::new();
                if !is_static {
                    names.push(simple.clone());
                }
                names.extend(parameter_names(&method.parameters));
                self.put_label(&format!("{}.parameters", id), &names.join(","));
            }
            self.put_common_labels(&id, &format!("{}_{}", simple, method.name));
        }

        for field in &class.fields {
            let signature = class.field_signature(field);
            if !field.modifiers.is_public() || field.deprecated || self.blacklist.contains(&signature) {
                continue;
            }
            let id = hash(&signature);
            let is_static = field.modifiers.is_static();
            let entry = CatalogEntry::field(id.clone(), &class.name, &field.name, field.type_ref.binary_name(), is_static)
                .with_plugin_module(self.plugin_module.clone());
            if self.add_entry(entry) && !is_static {
                self.put_label(&format!("{}.parameters", id), &simple);
            }
            self.put_common_labels(&id, &format!("{}_{}", simple, field.name));
        }
    }

    fn add_entry(&mut self, entry: CatalogEntry) -> bool {
        let id = entry.id.clone();
        let added = self.catalog.insert_if_absent(entry);
        if added {
            debug!("new catalog entry {}", id);
            self.report.entries_added += 1;
        }
        added
    }

    fn put_label(&mut self, key: &str, value: &str) {
        if self.localization.put_if_absent(key, value) {
            self.report.labels_added += 1;
        }
    }

    fn put_common_labels(&mut self, id: &str, title: &str) {
        self.put_label(&format!("{}.title", id), title);
        if let Some(category) = self.category.clone() {
            self.put_label(&format!("{}.category", id), &category);
        }
    }

    /// Create the output directory if needed and write both stores.
    pub fn write_files(&self) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        std::fs::create_dir_all(&self.directory).map_err(|e| {
            CatalogError::boxed(
                format!("create directory: {}", e),
                "blockwright.catalog.generator.write_files",
                &self.directory,
            )
        })?;
        self.catalog.write(&self.blocks_path)?;
        self.localization.write(&self.lang_path)?;
        info!(
            "wrote {} entries to {} and {} labels to {}",
            self.catalog.len(),
            self.blocks_path.display(),
            self.localization.len(),
            self.lang_path.display()
        );
        Ok(())
    }
}

fn binary_names(parameters: &[ApiParameter]) -> Vec<String> {
    parameters.iter().map(|p| p.type_ref.binary_name()).collect()
}
