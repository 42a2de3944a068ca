//! file: core/src/config.rs
//! description: catalog generator configuration and the batch run driven by it.
//!
//! The configuration is a JSON file. Relative paths inside it resolve against
//! the directory of the file itself, so a config can live next to its schemas
//! and output.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::catalog::{BlockGenerator, DEFAULT_EVENT_MARKER, GenerationReport};
use crate::error::{BlockwrightErrorExt, Level};
use crate::location::{Location, Span};
use crate::program::PluginModule;
use crate::schema::ApiSchema;

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_blocks_file() -> String {
    "blocks.json".to_string()
}

fn default_lang_file() -> String {
    "lang.properties".to_string()
}

fn default_event_marker() -> String {
    DEFAULT_EVENT_MARKER.to_string()
}

/// One generator pass: a package and/or explicit classes, with the category
/// and plugin module applied to everything it adds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorJob {
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Matched case-insensitively. Entries are written with the upper-case
    /// tag, so the legacy `PlACEHOLDERAPI` spelling comes out as `PLACEHOLDERAPI`.
    #[serde(default)]
    pub plugin_module: Option<String>,
}

impl GeneratorJob {
    /// The tag stamped on this job's entries, in its canonical spelling.
    pub fn plugin_module_tag(&self) -> Option<&str> {
        self.plugin_module
            .as_deref()
            .map(|tag| PluginModule::from_tag(tag).map(PluginModule::tag).unwrap_or(tag))
    }

    /// Short label for progress output.
    pub fn describe(&self) -> String {
        match (&self.package, self.classes.len()) {
            (Some(package), 0) => package.clone(),
            (Some(package), n) => format!("{} (+{} classes)", package, n),
            (None, 1) => self.classes[0].clone(),
            (None, n) => format!("{} classes", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_blocks_file")]
    pub blocks_file: String,
    #[serde(default = "default_lang_file")]
    pub lang_file: String,
    #[serde(default)]
    pub schemas: Vec<String>,
    #[serde(default = "default_event_marker")]
    pub event_marker: String,
    #[serde(default)]
    pub blacklist: Vec<String>,
    #[serde(default)]
    pub jobs: Vec<GeneratorJob>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            output_dir: default_output_dir(),
            blocks_file: default_blocks_file(),
            lang_file: default_lang_file(),
            schemas: Vec::new(),
            event_marker: default_event_marker(),
            blacklist: Vec::new(),
            jobs: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<GeneratorConfig, Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.config.load_from_file";
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::boxed(format!("read config: {}", e), ISSUER, Some(path)))?;
        let mut config: GeneratorConfig = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::boxed(format!("parse config: {}", e), ISSUER, Some(path)))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Make the output directory and schema patterns relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.output_dir.is_relative() {
            self.output_dir = base.join(&self.output_dir);
        }
        for pattern in &mut self.schemas {
            if Path::new(pattern.as_str()).is_relative() {
                *pattern = base.join(pattern.as_str()).to_string_lossy().into_owned();
            }
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn BlockwrightErrorExt>> {
        const ISSUER: &str = "blockwright.config.validate";
        for (index, job) in self.jobs.iter().enumerate() {
            if job.package.is_none() && job.classes.is_empty() {
                return Err(ConfigError::boxed(
                    format!("job {} names neither a package nor classes", index + 1),
                    ISSUER,
                    None,
                ));
            }
            if let Some(tag) = &job.plugin_module {
                if PluginModule::from_tag(tag).is_none() {
                    return Err(ConfigError::boxed(
                        format!("job {} uses unknown plugin module '{}'", index + 1, tag),
                        ISSUER,
                        None,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Every schema pattern merged into one schema.
    pub fn load_schema(&self) -> Result<ApiSchema, Box<dyn BlockwrightErrorExt>> {
        let mut schema = ApiSchema::new();
        for pattern in &self.schemas {
            schema.add_glob(pattern)?;
        }
        Ok(schema)
    }
}

/// Run every job and write both stores once at the end.
pub fn run_generator(config: &GeneratorConfig) -> Result<GenerationReport, Box<dyn BlockwrightErrorExt>> {
    run_generator_with(config, |_, _, _| {})
}

/// Like `run_generator`, calling `on_job(index, job, entries_added)` after each job.
pub fn run_generator_with<F>(config: &GeneratorConfig, mut on_job: F) -> Result<GenerationReport, Box<dyn BlockwrightErrorExt>>
where
    F: FnMut(usize, &GeneratorJob, usize),
{
    let schema = config.load_schema()?;
    info!("schema has {} classes", schema.len());
    let mut generator = BlockGenerator::new(&config.output_dir, &config.blocks_file, &config.lang_file)?;
    generator.set_event_marker(&config.event_marker);
    for entry in &config.blacklist {
        generator.add_to_blacklist(entry);
    }

    for (index, job) in config.jobs.iter().enumerate() {
        if let Some(category) = &job.category {
            generator.set_category(category);
        }
        if let Some(tag) = job.plugin_module_tag() {
            generator.set_plugin_module(tag);
        }
        let mut added = 0;
        if let Some(package) = &job.package {
            added += generator.generate(&schema, package);
        }
        for class in &job.classes {
            match generator.generate_class(&schema, class) {
                Ok(n) => added += n,
                Err(e) => log::warn!("{}", e.message()),
            }
        }
        generator.reset();
        on_job(index, job, added);
    }

    generator.write_files()?;
    Ok(generator.report())
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    level: Level,
    message: String,
    issuer: String,
    path: Option<String>,
}

impl ConfigError {
    pub fn with(level: Level, message: String, issuer: &str, path: Option<String>) -> Self {
        ConfigError {
            level,
            message,
            issuer: issuer.to_string(),
            path,
        }
    }

    pub fn boxed(message: String, issuer: &str, path: Option<&Path>) -> Box<dyn BlockwrightErrorExt> {
        Box::new(Self::with(
            Level::Critical,
            message,
            issuer,
            path.map(|p| p.display().to_string()),
        ))
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl BlockwrightErrorExt for ConfigError {
    fn level(&self) -> Level {
        self.level
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        self.issuer.clone()
    }

    fn span(&self) -> Option<Span> {
        None
    }

    fn location(&self) -> Option<Location> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"jobs":[{"package":"org.example"}]}"#).unwrap();
        assert_eq!(config.blocks_file, "blocks.json");
        assert_eq!(config.lang_file, "lang.properties");
        assert_eq!(config.event_marker, "org.bukkit.event.Event");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let mut config = GeneratorConfig {
            output_dir: PathBuf::from("out"),
            schemas: vec!["api/*.api".to_string()],
            ..GeneratorConfig::default()
        };
        config.resolve_paths(Path::new("/work"));
        assert_eq!(config.output_dir, PathBuf::from("/work/out"));
        assert_eq!(config.schemas[0], "/work/api/*.api");
    }

    #[test]
    fn unknown_plugin_modules_are_rejected() {
        let config = GeneratorConfig {
            jobs: vec![GeneratorJob {
                package: Some("a".into()),
                plugin_module: Some("NOPE".into()),
                ..GeneratorJob::default()
            }],
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn plugin_module_tags_are_written_upper_case() {
        let job = GeneratorJob {
            package: Some("a".into()),
            plugin_module: Some("PlACEHOLDERAPI".into()),
            ..GeneratorJob::default()
        };
        assert_eq!(job.plugin_module_tag(), Some("PLACEHOLDERAPI"));
        assert_eq!(GeneratorJob::default().plugin_module_tag(), None);
    }
}
