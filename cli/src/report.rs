/// cli/src/report.rs
/// Terminal output for the CLI
/// description: styled diagnostic lines, summary and catalog tables, and the
/// per-job progress bar of the generate command.

use blockwright_core::{BlockwrightErrorExt, CatalogEntry, GenerationReport, Level, Localization};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

/// Styles used for every line the CLI prints.
pub struct FormatStyle {
    pub title: Style,
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    pub success: Style,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            title: Style::new().bold().underlined(),
            info: Style::new().cyan(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            success: Style::new().green().bold(),
        }
    }
}

impl FormatStyle {
    pub fn for_level(&self, level: Level) -> &Style {
        match level {
            Level::Info => &self.info,
            Level::Warning => &self.warning,
            Level::Error | Level::Critical => &self.error,
        }
    }

    /// `LEVEL issuer: message` with the level colored.
    pub fn diagnostic(&self, error: &dyn BlockwrightErrorExt) -> String {
        let level = error.level();
        let location = error.location().map(|l| format!(" ({})", l)).unwrap_or_default();
        format!(
            "{} {}: {}{}",
            self.for_level(level).apply_to(level),
            error.issuer(),
            error.message(),
            location
        )
    }
}

/// Progress bar advanced once per generator job.
pub fn job_progress(jobs: usize) -> ProgressBar {
    let bar = ProgressBar::new(jobs as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("█▒░"));
    }
    bar
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn summary_table(report: &GenerationReport) -> Table {
    let mut table = new_table(vec!["Classes scanned", "Classes skipped", "Entries added", "Labels added"]);
    table.add_row(vec![
        report.classes_scanned.to_string(),
        report.classes_skipped.to_string(),
        report.entries_added.to_string(),
        report.labels_added.to_string(),
    ]);
    table
}

/// Whether `entry` or its title contains `filter`, ignoring case.
pub fn matches_filter(entry: &CatalogEntry, labels: &Localization, filter: &str) -> bool {
    let needle = filter.to_lowercase();
    let title = labels.get(&format!("{}.title", entry.id)).unwrap_or_default();
    [
        Some(entry.id.as_str()),
        Some(title),
        entry.class.as_deref(),
        entry.event.as_deref(),
        entry.method.as_deref(),
        entry.field.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|text| text.to_lowercase().contains(&needle))
}

/// One listed catalog entry, as shown in the table or written as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogRow {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub owner: String,
    pub member: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

impl CatalogRow {
    pub fn new(entry: &CatalogEntry, labels: &Localization) -> Self {
        CatalogRow {
            id: entry.id.clone(),
            kind: format!("{:?}", entry.kind()),
            title: labels.get(&format!("{}.title", entry.id)).unwrap_or("").to_string(),
            owner: entry.class.as_deref().or(entry.event.as_deref()).unwrap_or("").to_string(),
            member: entry.method.as_deref().or(entry.field.as_deref()).unwrap_or("").to_string(),
            module: entry.plugin_module.clone(),
        }
    }
}

pub fn catalog_table(rows: &[CatalogRow]) -> Table {
    let mut table = new_table(vec!["Id", "Kind", "Title", "Type", "Member", "Module"]);
    for row in rows {
        table.add_row(vec![
            row.id.clone(),
            row.kind.clone(),
            row.title.clone(),
            row.owner.clone(),
            row.member.clone(),
            row.module.clone().unwrap_or_default(),
        ]);
    }
    table
}
