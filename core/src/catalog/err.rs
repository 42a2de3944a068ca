use crate::error::{BlockwrightErrorExt, Level};
use crate::location::{Location, Span};

/// I/O or format failure while reading or writing the catalog stores.
#[derive(Debug, Clone)]
pub struct CatalogError {
    level: Level,
    message: String,
    issuer: String,
    path: Option<String>,
}

impl CatalogError {
    pub fn with(level: Level, message: String, issuer: &str, path: Option<String>) -> Self {
        CatalogError {
            level,
            message,
            issuer: issuer.to_string(),
            path,
        }
    }

    /// Critical error about `path`; generator runs stop on these.
    pub fn boxed(message: String, issuer: &str, path: &std::path::Path) -> Box<dyn BlockwrightErrorExt> {
        Box::new(Self::with(
            Level::Critical,
            message,
            issuer,
            Some(path.display().to_string()),
        ))
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for CatalogError {}

impl BlockwrightErrorExt for CatalogError {
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
        self.path.as_ref().map(|p| Location::new(p.clone(), 0, 0))
    }
}
