use crate::error::{BlockwrightErrorExt, Level};
use crate::location::{Location, Span};

/// Malformed schema text or an inconsistent declaration.
#[derive(Debug, Clone)]
pub struct SchemaError {
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl SchemaError {
    pub fn with(level: Level, message: String, issuer: &str, location: Option<Location>, span: Option<Span>) -> Self {
        SchemaError {
            level,
            message,
            issuer: issuer.to_string(),
            location,
            span,
        }
    }

    pub fn boxed(message: String, issuer: &str, location: Option<Location>) -> Box<dyn BlockwrightErrorExt> {
        Box::new(Self::with(Level::Error, message, issuer, location, None))
    }
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(loc) = &self.location {
            write!(f, "{} (at {}:{}:{})", self.message, loc.file, loc.line, loc.column)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for SchemaError {}

impl BlockwrightErrorExt for SchemaError {
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
        self.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

/// A class referenced by the schema that is not declared anywhere in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionError {
    class: String,
    referenced_by: String,
}

impl ResolutionError {
    pub fn new(class: &str, referenced_by: &str) -> Self {
        ResolutionError {
            class: class.to_string(),
            referenced_by: referenced_by.to_string(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }
}

impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Class '{}' referenced by '{}' is not declared", self.class, self.referenced_by)
    }
}

impl std::error::Error for ResolutionError {}

impl BlockwrightErrorExt for ResolutionError {
    fn level(&self) -> Level {
        Level::Warning
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "blockwright.schema.resolve".to_string()
    }

    fn span(&self) -> Option<Span> {
        None
    }

    fn location(&self) -> Option<Location> {
        None
    }
}
