use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_str = match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        };
        write!(f, "{}", level_str)
    }
}

/// Common surface of every error and diagnostic raised by the core.
///
/// `issuer` is a dotted path naming the component that raised it
/// (e.g. `blockwright.catalog.store`).
pub trait BlockwrightErrorExt {
    fn level(&self) -> Level;
    fn message(&self) -> String;
    fn issuer(&self) -> String;
    fn span(&self) -> Option<crate::location::Span>;
    fn location(&self) -> Option<crate::location::Location>;
}

impl fmt::Debug for dyn BlockwrightErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc_str = match self.location() {
            Some(loc) => loc.to_string(),
            None => "unknown".to_string(),
        };
        let span_str = match self.span() {
            Some(span) => span.to_string(),
            None => "span:none".to_string(),
        };

        write!(
            f,
            "BLOCKWRIGHT | {} | {} | {} | {} | {}",
            self.level(),
            loc_str,
            self.issuer(),
            span_str,
            self.message()
        )
    }
}

impl fmt::Display for dyn BlockwrightErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location() {
            Some(loc) => write!(f, "{}: {} (at {})", self.level(), self.message(), loc),
            None => write!(f, "{}: {}", self.level(), self.message()),
        }
    }
}

/// One-line report used by the CLI and log output.
pub fn generate_error_report(error: &dyn BlockwrightErrorExt) -> String {
    let location = match error.location() {
        Some(loc) => loc.to_string(),
        None => "unknown location".to_string(),
    };
    format!(
        "BLOCKWRIGHT | {} | {} | {} | {}",
        error.level(),
        location,
        error.issuer(),
        error.message()
    )
}

/// Returns the highest level among `errors`, if any.
pub fn worst_level(errors: &[Box<dyn BlockwrightErrorExt>]) -> Option<Level> {
    errors.iter().map(|e| e.level()).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    struct Sample;

    impl BlockwrightErrorExt for Sample {
        fn level(&self) -> Level {
            Level::Warning
        }
        fn message(&self) -> String {
            "something odd".into()
        }
        fn issuer(&self) -> String {
            "blockwright.test".into()
        }
        fn span(&self) -> Option<crate::location::Span> {
            None
        }
        fn location(&self) -> Option<Location> {
            Some(Location::new("a.api".into(), 3, 7))
        }
    }

    #[test]
    fn report_contains_level_location_and_issuer() {
        let report = generate_error_report(&Sample);
        assert_eq!(report, "BLOCKWRIGHT | WARNING | a.api:3:7 | blockwright.test | something odd");
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        let errors: Vec<Box<dyn BlockwrightErrorExt>> = vec![Box::new(Sample)];
        assert_eq!(worst_level(&errors), Some(Level::Warning));
        assert!(Level::Critical > Level::Error);
        assert_eq!(worst_level(&[]), None);
    }
}
