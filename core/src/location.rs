//! Source positions inside schema files, attached to diagnostics.

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Location {
    /// File the position belongs to.
    pub file: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

impl Location {
    pub fn new(file: String, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }

    /// Start position of a parsed pair.
    pub fn of_pair<R: pest::RuleType>(pair: &pest::iterators::Pair<'_, R>, file: &str) -> Self {
        let (line, column) = pair.as_span().start_pos().line_col();
        Self::new(file.to_string(), line, column)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    /// Full extent of a parsed pair.
    pub fn of_pair<R: pest::RuleType>(pair: &pest::iterators::Pair<'_, R>, file: &str) -> Self {
        let span = pair.as_span();
        let (start_line, start_col) = span.start_pos().line_col();
        let (end_line, end_col) = span.end_pos().line_col();
        Self {
            start: Location::new(file.to_string(), start_line, start_col),
            end: Location::new(file.to_string(), end_line, end_col),
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}
