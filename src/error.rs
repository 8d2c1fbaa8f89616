use thiserror::Error;

use crate::scan;

/// Crate-level error returned by [`crate::Toolkit`] and its builder.
#[derive(Debug, Error)]
pub enum Error {
    #[error("path data: {0}")]
    Path(#[from] PathParseError),
    #[error("colour: {0}")]
    Colour(#[from] ColourParseError),
    #[error("stylesheet: {0}")]
    Css(#[from] CssParseError),
    #[error("style property: {0}")]
    Property(#[from] StylePropertyError),
    #[error("scan: {0}")]
    Scan(#[from] ScanError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanError {
    /// `offset` points at the opening `/*`.
    #[error("unterminated comment opened at offset {offset}")]
    UnterminatedComment { offset: usize },
}

impl ScanError {
    pub fn offset(&self) -> usize {
        match self {
            ScanError::UnterminatedComment { offset } => *offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathErrorKind {
    #[error("path data contains no operands")]
    NoOperands,
    #[error("path data must begin with a moveto")]
    MissingMoveAtStart,
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("operand '{operand}' takes {expected} parameters but {found} were given")]
    TooFewParameters {
        operand: char,
        expected: usize,
        found: usize,
    },
    #[error("bad parameter {index} '{text}'")]
    BadParameter { index: usize, text: String },
    #[error("unterminated comment")]
    UnterminatedComment,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at offset {offset}")]
pub struct PathParseError {
    pub kind: PathErrorKind,
    pub offset: usize,
}

impl PathParseError {
    pub(crate) fn new(kind: PathErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    pub fn describe(&self, source: &str) -> String {
        format!("{}, {}", self.kind, scan::diagnostic(source, self.offset))
    }
}

impl From<ScanError> for PathParseError {
    fn from(value: ScanError) -> Self {
        PathParseError::new(PathErrorKind::UnterminatedComment, value.offset())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColourErrorKind {
    #[error("unexpected character in '{0}'")]
    UnexpectedCharacter(String),
    #[error("incomplete colour '{0}'")]
    Incomplete(String),
    #[error("unknown colour '{0}'")]
    Unknown(String),
    #[error("value out of range in '{0}'")]
    BadRange(String),
}

/// `offset` indexes the trimmed, lowercased colour text the parsers see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct ColourParseError {
    pub kind: ColourErrorKind,
    pub offset: usize,
}

impl ColourParseError {
    pub(crate) fn unexpected(context: &str, offset: usize) -> Self {
        Self {
            kind: ColourErrorKind::UnexpectedCharacter(context.to_string()),
            offset,
        }
    }

    pub(crate) fn incomplete(context: &str, offset: usize) -> Self {
        Self {
            kind: ColourErrorKind::Incomplete(context.to_string()),
            offset,
        }
    }

    pub(crate) fn unknown(context: &str, offset: usize) -> Self {
        Self {
            kind: ColourErrorKind::Unknown(context.to_string()),
            offset,
        }
    }

    pub(crate) fn bad_range(context: &str, offset: usize) -> Self {
        Self {
            kind: ColourErrorKind::BadRange(context.to_string()),
            offset,
        }
    }

    pub fn describe(&self, source: &str) -> String {
        format!("{}, {}", self.kind, scan::diagnostic(source.trim(), self.offset))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StylePropertyErrorKind {
    #[error("empty value")]
    Empty,
    #[error("unexpected '{0}'")]
    UnexpectedCharacter(String),
    #[error("bad colour: {0}")]
    BadColour(#[source] ColourParseError),
    #[error("unknown keyword '{0}'")]
    UnknownKeyword(String),
    #[error("font shorthand is missing a size")]
    MissingFontSize,
    #[error("font shorthand is missing a family")]
    MissingFontFamily,
    #[error("unterminated quoted string")]
    NonMatchingQuote,
}

/// `offset` indexes the raw property value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at offset {offset}")]
pub struct StylePropertyError {
    pub kind: StylePropertyErrorKind,
    pub offset: usize,
}

impl StylePropertyError {
    pub(crate) fn new(kind: StylePropertyErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CssErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unexpected end of stylesheet")]
    UnexpectedEnd,
    #[error("unexpected ':'")]
    UnexpectedColon,
    #[error("unexpected ';'")]
    UnexpectedSemiColon,
    #[error("rule has no selectors")]
    NoSelectors,
    #[error("empty selector between commas")]
    ExtraCommas,
    #[error("unterminated quoted string")]
    NonMatchingQuote,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("incomplete !important")]
    IncompleteImportant,
    #[error("bad value for '{key}': {source}")]
    BadProperty {
        key: String,
        source: StylePropertyError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at offset {offset}")]
pub struct CssParseError {
    pub kind: CssErrorKind,
    pub offset: usize,
}

impl CssParseError {
    pub(crate) fn new(kind: CssErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    pub fn describe(&self, source: &str) -> String {
        format!("{}, {}", self.kind, scan::diagnostic(source, self.offset))
    }
}

impl From<ScanError> for CssParseError {
    fn from(value: ScanError) -> Self {
        CssParseError::new(CssErrorKind::UnterminatedComment, value.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_error_wraps_subsystem_errors() {
        let err: Error = PathParseError::new(PathErrorKind::NoOperands, 0).into();
        assert!(matches!(err, Error::Path(_)));
        assert_eq!(
            err.to_string(),
            "path data: path data contains no operands at offset 0"
        );
    }

    #[test]
    fn bad_property_exposes_its_source() {
        use std::error::Error as _;
        let inner = StylePropertyError::new(StylePropertyErrorKind::Empty, 0);
        let err = CssParseError::new(
            CssErrorKind::BadProperty {
                key: "color".to_string(),
                source: inner.clone(),
            },
            12,
        );
        let source = err.kind.source().expect("source");
        assert_eq!(source.to_string(), inner.to_string());
    }

    #[test]
    fn describe_renders_line_and_snippet() {
        let err = PathParseError::new(PathErrorKind::UnexpectedCharacter('#'), 10);
        let text = err.describe("M0 0\nL1 1 #");
        assert!(text.contains("line 2"), "{text}");
        assert!(text.contains(">>> #"), "{text}");
    }
}
