//! Flattening diagnostics

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Source location in the dialect input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in characters)
    pub column: usize,
    /// Byte offset from start
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// Compute the location of a byte offset within `text`
    pub fn at(text: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for (index, c) in text.char_indices() {
            if index >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self::new(line, column, offset)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Something the flattener skipped or stopped on.
///
/// None of these abort flattening. Only [`Diagnostic::UnbalancedBraces`]
/// means output was cut short.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("Unbalanced braces: block opened at {location} is never closed")]
    UnbalancedBraces { location: SourceLocation },

    #[error("Discarded @{name} block at {location}")]
    AtRuleDiscarded {
        name: String,
        location: SourceLocation,
    },

    #[error("Empty selector at {location}")]
    EmptySelector { location: SourceLocation },

    #[error("Nested block without a selector at {location}")]
    DegenerateNestedSelector { location: SourceLocation },

    #[error("Stray '}}' at {location}")]
    StrayClosingBrace { location: SourceLocation },
}

impl Diagnostic {
    /// Get the source location of this diagnostic
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::UnbalancedBraces { location } => *location,
            Self::AtRuleDiscarded { location, .. } => *location,
            Self::EmptySelector { location } => *location,
            Self::DegenerateNestedSelector { location } => *location,
            Self::StrayClosingBrace { location } => *location,
        }
    }

    /// Whether flattening halted early because of this diagnostic
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnbalancedBraces { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new(10, 5, 100);
        assert_eq!(format!("{}", loc), "10:5");
    }

    #[test]
    fn test_location_at_offset() {
        let text = ".a {\n  color: red;\n}";
        let loc = SourceLocation::at(text, 7);
        assert_eq!(loc, SourceLocation::new(2, 3, 7));
    }

    #[test]
    fn test_location_counts_characters() {
        let text = "ä.b {";
        // 'ä' is two bytes but one column
        let loc = SourceLocation::at(text, 5);
        assert_eq!(loc.column, 5);
        assert_eq!(loc.line, 1);
    }

    #[test]
    fn test_diagnostic_display() {
        let loc = SourceLocation::new(1, 4, 3);
        let diag = Diagnostic::StrayClosingBrace { location: loc };
        assert_eq!(format!("{}", diag), "Stray '}' at 1:4");

        let diag = Diagnostic::AtRuleDiscarded {
            name: "media".to_string(),
            location: loc,
        };
        assert_eq!(format!("{}", diag), "Discarded @media block at 1:4");
    }

    #[test]
    fn test_only_unbalanced_is_fatal() {
        let loc = SourceLocation::default();
        assert!(Diagnostic::UnbalancedBraces { location: loc }.is_fatal());
        assert!(!Diagnostic::EmptySelector { location: loc }.is_fatal());
        assert!(!Diagnostic::DegenerateNestedSelector { location: loc }.is_fatal());
    }
}
