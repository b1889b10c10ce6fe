//! Flat CSS output

use std::fmt;

use crate::flatten::FlattenedRule;

impl fmt::Display for FlattenedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ {}; }}", self.selector, self.declaration_text())
    }
}

/// Render rules as flat CSS, one rule per line.
///
/// Rules without declarations produce nothing.
pub fn emit(rules: &[FlattenedRule]) -> String {
    rules
        .iter()
        .filter(|rule| !rule.declarations.is_empty())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
