//! Stylenest CSS
//!
//! Flattens a nested stylesheet dialect into plain CSS.
//!
//! The dialect is CSS with arbitrarily nested blocks, `&` parent
//! references, and `//` or `/* */` comments:
//!
//! ```
//! let css = stylenest_css::process(".a { color: red; &:hover { color: blue; } }");
//! assert_eq!(css, ".a { color: red; }\n.a:hover { color: blue; }");
//! ```
//!
//! At-rule blocks are recognized and dropped. Malformed input never fails;
//! use [`flatten_with_diagnostics`] to see what was skipped.
//!
//! Deviations from plain brace-and-comment scanning:
//!
//! - [`flatten_with_diagnostics`] is opt-in. [`flatten`], [`process`] and
//!   [`StyleSheetSink::inject`] stay silent.
//! - `//` inside parentheses does not start a comment, so values such as
//!   `url(http://example.com/a.png)` survive.
//! - A `}` with no open block at the top level ends the pending selector
//!   text, which is dropped and reported as
//!   [`Diagnostic::StrayClosingBrace`].

mod declarations;
mod emit;
mod error;
mod flatten;
mod scanner;
mod sink;

pub use declarations::{extract_declarations, join_declarations};
pub use emit::emit;
pub use error::{Diagnostic, SourceLocation};
pub use flatten::{flatten, flatten_with_diagnostics, resolve_selector, Flattened, FlattenedRule};
pub use scanner::{find_matching_brace, strip_comments};
pub use sink::{new_shared_sink, SharedSink, StyleSheetSink, BASE_RESET, DEFAULT_SINK_KEY};

/// Flatten a nested stylesheet and render it as flat CSS
pub fn process(source: &str) -> String {
    emit(&flatten(source))
}

/// Wrap loose declarations in a block for one class
pub fn scoped_fragment(class: &str, declarations: &str) -> String {
    format!(".{} {{ {} }}", class, declarations.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_spec_examples() {
        assert_eq!(
            process(".a { color: red; .b { color: blue; } }"),
            ".a { color: red; }\n.a .b { color: blue; }"
        );
        assert_eq!(
            process(".a { &:hover { color: blue; } }"),
            ".a:hover { color: blue; }"
        );
        assert_eq!(process(".a { .b { .c { x: 1; } } }"), ".a .b .c { x: 1; }");
        assert_eq!(process(".a { color: red;"), "");
    }

    #[test]
    fn test_flat_sheet_is_noop_modulo_whitespace() {
        let css = "p {\n  color: red;\n}\n\ndiv {\n  margin: 0;\n  padding: 0;\n}";
        assert_eq!(
            process(css),
            "p { color: red; }\ndiv { margin: 0; padding: 0; }"
        );
    }

    #[test]
    fn test_scoped_fragment() {
        let fragment = scoped_fragment("btn-save", " color: red; padding: 4px; ");
        assert_eq!(fragment, ".btn-save { color: red; padding: 4px; }");
        assert_eq!(
            process(&fragment),
            ".btn-save { color: red; padding: 4px; }"
        );
    }
}
