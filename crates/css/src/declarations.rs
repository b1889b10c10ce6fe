//! Declaration extraction
//!
//! Separates a block's own declarations from the nested blocks inside it.

use crate::scanner::{Event, Events, ScanMode};

/// Extract a block's own declarations, excising every nested block
/// however deep.
///
/// Returns the trimmed, non-empty `prop: value` strings in source order.
pub fn extract_declarations(content: &str) -> Vec<String> {
    let mut events = Events::new(content);
    let mut declarations = Vec::new();
    let mut depth = 0usize;

    while let Some(event) = events.next_event(ScanMode::Nested) {
        match event {
            Event::Text { text, .. } if depth == 0 => declarations.push(text.into_owned()),
            Event::Text { .. } => {}
            Event::Open { .. } => depth += 1,
            // a stray `}` only ends the declaration before it
            Event::Close { .. } => depth = depth.saturating_sub(1),
        }
    }

    declarations
}

/// Join declarations the way they are emitted: `"a: 1; b: 2"`
pub fn join_declarations(declarations: &[String]) -> String {
    declarations.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_declarations() {
        let decls = extract_declarations(" color: red; font-size: 16px; ");
        assert_eq!(decls, vec!["color: red", "font-size: 16px"]);
    }

    #[test]
    fn test_missing_final_semicolon() {
        let decls = extract_declarations("color: red; margin: 0");
        assert_eq!(decls, vec!["color: red", "margin: 0"]);
    }

    #[test]
    fn test_empty_pieces_dropped() {
        let decls = extract_declarations(" ;; color: red ;  ; ");
        assert_eq!(decls, vec!["color: red"]);
    }

    #[test]
    fn test_nested_block_excised() {
        let decls = extract_declarations("color: red; .b { color: blue; } margin: 0;");
        assert_eq!(decls, vec!["color: red", "margin: 0"]);
    }

    #[test]
    fn test_doubly_nested_excised() {
        let decls = extract_declarations(" .b { .c { x: 1; } y: 2; } ");
        assert!(decls.is_empty());
    }

    #[test]
    fn test_selector_boundary_without_semicolon() {
        // Without a `;`, the text before the block belongs to its selector
        let decls = extract_declarations("color: red .b { x: 1; }");
        assert!(decls.is_empty());
    }

    #[test]
    fn test_comment_hides_semicolon_and_braces() {
        let decls = extract_declarations("color: red /* ; { } */; // a; b {\n margin: 0;");
        assert_eq!(decls, vec!["color: red", "margin: 0"]);
    }

    #[test]
    fn test_value_with_url_kept() {
        let decls = extract_declarations("background: url(http://example.com/bg.png);");
        assert_eq!(decls, vec!["background: url(http://example.com/bg.png)"]);
    }

    #[test]
    fn test_parent_reference_block_excised() {
        let decls = extract_declarations("a: 1; .x { b: 2; } &:hover { c: 3; } d: 4");
        assert_eq!(decls, vec!["a: 1", "d: 4"]);
    }

    #[test]
    fn test_stray_close_is_a_boundary() {
        let decls = extract_declarations("x: 1 } y: 2");
        assert_eq!(decls, vec!["x: 1", "y: 2"]);
    }

    #[test]
    fn test_unclosed_block_hides_the_rest() {
        let decls = extract_declarations("x: 1; .b { y: 2; z: 3");
        assert_eq!(decls, vec!["x: 1"]);
    }

    #[test]
    fn test_join() {
        let decls = vec!["a: 1".to_string(), "b: 2".to_string()];
        assert_eq!(join_declarations(&decls), "a: 1; b: 2");
    }
}
