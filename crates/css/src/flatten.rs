//! Nested rule flattening
//!
//! Walks a stylesheet once, discards at-rules, and resolves nested
//! selectors into a flat, ordered rule list. Open blocks live on an
//! explicit stack, so nesting depth is bounded only by memory.

use std::borrow::Cow;

use log::{debug, warn};
use serde::Serialize;

use crate::declarations::join_declarations;
use crate::error::{Diagnostic, SourceLocation};
use crate::scanner::{Event, Events, ScanMode};

/// A fully resolved selector and the declarations written directly in its
/// block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlattenedRule {
    /// Selector with every `&` resolved
    pub selector: String,
    /// `prop: value` strings in source order
    pub declarations: Vec<String>,
}

impl FlattenedRule {
    pub fn new(selector: impl Into<String>, declarations: Vec<String>) -> Self {
        Self {
            selector: selector.into(),
            declarations,
        }
    }

    /// Declarations joined with `"; "`
    pub fn declaration_text(&self) -> String {
        join_declarations(&self.declarations)
    }
}

/// Rules plus everything skipped or stopped on along the way
#[derive(Debug, Clone, Default, Serialize)]
pub struct Flattened {
    /// Rules in pre-order: a block's own rule precedes its descendants'
    pub rules: Vec<FlattenedRule>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Flattened {
    /// True unless scanning stopped at an unclosed block
    pub fn is_complete(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_fatal)
    }
}

/// Flatten a nested stylesheet, silently skipping anything malformed.
///
/// Unbalanced input yields the rules completed before the unclosed block.
pub fn flatten(source: &str) -> Vec<FlattenedRule> {
    flatten_with_diagnostics(source).rules
}

/// Flatten a nested stylesheet and report what was skipped
pub fn flatten_with_diagnostics(source: &str) -> Flattened {
    Flattener::new(source).run()
}

/// Compute the full selector of a nested block.
///
/// A nested selector containing `&` has every `&` replaced by the parent
/// selector verbatim; otherwise it becomes a descendant of the parent.
pub fn resolve_selector(parent: &str, nested: &str) -> String {
    if nested.contains('&') {
        nested.replace('&', parent)
    } else {
        format!("{} {}", parent, nested)
    }
}

/// An open style block
struct Frame<'a> {
    /// Selector as written
    selector: Cow<'a, str>,
    /// Full selector, computed when first needed
    resolved: Option<String>,
    /// Index of this block's rule in the output
    slot: usize,
}

/// Output lengths when the current top-level block opened
struct Checkpoint {
    location: SourceLocation,
    rules: usize,
    diagnostics: usize,
}

struct Flattener<'a> {
    events: Events<'a>,
    frames: Vec<Frame<'a>>,
    checkpoint: Option<Checkpoint>,
    output: Flattened,
}

impl<'a> Flattener<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            events: Events::new(source),
            frames: Vec::new(),
            checkpoint: None,
            output: Flattened::default(),
        }
    }

    fn run(mut self) -> Flattened {
        loop {
            let mode = if self.frames.is_empty() {
                ScanMode::TopLevel
            } else {
                ScanMode::Nested
            };

            match self.events.next_event(mode) {
                Some(Event::Open { selector, location }) => {
                    if !self.open(selector, location) {
                        self.halt(location);
                        break;
                    }
                }
                Some(Event::Text { text, location }) => self.text(text, location),
                Some(Event::Close { location }) => self.close(location),
                None => {
                    if let Some(location) = self.checkpoint.as_ref().map(|c| c.location) {
                        self.halt(location);
                    }
                    break;
                }
            }
        }

        // slots of blocks with no declarations of their own
        self.output
            .rules
            .retain(|rule| !rule.declarations.is_empty());
        self.output
    }

    /// Handle `selector {`. Returns false if a skipped block never closes.
    fn open(&mut self, selector: Cow<'a, str>, location: SourceLocation) -> bool {
        if !self.frames.is_empty() {
            if selector.is_empty() {
                if !self.events.skip_block() {
                    return false;
                }
                self.report(Diagnostic::DegenerateNestedSelector { location });
                return true;
            }
            self.push_frame(selector, None);
            return true;
        }

        if selector.is_empty() {
            if !self.events.skip_block() {
                return false;
            }
            self.report(Diagnostic::EmptySelector { location });
            return true;
        }

        if let Some(at_rule) = selector.strip_prefix('@') {
            let name: String = at_rule
                .chars()
                .take_while(|c| !c.is_whitespace() && *c != '(')
                .collect();
            if !self.events.skip_block() {
                return false;
            }
            debug!("Discarding @{} block at {}", name, location);
            self.report(Diagnostic::AtRuleDiscarded { name, location });
            return true;
        }

        self.checkpoint = Some(Checkpoint {
            location,
            rules: self.output.rules.len(),
            diagnostics: self.output.diagnostics.len(),
        });
        let resolved = selector.to_string();
        self.push_frame(selector, Some(resolved));
        true
    }

    fn push_frame(&mut self, selector: Cow<'a, str>, resolved: Option<String>) {
        let slot = self.output.rules.len();
        // reserved now so the rule keeps its pre-order position
        self.output
            .rules
            .push(FlattenedRule::new(String::new(), Vec::new()));
        self.frames.push(Frame {
            selector,
            resolved,
            slot,
        });
    }

    fn text(&mut self, text: Cow<'a, str>, location: SourceLocation) {
        let Some(depth) = self.frames.len().checked_sub(1) else {
            debug!("Ignoring trailing text {:?} at {}", text, location);
            return;
        };
        if self.frames[depth].resolved.is_none() {
            let resolved = resolve_innermost(&self.frames);
            self.frames[depth].resolved = Some(resolved);
        }

        let frame = &self.frames[depth];
        if let Some(rule) = self.output.rules.get_mut(frame.slot) {
            if rule.declarations.is_empty() {
                if let Some(resolved) = &frame.resolved {
                    rule.selector.clone_from(resolved);
                }
            }
            rule.declarations.push(text.into_owned());
        }
    }

    fn close(&mut self, location: SourceLocation) {
        let Some(frame) = self.frames.pop() else {
            self.report(Diagnostic::StrayClosingBrace { location });
            return;
        };

        if let Some(rule) = self.output.rules.get(frame.slot) {
            if !rule.declarations.is_empty() {
                debug!(
                    "{} declaration(s) for '{}'",
                    rule.declarations.len(),
                    rule.selector
                );
            }
        }
        if self.frames.is_empty() {
            self.checkpoint = None;
        }
    }

    /// Drop the unclosed top-level block's output and stop
    fn halt(&mut self, location: SourceLocation) {
        let location = match self.checkpoint.take() {
            Some(checkpoint) => {
                self.output.rules.truncate(checkpoint.rules);
                self.output.diagnostics.truncate(checkpoint.diagnostics);
                checkpoint.location
            }
            None => location,
        };
        self.frames.clear();
        warn!("Block opened at {} is never closed, stopping", location);
        self.report(Diagnostic::UnbalancedBraces { location });
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        debug!("{}", diagnostic);
        self.output.diagnostics.push(diagnostic);
    }
}

/// Full selector of the innermost frame, built from the nearest ancestor
/// that already has one
fn resolve_innermost(frames: &[Frame<'_>]) -> String {
    let mut pending = Vec::new();
    let mut selector = String::new();
    for frame in frames.iter().rev() {
        match &frame.resolved {
            Some(resolved) => {
                selector.clone_from(resolved);
                break;
            }
            None => pending.push(frame.selector.as_ref()),
        }
    }

    for nested in pending.into_iter().rev() {
        selector = resolve_selector(&selector, nested);
    }
    selector
}
