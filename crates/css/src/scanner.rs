//! Dialect scanner
//!
//! Forward scanning over nested stylesheet text: comment skipping, brace
//! matching, and an event stream of declaration text and block boundaries.
//!
//! A block's selector starts right after the nearest preceding `}`, `;`
//! (nested spans only) or the start of the span.

use std::borrow::Cow;

use crate::error::SourceLocation;

/// Cursor over the dialect source
pub struct Scanner<'a> {
    input: &'a str,
    position: usize,
    end: usize,
    line: usize,
    column: usize,
    /// Open parentheses since the last `{`, `}` or `;`
    paren_depth: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over the whole input
    pub fn new(input: &'a str) -> Self {
        Self::within(input, 0, input.len(), SourceLocation::new(1, 1, 0))
    }

    /// Create a scanner over `input[start..end]`, where `location` is the
    /// location of `start`
    pub fn within(input: &'a str, start: usize, end: usize, location: SourceLocation) -> Self {
        Self {
            input,
            position: start,
            end: end.min(input.len()),
            line: location.line,
            column: location.column,
            paren_depth: 0,
        }
    }

    /// Get the current source location
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.position)
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.end
    }

    fn peek(&self) -> Option<u8> {
        if self.position < self.end {
            self.input.as_bytes().get(self.position).copied()
        } else {
            None
        }
    }

    fn peek_second(&self) -> Option<u8> {
        if self.position + 1 < self.end {
            self.input.as_bytes().get(self.position + 1).copied()
        } else {
            None
        }
    }

    /// Consume one byte, tracking line and column only
    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.position += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if byte & 0xC0 != 0x80 {
            // continuation bytes belong to the previous character
            self.column += 1;
        }
        Some(byte)
    }

    /// Consume one byte of non-comment text
    fn advance(&mut self) -> Option<u8> {
        let byte = self.bump()?;
        match byte {
            b'(' => self.paren_depth += 1,
            b')' => self.paren_depth = self.paren_depth.saturating_sub(1),
            b'{' | b'}' | b';' => self.paren_depth = 0,
            _ => {}
        }
        Some(byte)
    }

    /// Skip a comment starting at the cursor.
    ///
    /// Block comments run to the closing `*/` or the end of input. Line
    /// comments run to the end of the line, except inside parentheses so
    /// that `url(http://…)` survives.
    pub fn skip_comment(&mut self) -> bool {
        match (self.peek(), self.peek_second()) {
            (Some(b'/'), Some(b'*')) => {
                self.bump();
                self.bump();
                loop {
                    match self.bump() {
                        Some(b'*') if self.peek() == Some(b'/') => {
                            self.bump();
                            return true;
                        }
                        Some(_) => continue,
                        None => return true, // EOF in comment
                    }
                }
            }
            (Some(b'/'), Some(b'/')) if self.paren_depth == 0 => {
                while let Some(byte) = self.peek() {
                    if byte == b'\n' {
                        break;
                    }
                    self.bump();
                }
                true
            }
            _ => false,
        }
    }

    /// Skip whitespace and comments
    pub fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(byte) if byte.is_ascii_whitespace() => {
                    self.advance();
                }
                Some(b'/') if self.skip_comment() => {}
                _ => break,
            }
        }
    }

    /// Find the `}` closing a block whose `{` was just consumed.
    ///
    /// Leaves the cursor after the closing brace and returns its offset, or
    /// `None` when the input ends first.
    pub fn find_closing_brace(&mut self) -> Option<usize> {
        let mut depth = 1usize;
        loop {
            if self.skip_comment() {
                continue;
            }
            match self.advance()? {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(self.position - 1);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Find the brace matching the `{` at byte offset `open`.
///
/// Returns `None` if `open` is not a `{` or the text ends before the block
/// is closed.
pub fn find_matching_brace(text: &str, open: usize) -> Option<usize> {
    if text.as_bytes().get(open) != Some(&b'{') {
        return None;
    }
    let start = open + 1;
    let mut scanner = Scanner::within(text, start, text.len(), SourceLocation::at(text, start));
    scanner.find_closing_brace()
}

/// Remove every comment span from `text`
pub fn strip_comments(text: &str) -> Cow<'_, str> {
    let mut scanner = Scanner::new(text);
    let mut stripped: Option<String> = None;
    let mut run_start = 0;

    while !scanner.is_eof() {
        let start = scanner.position;
        if scanner.skip_comment() {
            stripped
                .get_or_insert_with(String::new)
                .push_str(&text[run_start..start]);
            run_start = scanner.position;
        } else {
            scanner.advance();
        }
    }

    match stripped {
        Some(mut out) => {
            out.push_str(&text[run_start..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}

/// Strip comments and surrounding whitespace
fn clean(raw: &str) -> Cow<'_, str> {
    match strip_comments(raw) {
        Cow::Borrowed(text) => Cow::Borrowed(text.trim()),
        Cow::Owned(text) => Cow::Owned(text.trim().to_string()),
    }
}

/// Which characters end a span of selector or declaration text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Stylesheet top level: only block ends separate selectors, and text
    /// before a `}` is dropped
    TopLevel,
    /// Inside a block: `;` and `}` also end a declaration
    Nested,
}

/// One step of a forward scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    /// Non-empty text ended by `;`, `}` or the end of input
    Text {
        text: Cow<'a, str>,
        location: SourceLocation,
    },
    /// `selector {`, with the selector's comments removed and trimmed
    Open {
        selector: Cow<'a, str>,
        /// Location of the opening brace
        location: SourceLocation,
    },
    /// `}`
    Close { location: SourceLocation },
}

/// Forward scan over stylesheet text.
///
/// Every byte is visited once. Blocks are reported as `Open`/`Close` pairs
/// instead of being matched up front, so callers track depth themselves.
pub struct Events<'a> {
    scanner: Scanner<'a>,
    start: usize,
    start_location: SourceLocation,
    queued: Option<Event<'a>>,
}

impl<'a> Events<'a> {
    pub fn new(input: &'a str) -> Self {
        let scanner = Scanner::new(input);
        let mut events = Self {
            start: scanner.position(),
            start_location: scanner.location(),
            scanner,
            queued: None,
        };
        events.restart();
        events
    }

    /// Get the next event, splitting text the way `mode` says
    pub fn next_event(&mut self, mode: ScanMode) -> Option<Event<'a>> {
        if let Some(event) = self.queued.take() {
            return Some(event);
        }

        loop {
            if self.scanner.skip_comment() {
                continue;
            }

            let position = self.scanner.position();
            let Some(byte) = self.scanner.peek() else {
                let text = self.text_until(position);
                self.start = position;
                return text;
            };

            match byte {
                b';' if mode == ScanMode::Nested => {
                    let text = self.text_until(position);
                    self.scanner.advance();
                    self.restart();
                    if text.is_some() {
                        return text;
                    }
                }
                b'}' => {
                    let location = self.scanner.location();
                    let text = match mode {
                        ScanMode::Nested => self.text_until(position),
                        ScanMode::TopLevel => None,
                    };
                    self.scanner.advance();
                    self.restart();

                    let close = Event::Close { location };
                    return match text {
                        Some(text) => {
                            self.queued = Some(close);
                            Some(text)
                        }
                        None => Some(close),
                    };
                }
                b'{' => {
                    let input = self.scanner.input;
                    let location = self.scanner.location();
                    let selector = clean(&input[self.start..position]);
                    self.scanner.advance();
                    self.restart();
                    return Some(Event::Open { selector, location });
                }
                _ => {
                    self.scanner.advance();
                }
            }
        }
    }

    /// Skip the rest of the block whose `Open` was just returned.
    ///
    /// Returns false if the input ends before the block is closed.
    pub fn skip_block(&mut self) -> bool {
        let closed = self.scanner.find_closing_brace().is_some();
        self.restart();
        closed
    }

    fn text_until(&self, end: usize) -> Option<Event<'a>> {
        let input = self.scanner.input;
        let text = clean(&input[self.start..end]);
        if text.is_empty() {
            None
        } else {
            Some(Event::Text {
                text,
                location: self.start_location,
            })
        }
    }

    /// Begin a new span at the next significant character
    fn restart(&mut self) {
        self.scanner.skip_trivia();
        self.start = self.scanner.position();
        self.start_location = self.scanner.location();
    }
}
