//! Style sheet sink
//!
//! Append-only buffers that collect flattened CSS for the rendering layer.

use std::sync::{Arc, Mutex};

use log::debug;
use rustc_hash::FxHashMap;

use crate::process;

/// Key of the buffer used by [`StyleSheetSink::inject`]
pub const DEFAULT_SINK_KEY: &str = "ui-styles";

/// Reset applied by [`StyleSheetSink::configure`]
pub const BASE_RESET: &str = "body { margin: 0; padding: 0; }";

/// Append-only CSS buffers keyed by identifier.
///
/// A buffer is created on first write and only shrinks through
/// [`clear`](Self::clear) or [`clear_all`](Self::clear_all). Injecting the
/// same source twice stores its rules twice.
#[derive(Debug, Default, Clone)]
pub struct StyleSheetSink {
    buffers: FxHashMap<String, String>,
}

/// Sink shared between threads
pub type SharedSink = Arc<Mutex<StyleSheetSink>>;

/// Create a new shared sink
pub fn new_shared_sink() -> SharedSink {
    Arc::new(Mutex::new(StyleSheetSink::new()))
}

impl StyleSheetSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten `source` and append the CSS to the default buffer
    pub fn inject(&mut self, source: &str) {
        self.inject_into(DEFAULT_SINK_KEY, source);
    }

    /// Flatten `source` and append the CSS to the buffer named `key`
    pub fn inject_into(&mut self, key: &str, source: &str) {
        let css = process(source);
        debug!("Injecting {} bytes of CSS into '{}'", css.len(), key);
        self.append(key, &css);
    }

    /// Inject the base page reset when `enable` is set
    pub fn configure(&mut self, enable: bool) {
        if enable {
            self.inject(BASE_RESET);
        }
    }

    /// Append raw CSS text to a buffer, creating it if needed
    pub fn append(&mut self, key: &str, css: &str) {
        self.buffers.entry(key.to_string()).or_default().push_str(css);
    }

    /// Get the contents of a buffer
    pub fn get(&self, key: &str) -> Option<&str> {
        self.buffers.get(key).map(String::as_str)
    }

    /// Contents of the default buffer, empty if nothing was written
    pub fn text(&self) -> &str {
        self.get(DEFAULT_SINK_KEY).unwrap_or_default()
    }

    /// Remove one buffer, returning whether it existed
    pub fn clear(&mut self, key: &str) -> bool {
        self.buffers.remove(key).is_some()
    }

    /// Remove every buffer
    pub fn clear_all(&mut self) {
        self.buffers.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.buffers.contains_key(key)
    }

    /// Number of buffers
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
