//! Stylesheet fetching
//!
//! Loads dialect text from URLs or local files, caches it per source, and
//! forwards it into a style sheet sink.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::PoisonError;

use log::debug;
use rustc_hash::FxHashMap;
use url::Url;

use stylenest_css::{SharedSink, DEFAULT_SINK_KEY};

use crate::client::{ClientConfig, HttpClient};
use crate::error::{NetError, NetResult};

/// Where stylesheet text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// http or https URL
    Remote(Url),
    /// Local file
    File(PathBuf),
}

impl Source {
    /// Parse a URL or a file path.
    ///
    /// Anything without `://` is taken as a path.
    pub fn parse(input: &str) -> NetResult<Self> {
        if input.contains("://") {
            Self::from_url(Url::parse(input)?)
        } else {
            Ok(Source::File(PathBuf::from(input)))
        }
    }

    pub fn from_url(url: Url) -> NetResult<Self> {
        match url.scheme() {
            "http" | "https" => Ok(Source::Remote(url)),
            "file" => url
                .to_file_path()
                .map(Source::File)
                .map_err(|_| NetError::InvalidSource(url.to_string())),
            scheme => Err(NetError::InvalidSource(format!(
                "unsupported scheme '{}' in {}",
                scheme, url
            ))),
        }
    }

    /// Cache key for this source
    pub fn id(&self) -> String {
        match self {
            Source::Remote(url) => url.to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }

    /// Resolve a reference relative to this source
    pub fn resolve(&self, relative: &str) -> NetResult<Source> {
        match self {
            Source::Remote(url) => Self::from_url(url.join(relative)?),
            Source::File(_) if relative.contains("://") => Self::parse(relative),
            Source::File(path) => {
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(Source::File(base.join(relative)))
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Fetcher configuration
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Keep fetched text in memory, keyed by source
    pub cache: bool,
    pub client: ClientConfig,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            cache: true,
            client: ClientConfig::default(),
        }
    }
}

/// Loads stylesheet text and hands it to the flattening pipeline
pub struct StylesheetFetcher {
    client: HttpClient,
    /// Source id -> text
    cache: FxHashMap<String, String>,
    cache_enabled: bool,
}

impl StylesheetFetcher {
    /// Create a new fetcher with default settings
    pub fn new() -> NetResult<Self> {
        Self::with_config(FetcherConfig::default())
    }

    pub fn with_config(config: FetcherConfig) -> NetResult<Self> {
        Ok(Self {
            client: HttpClient::with_config(config.client)?,
            cache: FxHashMap::default(),
            cache_enabled: config.cache,
        })
    }

    /// Load a source, using the cache when possible
    pub async fn load(&mut self, source: &Source) -> NetResult<String> {
        let key = source.id();

        if let Some(text) = self.cache.get(&key) {
            debug!("Cache hit: {}", key);
            return Ok(text.clone());
        }

        let text = self.load_uncached(source).await?;
        if self.cache_enabled {
            self.cache.insert(key, text.clone());
        }
        Ok(text)
    }

    /// Load a source without touching the cache
    pub async fn load_uncached(&self, source: &Source) -> NetResult<String> {
        match source {
            Source::Remote(url) => {
                let response = self.client.get(url).await?;
                if !response.is_success() {
                    return Err(NetError::HttpError {
                        status: response.status,
                        url: url.to_string(),
                    });
                }
                if !response.is_stylesheet() {
                    debug!(
                        "{} served as {:?}, reading it anyway",
                        url,
                        response.content_type()
                    );
                }
                response.into_text()
            }
            Source::File(path) => {
                debug!("Reading: {}", path.display());
                let bytes = tokio::fs::read(path).await.map_err(|source| NetError::Io {
                    path: path.clone(),
                    source,
                })?;
                String::from_utf8(bytes).map_err(|_| NetError::Encoding(path.display().to_string()))
            }
        }
    }

    /// Load a source and inject it into the sink's default buffer
    pub async fn load_into(&mut self, source: &Source, sink: &SharedSink) -> NetResult<()> {
        self.load_into_key(source, DEFAULT_SINK_KEY, sink).await
    }

    /// Load a source and inject it into the buffer named `key`
    pub async fn load_into_key(
        &mut self,
        source: &Source,
        key: &str,
        sink: &SharedSink,
    ) -> NetResult<()> {
        let text = self.load(source).await?;
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .inject_into(key, &text);
        Ok(())
    }

    pub fn is_cached(&self, source: &Source) -> bool {
        self.cache.contains_key(&source.id())
    }

    /// Number of cached sources
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Clear the cache
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use stylenest_css::new_shared_sink;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("stylenest-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_path() {
        let source = Source::parse("styles/site.scss").unwrap();
        assert_eq!(source, Source::File(PathBuf::from("styles/site.scss")));
    }

    #[test]
    fn test_parse_url() {
        let source = Source::parse("https://example.com/site.css").unwrap();
        assert!(matches!(source, Source::Remote(ref url) if url.host_str() == Some("example.com")));
    }

    #[test]
    fn test_parse_file_url() {
        let source = Source::parse("file:///tmp/site.css").unwrap();
        assert_eq!(source, Source::File(PathBuf::from("/tmp/site.css")));
    }

    #[test]
    fn test_parse_unsupported_scheme() {
        assert!(matches!(
            Source::parse("ftp://example.com/site.css"),
            Err(NetError::InvalidSource(_))
        ));
    }

    #[test]
    fn test_resolve_remote() {
        let base = Source::parse("https://example.com/css/main.css").unwrap();
        let resolved = base.resolve("../theme/dark.css").unwrap();
        assert_eq!(resolved.id(), "https://example.com/theme/dark.css");
    }

    #[test]
    fn test_resolve_file() {
        let base = Source::parse("styles/main.css").unwrap();
        let resolved = base.resolve("parts/menu.css").unwrap();
        assert_eq!(resolved, Source::File(PathBuf::from("styles/parts/menu.css")));
    }

    #[tokio::test]
    async fn test_load_file_is_cached() {
        let path = temp_file("cached.css", b".a { x: 1; }");
        let source = Source::File(path.clone());
        let mut fetcher = StylesheetFetcher::new().unwrap();

        assert_eq!(fetcher.load(&source).await.unwrap(), ".a { x: 1; }");
        assert!(fetcher.is_cached(&source));

        fs::write(&path, ".a { x: 2; }").unwrap();
        assert_eq!(fetcher.load(&source).await.unwrap(), ".a { x: 1; }");
        assert_eq!(fetcher.load_uncached(&source).await.unwrap(), ".a { x: 2; }");

        fetcher.clear_cache();
        assert_eq!(fetcher.cached_len(), 0);
        assert_eq!(fetcher.load(&source).await.unwrap(), ".a { x: 2; }");

        fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_cache_disabled() {
        let path = temp_file("uncached.css", b".a { x: 1; }");
        let source = Source::File(path.clone());
        let config = FetcherConfig {
            cache: false,
            ..FetcherConfig::default()
        };
        let mut fetcher = StylesheetFetcher::with_config(config).unwrap();

        fetcher.load(&source).await.unwrap();
        assert!(!fetcher.is_cached(&source));
        assert_eq!(fetcher.cached_len(), 0);

        fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = Source::File(PathBuf::from("/nonexistent/stylenest/missing.css"));
        let mut fetcher = StylesheetFetcher::new().unwrap();
        let err = fetcher.load(&source).await.unwrap_err();
        assert!(matches!(err, NetError::Io { .. }));
        assert!(!fetcher.is_cached(&source));
    }

    #[tokio::test]
    async fn test_invalid_utf8_file() {
        let path = temp_file("binary.css", &[0xff, 0xfe, 0x00]);
        let source = Source::File(path.clone());
        let fetcher = StylesheetFetcher::new().unwrap();
        let err = fetcher.load_uncached(&source).await.unwrap_err();
        assert!(matches!(err, NetError::Encoding(_)));

        fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_load_into_sink() {
        let path = temp_file("nested.css", b".nav { color: red; &:hover { color: blue; } }");
        let source = Source::File(path.clone());
        let mut fetcher = StylesheetFetcher::new().unwrap();
        let sink = new_shared_sink();

        fetcher.load_into(&source, &sink).await.unwrap();
        fetcher.load_into_key(&source, "theme", &sink).await.unwrap();

        let sink = sink.lock().unwrap();
        let expected = ".nav { color: red; }\n.nav:hover { color: blue; }";
        assert_eq!(sink.text(), expected);
        assert_eq!(sink.get("theme"), Some(expected));

        fs::remove_file(path).unwrap();
    }
}
