//! Stylenest Network Layer
//!
//! Fetches nested stylesheets from URLs or files and feeds them to the
//! flattening pipeline.

mod client;
mod error;
mod fetcher;
mod response;

pub use client::{ClientConfig, HttpClient};
pub use error::{NetError, NetResult};
pub use fetcher::{FetcherConfig, Source, StylesheetFetcher};
pub use response::Response;
