// src/fetch/mod.rs

use anyhow::{bail, Result};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

pub mod file;
pub mod http;

pub use file::FileSource;
pub use http::HttpSource;

/// Anything that can turn a locator (path or URL) into the full text it
/// points at. Failures are returned as-is to whoever asked for the text.
pub trait TextSource {
    fn fetch_text(&self, location: &str) -> impl Future<Output = Result<String>> + Send;
}

impl<T: TextSource + ?Sized> TextSource for &T {
    fn fetch_text(&self, location: &str) -> impl Future<Output = Result<String>> + Send {
        (**self).fetch_text(location)
    }
}

impl<T: TextSource + ?Sized> TextSource for Arc<T> {
    fn fetch_text(&self, location: &str) -> impl Future<Output = Result<String>> + Send {
        (**self).fetch_text(location)
    }
}

/// Where a locator resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Http(Url),
    File(PathBuf),
}

impl Locator {
    /// `http(s)://` → HTTP, `file://` or anything that is not a URL → file
    /// system. Single-letter schemes are Windows drive letters.
    pub fn parse(location: &str) -> Result<Self> {
        let url = match Url::parse(location) {
            Ok(url) => url,
            Err(_) => return Ok(Locator::File(PathBuf::from(location))),
        };

        match url.scheme() {
            "http" | "https" => Ok(Locator::Http(url)),
            "file" => file::url_to_path(&url).map(Locator::File),
            s if s.len() == 1 => Ok(Locator::File(PathBuf::from(location))),
            other => bail!("unsupported scheme {:?} in {}", other, location),
        }
    }
}

/// Dispatches each locator to the file system or HTTP.
#[derive(Debug, Clone, Default)]
pub struct AutoSource {
    file: FileSource,
    http: HttpSource,
}

impl AutoSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http(http: HttpSource) -> Self {
        Self {
            file: FileSource,
            http,
        }
    }
}

impl TextSource for AutoSource {
    async fn fetch_text(&self, location: &str) -> Result<String> {
        match Locator::parse(location)? {
            Locator::Http(url) => self.http.fetch_url(url).await,
            Locator::File(path) => self.file.read_path(&path).await,
        }
    }
}
