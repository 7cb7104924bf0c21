use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use url::Url;

use super::TextSource;

/// Reads locators from the local file system. Accepts bare paths and
/// `file://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl FileSource {
    /// Read the whole file and require it to be UTF-8. A leading byte order
    /// mark is dropped, as HTTP bodies decoded by reqwest already are.
    pub async fn read_path(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let text = String::from_utf8(bytes)
            .with_context(|| format!("{} is not UTF-8 text", path.display()))?;
        Ok(match text.strip_prefix('\u{feff}') {
            Some(rest) => rest.to_string(),
            None => text,
        })
    }
}

impl TextSource for FileSource {
    async fn fetch_text(&self, location: &str) -> Result<String> {
        let path = match Url::parse(location) {
            Ok(url) if url.scheme() == "file" => url_to_path(&url)?,
            _ => PathBuf::from(location),
        };
        self.read_path(&path).await
    }
}

pub(crate) fn url_to_path(url: &Url) -> Result<PathBuf> {
    url.to_file_path()
        .map_err(|_| anyhow!("{} does not name a local file", url))
}
