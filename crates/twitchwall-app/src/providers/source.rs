//! Streamer list sources
//!
//! The list is fetched exactly once at startup, from a local file or an
//! HTTP(S) URL. There is no retry: a failed fetch means an empty dashboard
//! until the next start.

use std::path::PathBuf;

use crate::data::storage;
use crate::error::{AppError, Result};
use crate::network::HttpClient;

use super::traits::StreamerSource;

/// Streamer list read from a local file
pub struct FileSource {
    path: PathBuf,
    location: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            location: path.display().to_string(),
            path,
        }
    }
}

impl StreamerSource for FileSource {
    fn location(&self) -> &str {
        &self.location
    }

    fn fetch(&self) -> Result<String> {
        storage::read_text(&self.path)?
            .ok_or_else(|| AppError::Source(format!("{} not found", self.location)))
    }
}

/// Streamer list fetched over HTTP
pub struct HttpSource {
    url: String,
    client: HttpClient,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            client: HttpClient::new()?,
        })
    }
}

impl StreamerSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<String> {
        self.client.get_text(&self.url)
    }
}

/// Whether a location should be fetched over HTTP
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Pick the source for a location: URLs over HTTP, anything else as a file
pub fn source_for(location: &str) -> Result<Box<dyn StreamerSource>> {
    if is_remote(location) {
        Ok(Box::new(HttpSource::new(location.trim())?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}
