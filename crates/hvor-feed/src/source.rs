//! Where the feed bytes come from.
//!
//! [`FeedSource`] is the fetch seam. Two implementations are provided:
//! - [`HttpFeed`] downloads a shared calendar URL
//! - [`FileFeed`] reads a calendar dump from disk, for development
//!
//! Timeouts belong to the source; callers simply await [`FeedSource::fetch`].

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{FeedError, FeedResult};

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A place the raw calendar feed can be fetched from.
pub trait FeedSource: Send + Sync {
    /// Returns a short name for logs and errors (e.g. "http", "file").
    fn name(&self) -> &str;

    /// Fetches the raw feed bytes.
    fn fetch(&self) -> BoxFuture<'_, FeedResult<Vec<u8>>>;
}

/// Default time allowed for a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads the feed from a local file.
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    /// Creates a file feed reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path the feed is read from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedSource for FileFeed {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch(&self) -> BoxFuture<'_, FeedResult<Vec<u8>>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
                FeedError::io(format!(
                    "failed to read calendar from {}",
                    self.path.display()
                ))
                .with_source_name(self.name())
                .with_source(e)
            })?;
            debug!(path = %self.path.display(), bytes = bytes.len(), "Read calendar from disk");
            Ok(bytes)
        })
    }
}

/// Downloads the feed over HTTP(S).
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    url: url::Url,
}

#[cfg(feature = "http")]
impl HttpFeed {
    /// Creates an HTTP feed for `url` with the given request timeout.
    pub fn new(url: &str, timeout: Duration) -> FeedResult<Self> {
        let url = url::Url::parse(url).map_err(|e| {
            FeedError::configuration(format!("invalid calendar URL {url:?}"))
                .with_source_name("http")
                .with_source(e)
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hvor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                FeedError::configuration("failed to create HTTP client")
                    .with_source_name("http")
                    .with_source(e)
            })?;

        Ok(Self { client, url })
    }

    /// Returns the URL the feed is downloaded from.
    pub fn url(&self) -> &url::Url {
        &self.url
    }
}

#[cfg(feature = "http")]
impl FeedSource for HttpFeed {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self) -> BoxFuture<'_, FeedResult<Vec<u8>>> {
        Box::pin(async move {
            trace!(host = ?self.url.host_str(), "Fetching calendar");

            let response = self
                .client
                .get(self.url.clone())
                .send()
                .await
                .map_err(|e| {
                    FeedError::network("failed to get calendar")
                        .with_source_name(self.name())
                        .with_source(e)
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FeedError::http_status(status.as_u16()).with_source_name(self.name()));
            }

            let body = response.bytes().await.map_err(|e| {
                FeedError::network("failed to read response body")
                    .with_source_name(self.name())
                    .with_source(e)
            })?;

            debug!(bytes = body.len(), "Downloaded calendar");
            Ok(body.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedErrorCode;
    use std::io::Write;

    #[tokio::test]
    async fn file_feed_reads_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").unwrap();

        let feed = FileFeed::new(file.path());
        assert_eq!(feed.name(), "file");
        assert_eq!(feed.path(), file.path());

        let bytes = feed.fetch().await.unwrap();
        assert!(bytes.starts_with(b"BEGIN:VCALENDAR"));
    }

    #[tokio::test]
    async fn file_feed_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let feed = FileFeed::new(dir.path().join("cal.dump"));

        let err = feed.fetch().await.unwrap_err();
        assert_eq!(err.code(), FeedErrorCode::IoError);
        assert_eq!(err.source_name(), Some("file"));
    }

    #[cfg(feature = "http")]
    #[test]
    fn http_feed_rejects_bad_url() {
        let err = HttpFeed::new("not a url", DEFAULT_FETCH_TIMEOUT).unwrap_err();
        assert_eq!(err.code(), FeedErrorCode::ConfigurationError);
    }

    #[cfg(feature = "http")]
    #[test]
    fn http_feed_keeps_url() {
        let feed = HttpFeed::new("https://example.com/cal.ics", DEFAULT_FETCH_TIMEOUT).unwrap();
        assert_eq!(feed.name(), "http");
        assert_eq!(feed.url().as_str(), "https://example.com/cal.ics");
    }
}
