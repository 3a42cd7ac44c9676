use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use super::fetcher::{fetch_bytes, FetchError, FetchOptions};
use super::parser::{parse_bytes, ParseError};
use crate::tree::TreeNode;

/// Errors that can occur while loading a document from its source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The location is a URL with a scheme other than http, https or file.
    #[error("Unsupported scheme: {0} (only http/https URLs and local paths allowed)")]
    UnsupportedScheme(String),

    /// A `file://` URL that does not map to a local path.
    #[error("Invalid file URL: {0}")]
    InvalidFileUrl(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A local document larger than the configured feed size limit.
    #[error("File {path} is {size} bytes (max {limit} bytes)")]
    TooLarge { path: PathBuf, size: u64, limit: usize },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to parse {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: ParseError,
    },
}

/// Where a document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Remote(Url),
    Local(PathBuf),
}

impl FeedSource {
    /// Classifies a location string.
    ///
    /// - `http://` / `https://` URLs are fetched over the network
    /// - `file://` URLs and strings that are not URLs at all are local paths
    /// - single-letter schemes are Windows drive letters (`C:\feeds.xml`)
    /// - any other scheme is rejected
    ///
    /// # Examples
    ///
    /// ```
    /// use rssagg::feed::FeedSource;
    ///
    /// assert!(matches!(FeedSource::parse("https://example.com/rss").unwrap(), FeedSource::Remote(_)));
    /// assert!(matches!(FeedSource::parse("feeds/news.xml").unwrap(), FeedSource::Local(_)));
    /// assert!(FeedSource::parse("ftp://example.com/rss").is_err());
    /// ```
    pub fn parse(location: &str) -> Result<Self, SourceError> {
        let location = location.trim();
        let url = match Url::parse(location) {
            Ok(url) => url,
            Err(_) => return Ok(FeedSource::Local(PathBuf::from(location))),
        };

        match url.scheme() {
            "http" | "https" => Ok(FeedSource::Remote(url)),
            "file" => url
                .to_file_path()
                .map(FeedSource::Local)
                .map_err(|_| SourceError::InvalidFileUrl(location.to_string())),
            scheme if scheme.len() == 1 => Ok(FeedSource::Local(PathBuf::from(location))),
            scheme => Err(SourceError::UnsupportedScheme(scheme.to_string())),
        }
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedSource::Remote(url) => write!(f, "{}", url),
            FeedSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads and parses the document at `source`.
///
/// Any failure is fatal for the caller; there is no partial tree.
pub async fn load_tree(
    source: &FeedSource,
    client: &reqwest::Client,
    options: &FetchOptions,
    max_depth: usize,
) -> Result<TreeNode, SourceError> {
    let bytes = match source {
        FeedSource::Remote(url) => fetch_bytes(client, url, options).await?,
        FeedSource::Local(path) => {
            let io_error = |source| SourceError::Io {
                path: path.clone(),
                source,
            };
            // Check size before reading, as remote bodies are limited too
            let size = tokio::fs::metadata(path).await.map_err(io_error)?.len();
            if size > options.max_size as u64 {
                return Err(SourceError::TooLarge {
                    path: path.clone(),
                    size,
                    limit: options.max_size,
                });
            }
            tokio::fs::read(path).await.map_err(io_error)?
        }
    };

    tracing::debug!(source = %source, bytes = bytes.len(), "Loaded document");

    parse_bytes(&bytes, max_depth).map_err(|source_err| SourceError::Parse {
        location: source.to_string(),
        source: source_err,
    })
}
