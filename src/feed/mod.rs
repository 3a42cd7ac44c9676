//! Feed documents: loading them and pulling fields out of them.
//!
//! - [`source`] - Classify a location as a local path or http(s) URL and load it
//! - [`fetcher`] - HTTP retrieval with retry, timeout and size limits
//! - [`parser`] - Materialize XML into a [`crate::tree::TreeNode`] using `quick-xml`
//! - [`extract`] - Channel, item and feed-list field records with defaults
//!
//! # Example
//!
//! ```ignore
//! use rssagg::feed::{extract_channel, load_tree, FeedSource};
//!
//! let source = FeedSource::parse("https://example.com/rss.xml")?;
//! let rss = load_tree(&source, &client, &options, max_depth).await?;
//! let channel = extract_channel(rss.child(0)?)?;
//! ```

mod extract;
mod fetcher;
mod parser;
mod source;

pub use extract::{
    extract_channel, extract_item, ChannelFields, ContractError, FeedEntry, FeedList, ItemFields,
    DEFAULT_CHANNEL_DESCRIPTION, DEFAULT_CHANNEL_TITLE, DEFAULT_NEWS_TEXT, DEFAULT_PUB_DATE,
    DEFAULT_SOURCE_NAME,
};
pub use fetcher::{fetch_bytes, FetchError, FetchOptions};
pub use parser::{parse_bytes, parse_tree, ParseError, DEFAULT_MAX_DEPTH};
pub use source::{load_tree, FeedSource, SourceError};
