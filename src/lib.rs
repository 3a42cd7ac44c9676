//! rssagg - converts RSS 2.0 feeds into static HTML pages.
//!
//! A feed-list document names a set of feeds and the page each one is
//! written to:
//!
//! ```xml
//! <feeds title="My Feeds">
//!   <feed url="https://news.example/rss.xml" file="news.html" name="News"/>
//! </feeds>
//! ```
//!
//! Each feed becomes a table of its items and an index page links them all.
//!
//! - [`tree`] - The materialized document model and child lookup
//! - [`feed`] - Loading documents and extracting channel/item/feed fields
//! - [`render`] - Pure HTML fragment rendering
//! - [`pipeline`] - Sequential feed and index conversion
//! - [`output`] - Atomic, scoped output files
//! - [`config`] - Optional TOML configuration
//! - [`util`] - Tag stripping and HTML escaping

pub mod config;
pub mod feed;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod tree;
pub mod util;
