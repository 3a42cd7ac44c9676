//! Feed-to-page conversion.
//!
//! Per feed the conversion is a single sequential pass:
//! locate `<channel>`, write the header, write one row per `<item>` in
//! document order, write the footer, commit. The index pass validates the
//! feed list, then converts each feed before emitting its index entry.
//!
//! Nothing here runs concurrently: each feed is loaded, rendered and
//! committed before the next one starts, and any error aborts the run.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Config;
use crate::feed::{
    extract_channel, extract_item, load_tree, ContractError, FeedList, FeedSource, FetchOptions,
    SourceError,
};
use crate::output::{Destination, OutputError};
use crate::render::{
    render_footer, render_header, render_index_entry, render_index_footer, render_index_header,
    render_item_row, RenderOptions,
};
use crate::tree::TreeNode;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input document does not have the required structure.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// A document could not be retrieved or parsed.
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Failed to write page: {0}")]
    Write(#[from] std::io::Error),
}

impl PipelineError {
    /// True for malformed-input errors the operator should see as
    /// "Invalid file" rather than as a system failure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, PipelineError::Contract(_))
    }
}

/// Outcome of one converted feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReport {
    pub file: PathBuf,
    pub items: usize,
}

/// Outcome of a whole feed-list run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub index: PathBuf,
    /// In feed-list order.
    pub feeds: Vec<FeedReport>,
}

/// The `<channel>` that must be the first child of the feed root.
pub fn locate_channel(rss: &TreeNode) -> Result<&TreeNode, ContractError> {
    match rss.children().first() {
        Some(channel) if channel.is_element() && channel.label() == "channel" => Ok(channel),
        _ => Err(ContractError::MissingChannel {
            root: rss.label().to_string(),
        }),
    }
}

/// Writes the full page for one parsed feed and returns the item count.
///
/// Children of the channel other than `<item>` are skipped.
pub fn write_feed_page<W: Write>(
    rss: &TreeNode,
    out: &mut W,
    options: RenderOptions,
) -> Result<usize, PipelineError> {
    let channel = locate_channel(rss)?;
    let fields = extract_channel(channel)?;
    out.write_all(render_header(&fields, options).as_bytes())?;

    let mut items = 0;
    for child in channel.children() {
        if child.is_element() && child.label() == "item" {
            let item = extract_item(child)?;
            out.write_all(render_item_row(&item, options).as_bytes())?;
            items += 1;
        }
    }

    out.write_all(render_footer().as_bytes())?;
    Ok(items)
}

/// Output path of a feed page: relative `file` values are placed next to
/// the index so the index hrefs resolve.
fn page_path(index_path: &Path, file: &str) -> PathBuf {
    let file = Path::new(file);
    match index_path.parent() {
        Some(dir) if file.is_relative() => dir.join(file),
        _ => file.to_path_buf(),
    }
}

/// Drives feed loading, rendering and output for a run.
#[derive(Debug, Clone)]
pub struct Aggregator {
    client: reqwest::Client,
    fetch: FetchOptions,
    render: RenderOptions,
    max_depth: usize,
}

impl Aggregator {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(config.http_client()?, config))
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            fetch: config.fetch_options(),
            render: config.render_options(),
            max_depth: config.max_depth,
        }
    }

    async fn load(&self, source: &FeedSource) -> Result<TreeNode, PipelineError> {
        Ok(load_tree(source, &self.client, &self.fetch, self.max_depth).await?)
    }

    /// Loads and validates a feed-list document.
    ///
    /// Runs before any output is opened, so an invalid list writes nothing.
    pub async fn load_feed_list(&self, location: &str) -> Result<FeedList, PipelineError> {
        let source = FeedSource::parse(location)?;
        let root = self.load(&source).await?;
        let list = FeedList::from_tree(&root)?;
        tracing::info!(
            source = %source,
            title = %list.title,
            feeds = list.entries.len(),
            "Loaded feed list"
        );
        Ok(list)
    }

    /// Converts the feed at `source` into the page at `file`.
    ///
    /// The page only appears at `file` once fully written.
    pub async fn process_feed(
        &self,
        source: &FeedSource,
        file: &Path,
    ) -> Result<FeedReport, PipelineError> {
        let rss = self.load(source).await?;

        let mut out = Destination::create(file)?;
        let items = write_feed_page(&rss, &mut out, self.render)?;
        let file = out.commit()?;

        tracing::info!(source = %source, file = %file.display(), items, "Wrote feed page");
        Ok(FeedReport { file, items })
    }

    /// Converts every `<feed>` of `list` and writes the index at `index_path`.
    ///
    /// Every entry's source and page path are resolved before any output is
    /// opened. Feeds are then processed in list order, each committed before
    /// its index entry is written. The index is committed last; if any feed
    /// fails the index is discarded and the error returned.
    pub async fn process_feed_list(
        &self,
        list: &FeedList,
        index_path: &Path,
    ) -> Result<IndexReport, PipelineError> {
        let planned = list
            .entries
            .iter()
            .map(|entry| -> Result<_, PipelineError> {
                let source = FeedSource::parse(&entry.url)?;
                Ok((entry, source, page_path(index_path, &entry.file)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut index = Destination::create(index_path)?;
        index.write_fragment(&render_index_header(&list.title, self.render))?;

        let mut feeds = Vec::with_capacity(planned.len());
        for (entry, source, file) in planned {
            tracing::debug!(name = %entry.name, source = %source, file = %file.display(), "Converting feed");

            let report = self.process_feed(&source, &file).await?;
            index.write_fragment(&render_index_entry(&entry.name, &entry.file, self.render))?;
            feeds.push(report);
        }

        index.write_fragment(&render_index_footer())?;
        let index = index.commit()?;

        tracing::info!(index = %index.display(), feeds = feeds.len(), "Wrote index page");
        Ok(IndexReport { index, feeds })
    }

    /// [`Aggregator::load_feed_list`] followed by [`Aggregator::process_feed_list`].
    pub async fn run(
        &self,
        feed_list: &str,
        index_path: &Path,
    ) -> Result<IndexReport, PipelineError> {
        let list = self.load_feed_list(feed_list).await?;
        self.process_feed_list(&list, index_path).await
    }
}
