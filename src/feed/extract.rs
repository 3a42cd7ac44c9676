//! Field extraction from channel, item and feed-list nodes.
//!
//! Every extractor reads a node it does not own and returns a fresh record.
//! Missing optional elements become documented default strings; only
//! structural contract violations are errors.

use thiserror::Error;

use crate::tree::{child_named, TreeError, TreeNode};
use crate::util::strip_tags;

pub const DEFAULT_CHANNEL_TITLE: &str = "Empty Title";
pub const DEFAULT_CHANNEL_DESCRIPTION: &str = "No description";
pub const DEFAULT_PUB_DATE: &str = "No date available";
pub const DEFAULT_SOURCE_NAME: &str = "No source available";
pub const DEFAULT_NEWS_TEXT: &str = "No title available";

/// Input documents that break the structure the converter relies on.
#[derive(Debug, Error)]
pub enum ContractError {
    /// A node was handed to the wrong extractor.
    #[error("Expected <{expected}> element, found <{found}>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },
    /// The feed document's root has no leading `<channel>` element.
    #[error("Feed root <{root}> does not start with a <channel> element")]
    MissingChannel { root: String },
    /// RSS requires `<link>` on every channel.
    #[error("Channel has no <link> element")]
    MissingChannelLink,
    /// The feed-list root failed validation.
    #[error("Invalid file: {0}")]
    InvalidFeedList(&'static str),
    /// A `<feed>` entry lacks one of `url`, `file` or `name`.
    #[error("Feed entry {index} is missing the `{attribute}` attribute")]
    MissingAttribute {
        index: usize,
        attribute: &'static str,
    },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

fn expect_element(node: &TreeNode, expected: &'static str) -> Result<(), ContractError> {
    if node.is_element() && node.label() == expected {
        Ok(())
    } else {
        Err(ContractError::UnexpectedElement {
            expected,
            found: node.label().to_string(),
        })
    }
}

/// Feed-level metadata rendered into the page header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFields {
    pub title: String,
    pub link: String,
    pub description: String,
}

/// Extracts title, link and description from a `<channel>` element.
///
/// Presence of `<title>` or `<description>` is what counts: a present but
/// childless tag yields the empty string, and only a missing tag falls back
/// to [`DEFAULT_CHANNEL_TITLE`] / [`DEFAULT_CHANNEL_DESCRIPTION`].
///
/// # Errors
///
/// - [`ContractError::UnexpectedElement`] if `channel` is not `<channel>`
/// - [`ContractError::MissingChannelLink`] if there is no `<link>` child
pub fn extract_channel(channel: &TreeNode) -> Result<ChannelFields, ContractError> {
    expect_element(channel, "channel")?;

    let present_text = |label: &str, default: &str| {
        child_named(channel, label)
            .map(|node| node.first_child_label().unwrap_or_default())
            .unwrap_or(default)
            .to_string()
    };

    let link = child_named(channel, "link")
        .ok_or(ContractError::MissingChannelLink)?
        .first_child_label()
        .unwrap_or_default()
        .to_string();

    Ok(ChannelFields {
        title: present_text("title", DEFAULT_CHANNEL_TITLE),
        link,
        description: present_text("description", DEFAULT_CHANNEL_DESCRIPTION),
    })
}

/// One news entry, ready for a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub pub_date: String,
    pub source_name: String,
    /// Empty when the item has no `<source url="...">`.
    pub source_url: String,
    /// Title, else tag-stripped description, else [`DEFAULT_NEWS_TEXT`].
    pub news: String,
    /// `Some` whenever a `<link>` child exists, even an empty one.
    pub link: Option<String>,
}

/// Text of the child labelled `label`, if it exists and has children.
fn non_empty_text<'a>(item: &'a TreeNode, label: &str) -> Option<&'a str> {
    child_named(item, label).and_then(TreeNode::first_child_label)
}

/// Extracts date, source, news text and link from an `<item>` element.
///
/// A present but childless element is treated exactly like a missing one.
/// Malformed items never fail; they get default values.
///
/// # Errors
///
/// [`ContractError::UnexpectedElement`] if `item` is not `<item>`.
pub fn extract_item(item: &TreeNode) -> Result<ItemFields, ContractError> {
    expect_element(item, "item")?;

    let pub_date = non_empty_text(item, "pubDate")
        .unwrap_or(DEFAULT_PUB_DATE)
        .to_string();

    let (source_name, source_url) = match child_named(item, "source") {
        Some(source) => {
            let name = source
                .first_child_label()
                .unwrap_or(DEFAULT_SOURCE_NAME)
                .to_string();
            let url = if source.has_attribute("url") {
                source.attribute("url")?.to_string()
            } else {
                String::new()
            };
            (name, url)
        }
        None => (DEFAULT_SOURCE_NAME.to_string(), String::new()),
    };

    let news = match non_empty_text(item, "title") {
        Some(title) => title.to_string(),
        None => match non_empty_text(item, "description") {
            Some(description) => strip_tags(description).into_owned(),
            None => DEFAULT_NEWS_TEXT.to_string(),
        },
    };

    let link = child_named(item, "link")
        .map(|node| node.first_child_label().unwrap_or_default().to_string());

    Ok(ItemFields {
        pub_date,
        source_name,
        source_url,
        news,
        link,
    })
}

/// One `<feed url=".." file=".." name=".."/>` entry of the feed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Where the RSS document lives: an http(s) URL or a local path.
    pub url: String,
    /// Output path of the generated page, also the index link target.
    pub file: String,
    /// Display label in the index.
    pub name: String,
}

impl FeedEntry {
    /// Reads the three required attributes of the `index`-th `<feed>`, counting
    /// from zero and ignoring other siblings.
    pub fn from_node(index: usize, node: &TreeNode) -> Result<Self, ContractError> {
        expect_element(node, "feed")?;

        let required = |attribute: &'static str| -> Result<String, ContractError> {
            if !node.has_attribute(attribute) {
                return Err(ContractError::MissingAttribute { index, attribute });
            }
            Ok(node.attribute(attribute)?.to_string())
        };

        Ok(Self {
            url: required("url")?,
            file: required("file")?,
            name: required("name")?,
        })
    }
}

/// A validated feed-list document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedList {
    pub title: String,
    /// `<feed>` children in document order; other children are skipped.
    pub entries: Vec<FeedEntry>,
}

impl FeedList {
    /// Validates the feed-list root and collects its entries.
    ///
    /// All entries are checked before anything is returned, so an invalid
    /// entry aborts the run before a single page is written.
    ///
    /// # Errors
    ///
    /// - [`ContractError::InvalidFeedList`] if the root is not `<feeds>`,
    ///   has no `title` attribute, or has no children
    /// - [`ContractError::MissingAttribute`] for an incomplete `<feed>`
    pub fn from_tree(root: &TreeNode) -> Result<Self, ContractError> {
        if !root.is_element() || root.label() != "feeds" {
            return Err(ContractError::InvalidFeedList("root element is not <feeds>"));
        }
        if !root.has_attribute("title") {
            return Err(ContractError::InvalidFeedList(
                "<feeds> has no title attribute",
            ));
        }
        if root.child_count() == 0 {
            return Err(ContractError::InvalidFeedList("<feeds> lists no feeds"));
        }

        let title = root.attribute("title")?.to_string();
        let entries = root
            .children()
            .iter()
            .filter(|child| child.is_element() && child.label() == "feed")
            .enumerate()
            .map(|(index, child)| FeedEntry::from_node(index, child))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { title, entries })
    }
}
