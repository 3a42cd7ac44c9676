use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by tree accessors when a caller breaks their preconditions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// `attribute` was called for a key the element does not carry.
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),
    /// `child` was called with an index past the last child.
    #[error("Child index {index} out of range (node has {count} children)")]
    IndexOutOfRange { index: usize, count: usize },
    /// An element-only accessor was called on a text leaf.
    #[error("Text node has no {0}")]
    NotAnElement(&'static str),
}

/// One node of a materialized XML document.
///
/// A text leaf never has children or attributes; its label is the literal
/// text. Element-only accessors fail with [`TreeError::NotAnElement`] when
/// called on a text leaf instead of returning an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Element(Element),
    Text(String),
}

/// An element: tag name, unique attribute keys, ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<TreeNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attribute`].
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Builder form of [`Element::push_child`].
    pub fn with_child(mut self, child: impl Into<TreeNode>) -> Self {
        self.push_child(child);
        self
    }

    /// Appends a text leaf.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(TreeNode::Text(text.into()))
    }

    /// Sets an attribute, replacing any previous value for the same key.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn push_child(&mut self, child: impl Into<TreeNode>) {
        self.children.push(child.into());
    }

    /// Appends text, merging with a trailing text leaf so that adjacent runs
    /// (text followed by CDATA, for instance) stay a single child.
    pub fn push_text(&mut self, text: &str) {
        if let Some(TreeNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(TreeNode::Text(text.to_string()));
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }
}

impl From<Element> for TreeNode {
    fn from(element: Element) -> Self {
        TreeNode::Element(element)
    }
}

impl TreeNode {
    /// Creates a text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        TreeNode::Text(text.into())
    }

    /// Tag name for elements, literal content for text leaves.
    pub fn label(&self) -> &str {
        match self {
            TreeNode::Element(e) => &e.name,
            TreeNode::Text(t) => t,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, TreeNode::Element(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            TreeNode::Element(e) => Some(e),
            TreeNode::Text(_) => None,
        }
    }

    /// Returns true if this is an element carrying `key`.
    ///
    /// Text leaves have no attributes, so this is `false` for them rather
    /// than an error; it is the guard callers use before [`TreeNode::attribute`].
    pub fn has_attribute(&self, key: &str) -> bool {
        self.as_element()
            .is_some_and(|e| e.attributes.contains_key(key))
    }

    /// Value of attribute `key`.
    ///
    /// # Errors
    ///
    /// - [`TreeError::NotAnElement`] on a text leaf
    /// - [`TreeError::AttributeNotFound`] if the element lacks `key`
    pub fn attribute(&self, key: &str) -> Result<&str, TreeError> {
        let element = self
            .as_element()
            .ok_or(TreeError::NotAnElement("attributes"))?;
        element
            .attributes
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| TreeError::AttributeNotFound(key.to_string()))
    }

    /// Number of children; always zero for text leaves.
    pub fn child_count(&self) -> usize {
        match self {
            TreeNode::Element(e) => e.children.len(),
            TreeNode::Text(_) => 0,
        }
    }

    /// Child at `index`.
    ///
    /// # Errors
    ///
    /// - [`TreeError::NotAnElement`] on a text leaf
    /// - [`TreeError::IndexOutOfRange`] if `index >= child_count()`
    pub fn child(&self, index: usize) -> Result<&TreeNode, TreeError> {
        let element = self
            .as_element()
            .ok_or(TreeError::NotAnElement("children"))?;
        element.children.get(index).ok_or(TreeError::IndexOutOfRange {
            index,
            count: element.children.len(),
        })
    }

    /// Children in document order; empty for text leaves.
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Element(e) => &e.children,
            TreeNode::Text(_) => &[],
        }
    }

    /// The conventional text content of an element: the label of its first
    /// child, or `None` when the element is childless.
    pub fn first_child_label(&self) -> Option<&str> {
        self.children().first().map(TreeNode::label)
    }
}
