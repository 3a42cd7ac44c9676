//! In-memory document tree and child lookup.
//!
//! - [`node`] - [`TreeNode`], a tagged `Element`/`Text` variant with
//!   precondition-checked accessors
//! - [`lookup`] - label search over direct children

mod lookup;
mod node;

pub use lookup::{child_named, find_child, find_child_by, TieBreak};
pub use node::{Element, TreeError, TreeNode};
