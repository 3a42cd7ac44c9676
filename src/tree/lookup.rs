use super::TreeNode;

/// Which index wins when several direct children share a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    First,
    /// The default: RSS feeds with a duplicated tag use the later one.
    #[default]
    Last,
}

/// Index of the direct element child labelled `label`, last match winning.
///
/// Only direct children are scanned, never descendants. Text leaves are
/// ignored even when their content happens to equal `label`. Returns `None`
/// when nothing matches; callers treat that as "use the default".
pub fn find_child(node: &TreeNode, label: &str) -> Option<usize> {
    find_child_by(node, label, TieBreak::Last)
}

/// [`find_child`] with an explicit tie-break.
pub fn find_child_by(node: &TreeNode, label: &str, tie_break: TieBreak) -> Option<usize> {
    let mut matches = node
        .children()
        .iter()
        .enumerate()
        .filter(|(_, child)| child.is_element() && child.label() == label)
        .map(|(index, _)| index);

    match tie_break {
        TieBreak::First => matches.next(),
        TieBreak::Last => matches.last(),
    }
}

/// The child found by [`find_child`], as a node reference.
pub fn child_named<'a>(node: &'a TreeNode, label: &str) -> Option<&'a TreeNode> {
    find_child(node, label).and_then(|index| node.child(index).ok())
}
