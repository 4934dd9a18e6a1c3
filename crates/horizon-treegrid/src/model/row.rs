//! Visible rows of a flattened tree.

use slotmap::new_key_type;

use super::Address;

new_key_type! {
    /// Identifies a node's state in a hierarchical row set.
    ///
    /// Keys stay valid while the node's item remains in its parent list and
    /// the parent list remains evaluated.
    pub struct NodeKey;
}

/// Whether a row can be, and currently is, expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExpansionState {
    /// The item has no children.
    #[default]
    NotExpandable,
    /// The item has children that are hidden.
    Collapsed,
    /// The item's children are visible below it.
    Expanded,
}

impl ExpansionState {
    /// Returns `true` if the row has children, shown or not.
    pub fn is_expandable(self) -> bool {
        !matches!(self, Self::NotExpandable)
    }

    /// Returns `true` if the row's children are visible.
    pub fn is_expanded(self) -> bool {
        matches!(self, Self::Expanded)
    }
}

/// A single visible row.
///
/// Rows are snapshots: they are produced on demand from the row set and do
/// not track later changes.
#[derive(Clone)]
pub struct Row<T> {
    model: T,
    address: Address,
    display: Address,
    expansion: ExpansionState,
    node: Option<NodeKey>,
}

impl<T> Row<T> {
    pub(crate) fn new(
        model: T,
        address: Address,
        display: Address,
        expansion: ExpansionState,
        node: Option<NodeKey>,
    ) -> Self {
        Self {
            model,
            address,
            display,
            expansion,
            node,
        }
    }

    /// Returns the model item shown by this row.
    pub fn model(&self) -> &T {
        &self.model
    }

    /// Consumes the row, returning its model item.
    pub fn into_model(self) -> T {
        self.model
    }

    /// Returns the model address: source offsets from the root.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Returns the nesting depth; top-level rows have depth 1.
    pub fn depth(&self) -> usize {
        self.address.len()
    }

    /// Returns the row's expansion state.
    pub fn expansion(&self) -> ExpansionState {
        self.expansion
    }

    /// Returns the node backing this row, if it belongs to a hierarchical set.
    pub fn node(&self) -> Option<NodeKey> {
        self.node
    }

    /// Sibling positions after sorting. Equals `address` when unsorted.
    pub fn display(&self) -> &Address {
        &self.display
    }

    pub(crate) fn set_expansion(&mut self, expansion: ExpansionState) {
        self.expansion = expansion;
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Row<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Row")
            .field("address", &self.address)
            .field("expansion", &self.expansion)
            .field("model", &self.model)
            .finish()
    }
}
