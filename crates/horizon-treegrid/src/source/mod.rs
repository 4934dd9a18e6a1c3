//! Grid sources: columns, rows, sorting, and drag-and-drop in one place.
//!
//! A source binds a [`Columns`] set to a row set and answers the questions a
//! grid view asks: how many rows, what is at row `i`, which row shows this
//! address, and can these rows be moved there.
//!
//! - [`FlatSource`]: one row per item, depth-1 addresses
//! - [`HierarchicalSource`]: expandable rows over a tree of views

mod drag_drop;
mod flat;
mod hierarchical;

use std::sync::Arc;

use horizon_treegrid_core::logging::targets;
use horizon_treegrid_core::Signal;

use crate::error::Result;
use crate::model::{Address, CollectionChange, Columns, Comparer, Row, RowSelection, SortDirection};

pub use flat::{FlatSource, FlatSourceBuilder};
pub use hierarchical::{HierarchicalSource, HierarchicalSourceBuilder};

/// Where dropped rows land relative to the target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropPosition {
    /// Immediately before the target in its parent list.
    Before,
    /// Immediately after the target in its parent list.
    After,
    /// Appended to the target's children.
    Inside,
}

/// The operation a drag requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DragEffect {
    /// Move the rows (the only supported effect).
    #[default]
    Move,
    /// Copy the rows.
    Copy,
    /// Link to the rows.
    Link,
}

/// Arguments of [`GridSource::sorted`]: the sorted column and direction, or
/// `None` once sorting is cleared.
pub type SortState = Option<(usize, SortDirection)>;

/// The operations a tree grid needs from its data source.
pub trait GridSource<T>: Send + Sync {
    /// Returns the column set.
    fn columns(&self) -> &Columns<T>;

    /// Returns the number of visible rows.
    fn row_count(&self) -> usize;

    /// Returns the visible row at `index`.
    fn row(&self, index: usize) -> Option<Row<T>>;

    /// Returns `true` for sources whose rows can nest.
    fn is_hierarchical(&self) -> bool;

    /// Returns `true` while a sort is active.
    fn is_sorted(&self) -> bool;

    /// Sorts by the column at `column`.
    ///
    /// Returns `false` (and changes nothing) if the column does not exist or
    /// cannot sort.
    fn sort_by(&self, column: usize, direction: SortDirection) -> bool;

    /// Restores source order and clears every sort indicator.
    fn clear_sort(&self);

    /// Moves the items at `addresses` to `position` relative to `target`.
    ///
    /// Returns `Ok(false)` when the move is refused without error: the rows
    /// are sorted, nothing was given to move, or the target lies inside a
    /// moved subtree.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedEffect`](crate::Error::UnsupportedEffect) for any effect but `Move`
    /// - [`Error::InvalidDropPosition`](crate::Error::InvalidDropPosition) for `Inside` on a flat source
    /// - [`Error::AddressNotFound`](crate::Error::AddressNotFound) if an address does not resolve
    /// - [`Error::ReadOnlyList`](crate::Error::ReadOnlyList) if an affected list is read-only
    fn drag_drop_rows(
        &self,
        addresses: &[Address],
        target: &Address,
        position: DropPosition,
        effect: DragEffect,
    ) -> Result<bool>;

    /// Moves the currently selected items. See [`drag_drop_rows`](Self::drag_drop_rows).
    fn drag_drop_selection(&self, target: &Address, position: DropPosition, effect: DragEffect) -> Result<bool> {
        let addresses = self
            .selection()
            .map(|selection| selection.selected_addresses())
            .unwrap_or_default();
        self.drag_drop_rows(&addresses, target, position, effect)
    }

    /// Returns the model address shown at row `row`.
    fn row_index_to_model_index(&self, row: usize) -> Option<Address>;

    /// Returns the row showing `address`.
    ///
    /// `hint` is the row the caller expects; a stale or out-of-range hint
    /// still finds the row.
    fn model_index_to_row_index(&self, address: &Address, hint: usize) -> Option<usize>;

    /// Signal emitted for every change to the visible rows.
    fn rows_changed(&self) -> &Signal<CollectionChange>;

    /// Signal emitted after the sort changes.
    fn sorted(&self) -> &Signal<SortState>;

    /// Returns the selection model the source reads for drag-and-drop.
    fn selection(&self) -> Option<Arc<dyn RowSelection>>;
}

/// Looks up the comparer for `column` and updates the sort indicators.
///
/// Returns `None` and leaves the indicators alone if the column does not
/// exist or cannot sort.
fn column_comparer<T: Clone + Send + Sync + 'static>(
    columns: &Columns<T>,
    column: usize,
    direction: SortDirection,
) -> Option<Comparer<T>> {
    let Some(comparer) = columns.get(column).and_then(|c| c.comparison(direction)) else {
        tracing::debug!(target: targets::SORT, column, "column cannot sort");
        return None;
    };
    columns.set_sort_direction(column, direction);
    Some(comparer)
}
