//! Hierarchical grid source.

use std::ops::Deref;
use std::sync::Arc;

use horizon_treegrid_core::logging::targets;
use horizon_treegrid_core::Signal;

use super::drag_drop::{move_rows, MoveContext, MoveRequest};
use super::{column_comparer, DragEffect, DropPosition, GridSource, SortState};
use crate::error::{Error, Result};
use crate::model::{
    Address, CollectionChange, Column, Columns, ExpanderColumn, HierarchicalRows, Row, RowSelection,
    SortDirection, SourceView,
};

/// A grid source showing expandable rows over a tree of views.
///
/// Children come from the expander column. Expansion, sorting, and source
/// mutations keep the row sequence in pre-order.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_treegrid::model::{Address, ExpanderColumn, SourceView, ValueColumn};
/// use horizon_treegrid::source::{DragEffect, DropPosition, GridSource, HierarchicalSource};
///
/// #[derive(Clone)]
/// struct Node {
///     name: &'static str,
///     children: Arc<SourceView<Node>>,
/// }
///
/// fn node(name: &'static str, children: Vec<Node>) -> Node {
///     Node { name, children: SourceView::shared(children) }
/// }
///
/// let roots = SourceView::shared(vec![
///     node("F1", vec![node("x", vec![]), node("y", vec![])]),
///     node("F2", vec![node("p", vec![]), node("q", vec![])]),
/// ]);
/// let source = HierarchicalSource::builder(roots.clone())
///     .expander_column(ExpanderColumn::new(
///         ValueColumn::with_key("Name", |n: &Node| n.name),
///         |n: &Node| Some(n.children.clone()),
///     ))
///     .build()
///     .unwrap();
///
/// source.expand(&Address::new(1)).unwrap();
/// assert_eq!(source.row_count(), 4);
///
/// let moved = source
///     .drag_drop_rows(&[Address::from([0, 0])], &Address::new(1), DropPosition::Inside, DragEffect::Move)
///     .unwrap();
/// assert!(moved);
/// assert_eq!(source.row_count(), 5);
/// assert_eq!(source.row(4).map(|row| row.model().name), Some("x"));
/// ```
pub struct HierarchicalSource<T> {
    rows: HierarchicalRows<T>,
    columns: Columns<T>,
    selection: Option<Arc<dyn RowSelection>>,
    sorted: Signal<SortState>,
}

impl<T: Clone + Send + Sync + 'static> HierarchicalSource<T> {
    /// Starts building a source over the root view `items`.
    pub fn builder(items: Arc<SourceView<T>>) -> HierarchicalSourceBuilder<T> {
        HierarchicalSourceBuilder::new(items)
    }

    /// Returns the row set.
    pub fn rows(&self) -> &HierarchicalRows<T> {
        &self.rows
    }

    /// Returns the root view.
    pub fn items(&self) -> Option<Arc<SourceView<T>>> {
        self.rows.items()
    }

    /// Replaces the root view. Expansion state is discarded.
    pub fn set_items(&self, items: Arc<SourceView<T>>) {
        self.rows.set_items(items);
    }

    /// Returns the model at `address`, visible or not.
    pub fn model_at(&self, address: &Address) -> Option<T> {
        self.rows.model_at(address)
    }

    /// Returns read access to the visible rows.
    pub fn visible_rows(&self) -> impl Deref<Target = [Row<T>]> + '_ {
        self.rows.rows()
    }

    /// Expands the node at `address`. See [`HierarchicalRows::expand`].
    pub fn expand(&self, address: &Address) -> Result<bool> {
        self.rows.expand(address)
    }

    /// Collapses the node at `address`. See [`HierarchicalRows::collapse`].
    pub fn collapse(&self, address: &Address) -> Result<bool> {
        self.rows.collapse(address)
    }

    /// Returns `true` if the node at `address` is marked expanded.
    pub fn is_expanded(&self, address: &Address) -> bool {
        self.rows.is_expanded(address)
    }

    /// Expands every node that has children.
    pub fn expand_all(&self) -> Result<()> {
        self.rows.expand_all()
    }

    /// Collapses every node.
    pub fn collapse_all(&self) {
        self.rows.collapse_all();
    }

    /// Signal emitted with the address of each expanded node.
    pub fn expanded(&self) -> &Signal<Address> {
        self.rows.expanded()
    }

    /// Signal emitted with the address of each collapsed node.
    pub fn collapsed(&self) -> &Signal<Address> {
        self.rows.collapsed()
    }
}

impl<T: Clone + Send + Sync + 'static> GridSource<T> for HierarchicalSource<T> {
    fn columns(&self) -> &Columns<T> {
        &self.columns
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> Option<Row<T>> {
        self.rows.row(index)
    }

    fn is_hierarchical(&self) -> bool {
        true
    }

    fn is_sorted(&self) -> bool {
        self.rows.is_sorted()
    }

    fn sort_by(&self, column: usize, direction: SortDirection) -> bool {
        let Some(comparer) = column_comparer(&self.columns, column, direction) else {
            return false;
        };
        self.rows.sort(Some(comparer));
        self.sorted.emit(Some((column, direction)));
        true
    }

    fn clear_sort(&self) {
        self.columns.clear_sort_directions();
        self.rows.sort(None);
        self.sorted.emit(None);
    }

    fn drag_drop_rows(
        &self,
        addresses: &[Address],
        target: &Address,
        position: DropPosition,
        effect: DragEffect,
    ) -> Result<bool> {
        move_rows(
            MoveRequest {
                addresses,
                target,
                position,
                effect,
            },
            MoveContext {
                sorted: self.rows.is_sorted(),
                hierarchical: true,
            },
            |parent| self.rows.children_view(parent),
        )
    }

    fn row_index_to_model_index(&self, row: usize) -> Option<Address> {
        self.rows.row_index_to_address(row)
    }

    fn model_index_to_row_index(&self, address: &Address, hint: usize) -> Option<usize> {
        self.rows.address_to_row_index(address, hint)
    }

    fn rows_changed(&self) -> &Signal<CollectionChange> {
        self.rows.rows_changed()
    }

    fn sorted(&self) -> &Signal<SortState> {
        &self.sorted
    }

    fn selection(&self) -> Option<Arc<dyn RowSelection>> {
        self.selection.clone()
    }
}

impl<T> std::fmt::Debug for HierarchicalSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchicalSource")
            .field("rows", &self.rows)
            .field("columns", &self.columns)
            .finish()
    }
}

/// Builder for [`HierarchicalSource`].
pub struct HierarchicalSourceBuilder<T> {
    items: Arc<SourceView<T>>,
    columns: Columns<T>,
    selection: Option<Arc<dyn RowSelection>>,
    sort: Option<(usize, SortDirection)>,
}

impl<T: Clone + Send + Sync + 'static> HierarchicalSourceBuilder<T> {
    /// Creates a builder over the root view `items`.
    pub fn new(items: Arc<SourceView<T>>) -> Self {
        Self {
            items,
            columns: Columns::new(),
            selection: None,
            sort: None,
        }
    }

    /// Appends a plain column.
    pub fn column<C: Column<T> + 'static>(mut self, column: C) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends the column that supplies children.
    pub fn expander_column(mut self, column: ExpanderColumn<T>) -> Self {
        self.columns.push_expander(column);
        self
    }

    /// Uses a prepared column set.
    pub fn with_columns(mut self, columns: Columns<T>) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the selection read by [`GridSource::drag_drop_selection`].
    pub fn with_selection(mut self, selection: Arc<dyn RowSelection>) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Sorts by `column` once built.
    pub fn with_sort(mut self, column: usize, direction: SortDirection) -> Self {
        self.sort = Some((column, direction));
        self
    }

    /// Builds the source.
    ///
    /// A source without an expander column shows only top-level rows and
    /// rejects expansion with [`Error::NoExpander`].
    ///
    /// # Errors
    ///
    /// [`Error::NoColumns`] if no column was added.
    pub fn build(self) -> Result<HierarchicalSource<T>> {
        if self.columns.is_empty() {
            tracing::warn!(target: targets::SOURCE, "hierarchical source built without columns");
            return Err(Error::NoColumns);
        }
        if self.columns.expander().is_none() {
            tracing::warn!(target: targets::SOURCE, "hierarchical source has no expander column");
        }
        let source = HierarchicalSource {
            rows: HierarchicalRows::new(self.items, self.columns.expander()),
            columns: self.columns,
            selection: self.selection,
            sorted: Signal::new(),
        };
        if let Some((column, direction)) = self.sort
            && !source.sort_by(column, direction)
        {
            tracing::debug!(target: targets::SOURCE, column, "initial sort column cannot sort");
        }
        Ok(source)
    }
}

static_assertions::assert_impl_all!(HierarchicalSource<String>: Send, Sync);
