//! Flat grid source.

use std::sync::Arc;

use horizon_treegrid_core::logging::targets;
use horizon_treegrid_core::Signal;

use super::drag_drop::{move_rows, MoveContext, MoveRequest};
use super::{column_comparer, DragEffect, DropPosition, GridSource, SortState};
use crate::error::{Error, Result};
use crate::model::{
    Address, CollectionChange, Column, Columns, FlatRows, Row, RowSelection, SortDirection, SourceView,
};

/// A grid source showing one row per item of a single view.
///
/// # Example
///
/// ```
/// use horizon_treegrid::model::{Address, SortDirection, SourceView, ValueColumn};
/// use horizon_treegrid::source::{DragEffect, DropPosition, FlatSource, GridSource};
///
/// let items = SourceView::shared(vec!["A", "B", "C", "D"]);
/// let source = FlatSource::builder(items.clone())
///     .column(ValueColumn::with_key("Name", |s: &&'static str| *s))
///     .build()
///     .unwrap();
///
/// let moved = source
///     .drag_drop_rows(&[Address::new(1)], &Address::new(2), DropPosition::After, DragEffect::Move)
///     .unwrap();
/// assert!(moved);
/// assert_eq!(items.to_vec(), vec!["A", "C", "B", "D"]);
///
/// assert!(source.sort_by(0, SortDirection::Descending));
/// assert_eq!(source.row(0).map(|row| *row.model()), Some("D"));
/// ```
pub struct FlatSource<T> {
    rows: FlatRows<T>,
    columns: Columns<T>,
    selection: Option<Arc<dyn RowSelection>>,
    sorted: Signal<SortState>,
}

impl<T: Clone + Send + Sync + 'static> FlatSource<T> {
    /// Starts building a source over `items`.
    pub fn builder(items: Arc<SourceView<T>>) -> FlatSourceBuilder<T> {
        FlatSourceBuilder::new(items)
    }

    /// Returns the row set.
    pub fn rows(&self) -> &FlatRows<T> {
        &self.rows
    }

    /// Returns the backing view.
    pub fn items(&self) -> Arc<SourceView<T>> {
        self.rows.items()
    }

    /// Replaces the backing view. An active sort stays active.
    pub fn set_items(&self, items: Arc<SourceView<T>>) {
        self.rows.set_items(items);
    }
}

impl<T: Clone + Send + Sync + 'static> GridSource<T> for FlatSource<T> {
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
        false
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
        let items = self.rows.items();
        move_rows(
            MoveRequest {
                addresses,
                target,
                position,
                effect,
            },
            MoveContext {
                sorted: self.rows.is_sorted(),
                hierarchical: false,
            },
            |parent| parent.is_empty().then(|| items.clone()),
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

impl<T> std::fmt::Debug for FlatSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatSource")
            .field("rows", &self.rows)
            .field("columns", &self.columns)
            .finish()
    }
}

/// Builder for [`FlatSource`].
pub struct FlatSourceBuilder<T> {
    items: Arc<SourceView<T>>,
    columns: Columns<T>,
    selection: Option<Arc<dyn RowSelection>>,
    sort: Option<(usize, SortDirection)>,
}

impl<T: Clone + Send + Sync + 'static> FlatSourceBuilder<T> {
    /// Creates a builder over `items`.
    pub fn new(items: Arc<SourceView<T>>) -> Self {
        Self {
            items,
            columns: Columns::new(),
            selection: None,
            sort: None,
        }
    }

    /// Appends a column.
    pub fn column<C: Column<T> + 'static>(mut self, column: C) -> Self {
        self.columns.push(column);
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
    /// # Errors
    ///
    /// [`Error::NoColumns`] if no column was added.
    pub fn build(self) -> Result<FlatSource<T>> {
        if self.columns.is_empty() {
            tracing::warn!(target: targets::SOURCE, "flat source built without columns");
            return Err(Error::NoColumns);
        }
        let source = FlatSource {
            rows: FlatRows::new(self.items),
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

static_assertions::assert_impl_all!(FlatSource<String>: Send, Sync);
