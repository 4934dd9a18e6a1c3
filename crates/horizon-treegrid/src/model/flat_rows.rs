//! One row per item of a single source view.
//!
//! `FlatRows<T>` projects a [`SourceView`] 1:1 onto rows, optionally through
//! a stable sort. Unsorted, source changes are forwarded with identical
//! ranges; sorted, each inserted item is placed by binary search and reported
//! on its own.

use std::sync::{Arc, Weak};

use horizon_treegrid_core::logging::targets;
use horizon_treegrid_core::{ConnectionId, Signal};
use parking_lot::RwLock;

use super::{Address, CollectionChange, Comparer, ExpansionState, Row, SourceView};

struct FlatState<T> {
    view: Arc<SourceView<T>>,
    connection: ConnectionId,
    comparer: Option<Comparer<T>>,
    /// Row index to source index.
    order: Vec<usize>,
    /// Source index to row index.
    positions: Vec<usize>,
}

impl<T: Clone + Send + Sync + 'static> FlatState<T> {
    fn rebuild(&mut self) {
        let items = self.view.items();
        let mut order: Vec<usize> = (0..items.len()).collect();
        if let Some(comparer) = &self.comparer {
            order.sort_by(|&a, &b| comparer(&items[a], &items[b]));
        }
        drop(items);
        self.order = order;
        self.reindex();
    }

    fn reindex(&mut self) {
        self.positions = vec![0; self.order.len()];
        for (row, &source) in self.order.iter().enumerate() {
            self.positions[source] = row;
        }
    }

    /// Row index at which source item `source` belongs, ties broken by
    /// source order.
    fn insertion_point(&self, items: &[T], source: usize) -> usize {
        let Some(comparer) = &self.comparer else {
            return source;
        };
        self.order.partition_point(|&other| {
            match comparer(&items[other], &items[source]) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Equal => other < source,
                std::cmp::Ordering::Greater => false,
            }
        })
    }

    fn apply(&mut self, change: CollectionChange) -> Vec<CollectionChange> {
        if self.comparer.is_none() {
            self.order = (0..self.view.len()).collect();
            self.reindex();
            return vec![change];
        }

        let mut changes = Vec::new();
        match change {
            CollectionChange::Inserted { start, count } => {
                for source in &mut self.order {
                    if *source >= start {
                        *source += count;
                    }
                }
                let view = self.view.clone();
                let items = view.items();
                if items.len() != self.order.len() + count {
                    drop(items);
                    return self.reset();
                }
                for source in start..start + count {
                    let row = self.insertion_point(&items, source);
                    self.order.insert(row, source);
                    changes.push(CollectionChange::Inserted { start: row, count: 1 });
                }
            }
            CollectionChange::Removed { start, count } => {
                let end = start + count;
                if end > self.order.len() {
                    return self.reset();
                }
                let mut rows: Vec<usize> = (start..end).map(|source| self.positions[source]).collect();
                rows.sort_unstable_by(|a, b| b.cmp(a));
                for row in rows {
                    self.order.remove(row);
                    changes.push(CollectionChange::Removed { start: row, count: 1 });
                }
                for source in &mut self.order {
                    if *source >= end {
                        *source -= count;
                    }
                }
            }
            CollectionChange::Replaced { start, count } => {
                let view = self.view.clone();
                let items = view.items();
                if start + count > self.order.len() || items.len() != self.order.len() {
                    drop(items);
                    return self.reset();
                }
                for source in start..start + count {
                    if let Some(row) = self.order.iter().position(|&s| s == source) {
                        self.order.remove(row);
                        changes.push(CollectionChange::Removed { start: row, count: 1 });
                    }
                    let row = self.insertion_point(&items, source);
                    self.order.insert(row, source);
                    changes.push(CollectionChange::Inserted { start: row, count: 1 });
                }
            }
            CollectionChange::Reset => return self.reset(),
        }
        self.reindex();
        changes
    }

    fn reset(&mut self) -> Vec<CollectionChange> {
        self.rebuild();
        vec![CollectionChange::Reset]
    }

    fn row(&self, index: usize) -> Option<Row<T>> {
        let source = *self.order.get(index)?;
        let model = self.view.get(source)?;
        Some(Row::new(
            model,
            Address::new(source),
            Address::new(index),
            ExpansionState::NotExpandable,
            None,
        ))
    }
}

struct FlatShared<T> {
    state: RwLock<FlatState<T>>,
    rows_changed: Signal<CollectionChange>,
}

impl<T: Clone + Send + Sync + 'static> FlatShared<T> {
    fn on_source_changed(&self, change: CollectionChange) {
        let changes = self.state.write().apply(change);
        tracing::debug!(
            target: targets::ROWS,
            ?change,
            forwarded = changes.len(),
            "flat source changed"
        );
        for change in changes {
            self.rows_changed.emit(change);
        }
    }

    fn subscribe(this: &Arc<Self>, view: &Arc<SourceView<T>>) -> ConnectionId {
        let weak: Weak<Self> = Arc::downgrade(this);
        view.changed.connect(move |change| {
            if let Some(shared) = weak.upgrade() {
                shared.on_source_changed(*change);
            }
        })
    }
}

impl<T> Drop for FlatShared<T> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        state.view.changed.disconnect(state.connection);
    }
}

/// A flat, optionally sorted, projection of one source view.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_treegrid::model::{Address, FlatRows, SourceView};
///
/// let view = SourceView::shared(vec![3, 1, 2]);
/// let rows = FlatRows::new(view.clone());
///
/// rows.sort(Some(Arc::new(|a: &i32, b: &i32| a.cmp(b))));
/// assert_eq!(rows.row(0).map(|row| *row.model()), Some(1));
/// assert_eq!(rows.row_index_to_address(0), Some(Address::new(1)));
/// ```
pub struct FlatRows<T> {
    shared: Arc<FlatShared<T>>,
}

impl<T: Clone + Send + Sync + 'static> FlatRows<T> {
    /// Creates rows for `view` in source order.
    pub fn new(view: Arc<SourceView<T>>) -> Self {
        let shared = Arc::new(FlatShared {
            state: RwLock::new(FlatState {
                view: view.clone(),
                connection: ConnectionId::default(),
                comparer: None,
                order: Vec::new(),
                positions: Vec::new(),
            }),
            rows_changed: Signal::new(),
        });
        let connection = FlatShared::subscribe(&shared, &view);
        {
            let mut state = shared.state.write();
            state.connection = connection;
            state.rebuild();
        }
        Self { shared }
    }

    /// Signal emitted for every change to the row sequence.
    pub fn rows_changed(&self) -> &Signal<CollectionChange> {
        &self.shared.rows_changed
    }

    /// Returns the source view.
    pub fn items(&self) -> Arc<SourceView<T>> {
        self.shared.state.read().view.clone()
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.shared.state.read().order.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the row at `index`.
    pub fn row(&self, index: usize) -> Option<Row<T>> {
        self.shared.state.read().row(index)
    }

    /// Returns a snapshot of every row.
    pub fn rows(&self) -> Vec<Row<T>> {
        let state = self.shared.state.read();
        (0..state.order.len()).filter_map(|i| state.row(i)).collect()
    }

    /// Returns `true` if a comparer is active.
    pub fn is_sorted(&self) -> bool {
        self.shared.state.read().comparer.is_some()
    }

    /// Replaces the source view.
    pub fn set_items(&self, view: Arc<SourceView<T>>) {
        let connection = FlatShared::subscribe(&self.shared, &view);
        {
            let mut state = self.shared.state.write();
            state.view.changed.disconnect(state.connection);
            state.view = view;
            state.connection = connection;
            state.rebuild();
        }
        tracing::debug!(target: targets::ROWS, "flat rows reset");
        self.shared.rows_changed.emit(CollectionChange::Reset);
    }

    /// Sorts the rows; `None` restores source order.
    pub fn sort(&self, comparer: Option<Comparer<T>>) {
        {
            let mut state = self.shared.state.write();
            state.comparer = comparer;
            state.rebuild();
        }
        tracing::debug!(target: targets::SORT, "flat rows sorted");
        self.shared.rows_changed.emit(CollectionChange::Reset);
    }

    /// Returns the model index shown at row `index`.
    pub fn model_index_of(&self, index: usize) -> Option<usize> {
        self.shared.state.read().order.get(index).copied()
    }

    /// Returns the depth-1 address of the item at row `index`.
    pub fn row_index_to_address(&self, index: usize) -> Option<Address> {
        self.model_index_of(index).map(Address::new)
    }

    /// Returns the row showing `address`, checking `hint` first.
    pub fn address_to_row_index(&self, address: &Address, hint: usize) -> Option<usize> {
        if address.len() != 1 {
            return None;
        }
        let source = address[0];
        let state = self.shared.state.read();
        if state.order.get(hint) == Some(&source) {
            return Some(hint);
        }
        state.positions.get(source).copied()
    }
}

impl<T> std::fmt::Debug for FlatRows<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("FlatRows")
            .field("len", &state.order.len())
            .field("sorted", &state.comparer.is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(FlatRows<String>: Send, Sync);
