//! Change-notifying collections that feed row sets.
//!
//! `SourceView<T>` wraps one external collection and announces every
//! committed mutation through [`SourceView::changed`]. It owns no tree
//! semantics; hierarchy comes from an [`Expander`](super::Expander) that maps
//! a model to the view holding its children.

use std::ops::Deref;
use std::sync::Arc;

use horizon_treegrid_core::Signal;
use parking_lot::{RwLock, RwLockReadGuard};

/// A range mutation of an ordered collection.
///
/// The same vocabulary describes both source-collection changes and changes
/// to the flattened row sequence derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionChange {
    /// `count` items now occupy `start..start + count`; later items shifted up.
    Inserted { start: usize, count: usize },
    /// `count` items that occupied `start..start + count` are gone.
    Removed { start: usize, count: usize },
    /// The items at `start..start + count` were swapped for new ones.
    Replaced { start: usize, count: usize },
    /// Anything may have changed; re-read everything.
    Reset,
}

impl CollectionChange {
    /// Describes a splice of `removed` old items for `inserted` new ones at
    /// `start` as the smallest list of changes.
    pub fn splice(start: usize, removed: usize, inserted: usize) -> Vec<Self> {
        match (removed, inserted) {
            (0, 0) => Vec::new(),
            (0, count) => vec![Self::Inserted { start, count }],
            (count, 0) => vec![Self::Removed { start, count }],
            (r, i) if r == i => vec![Self::Replaced { start, count: r }],
            (r, i) if r < i => vec![
                Self::Replaced { start, count: r },
                Self::Inserted {
                    start: start + r,
                    count: i - r,
                },
            ],
            (r, i) => vec![
                Self::Replaced { start, count: i },
                Self::Removed {
                    start: start + i,
                    count: r - i,
                },
            ],
        }
    }
}

/// A uniform, change-notifying, indexable wrapper around a collection.
///
/// Model handles are returned by value (`T: Clone`); use `Arc<Model>` or
/// cheap ids for large models. Mutators commit under the write lock, release
/// it, and only then emit [`changed`](Self::changed), so slots may read the
/// view. A view is mutated by a single owner at a time.
///
/// # Example
///
/// ```
/// use horizon_treegrid::model::{CollectionChange, SourceView};
///
/// let view = SourceView::new(vec!["a", "b"]);
/// view.changed.connect(|change| {
///     assert_eq!(*change, CollectionChange::Inserted { start: 2, count: 1 });
/// });
/// view.push("c");
/// assert_eq!(view.len(), 3);
/// ```
pub struct SourceView<T> {
    items: RwLock<Vec<T>>,
    read_only: bool,
    /// Emitted after each committed mutation.
    pub changed: Signal<CollectionChange>,
}

impl<T> SourceView<T> {
    /// Returns `true` if consumers must not restructure this view.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the view holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl<T: Clone + Send + Sync + 'static> SourceView<T> {
    /// Creates a view over `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            read_only: false,
            changed: Signal::new(),
        }
    }

    /// Creates a view whose contents consumers (drag-and-drop) must not
    /// restructure. The owner can still mutate it.
    pub fn read_only(items: Vec<T>) -> Self {
        Self {
            read_only: true,
            ..Self::new(items)
        }
    }

    /// Creates an empty view.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Convenience for `Arc::new(SourceView::new(items))`.
    pub fn shared(items: Vec<T>) -> Arc<Self> {
        Arc::new(Self::new(items))
    }

    /// Returns a clone of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    /// Returns read access to the items.
    ///
    /// Do not mutate the view while the guard is alive.
    pub fn items(&self) -> impl Deref<Target = Vec<T>> + '_ {
        self.items.read()
    }

    /// Copies the items into a vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Appends an item.
    pub fn push(&self, item: T) {
        let start = {
            let mut items = self.items.write();
            items.push(item);
            items.len() - 1
        };
        self.changed
            .emit(CollectionChange::Inserted { start, count: 1 });
    }

    /// Inserts an item at `index`. Returns `false` if `index > len()`.
    pub fn insert(&self, index: usize, item: T) -> bool {
        self.insert_many(index, vec![item])
    }

    /// Inserts `new_items` starting at `index`.
    ///
    /// Returns `false` (and changes nothing) if `index > len()`.
    pub fn insert_many(&self, index: usize, new_items: Vec<T>) -> bool {
        let count = new_items.len();
        {
            let mut items = self.items.write();
            if index > items.len() {
                return false;
            }
            items.splice(index..index, new_items);
        }
        if count > 0 {
            self.changed
                .emit(CollectionChange::Inserted { start: index, count });
        }
        true
    }

    /// Removes and returns the item at `index`.
    pub fn remove(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.items.write();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        self.changed.emit(CollectionChange::Removed {
            start: index,
            count: 1,
        });
        Some(removed)
    }

    /// Removes `count` items starting at `start`.
    ///
    /// Returns `None` (and changes nothing) if the range is out of bounds.
    pub fn remove_range(&self, start: usize, count: usize) -> Option<Vec<T>> {
        let removed: Vec<T> = {
            let mut items = self.items.write();
            let end = start.checked_add(count).filter(|&end| end <= items.len())?;
            items.drain(start..end).collect()
        };
        if count > 0 {
            self.changed
                .emit(CollectionChange::Removed { start, count });
        }
        Some(removed)
    }

    /// Replaces the item at `index`, returning the previous item.
    pub fn replace(&self, index: usize, item: T) -> Option<T> {
        let previous = {
            let mut items = self.items.write();
            let slot = items.get_mut(index)?;
            std::mem::replace(slot, item)
        };
        self.changed.emit(CollectionChange::Replaced {
            start: index,
            count: 1,
        });
        Some(previous)
    }

    /// Provides mutable access to an item via a closure.
    ///
    /// Emits `Replaced` for the item afterwards.
    pub fn modify<F, R>(&self, index: usize, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = {
            let mut items = self.items.write();
            f(items.get_mut(index)?)
        };
        self.changed.emit(CollectionChange::Replaced {
            start: index,
            count: 1,
        });
        Some(result)
    }

    /// Replaces all items.
    pub fn set_items(&self, items: Vec<T>) {
        *self.items.write() = items;
        self.changed.emit(CollectionChange::Reset);
    }

    /// Removes all items.
    pub fn clear(&self) {
        self.items.write().clear();
        self.changed.emit(CollectionChange::Reset);
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> SourceView<T> {
    /// Returns the offset of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.read().iter().position(|candidate| candidate == item)
    }
}

impl<T> std::fmt::Debug for SourceView<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items: RwLockReadGuard<'_, Vec<T>> = self.items.read();
        f.debug_struct("SourceView")
            .field("len", &items.len())
            .field("read_only", &self.read_only)
            .finish()
    }
}

/// Returns `true` if `a` and `b` are the same view instance.
pub fn same_view<T>(a: &Arc<SourceView<T>>, b: &Arc<SourceView<T>>) -> bool {
    Arc::ptr_eq(a, b)
}

static_assertions::assert_impl_all!(SourceView<String>: Send, Sync);
