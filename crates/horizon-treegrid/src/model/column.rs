//! Columns, comparers, and the expander capability.
//!
//! A column contributes a header, an optional comparison for sorting, and a
//! sort indicator. The one column that also implements [`Expander`] tells a
//! hierarchical source where each model's children live.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;

use super::SourceView;

/// Type alias for a model comparison function used for sorting.
pub type Comparer<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Type alias for a children selector.
pub type ChildrenFn<T> = Arc<dyn Fn(&T) -> Option<Arc<SourceView<T>>> + Send + Sync>;

/// Type alias for a has-children predicate.
pub type HasChildrenFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Sort order shown by a column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Applies this direction to an ascending comparer.
    pub fn apply<T: 'static>(self, comparer: Comparer<T>) -> Comparer<T> {
        match self {
            Self::Ascending => comparer,
            Self::Descending => Arc::new(move |a, b| comparer(a, b).reverse()),
        }
    }
}

/// A grid column over models of type `T`.
pub trait Column<T>: Send + Sync {
    /// Returns the header text.
    fn header(&self) -> &str;

    /// Returns a comparer for sorting in `direction`, or `None` if the column
    /// is not sortable.
    fn comparison(&self, direction: SortDirection) -> Option<Comparer<T>>;

    /// Returns the sort indicator currently shown.
    fn sort_direction(&self) -> Option<SortDirection>;

    /// Sets the sort indicator.
    fn set_sort_direction(&self, direction: Option<SortDirection>);
}

/// Maps a model to the view holding its children.
///
/// Implementations must return the same view instance for a model on every
/// call; row sets subscribe to it.
pub trait Expander<T>: Send + Sync {
    /// Returns the child view of `model`, if it has one.
    fn children(&self, model: &T) -> Option<Arc<SourceView<T>>>;

    /// Returns `true` if `model` has at least one child.
    fn has_children(&self, model: &T) -> bool {
        self.children(model).is_some_and(|view| !view.is_empty())
    }
}

/// A column with a header and an optional comparison.
pub struct ValueColumn<T> {
    header: String,
    comparer: Option<Comparer<T>>,
    direction: RwLock<Option<SortDirection>>,
}

impl<T: 'static> ValueColumn<T> {
    /// Creates an unsortable column.
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            comparer: None,
            direction: RwLock::new(None),
        }
    }

    /// Creates a column sorted by an ascending comparison function.
    pub fn with_comparer<F>(header: impl Into<String>, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            comparer: Some(Arc::new(compare)),
            ..Self::new(header)
        }
    }

    /// Creates a column sorted by a key extracted from each model.
    pub fn with_key<K, F>(header: impl Into<String>, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self::with_comparer(header, move |a, b| key(a).cmp(&key(b)))
    }

    /// Returns `true` if the column has a comparer.
    pub fn is_sortable(&self) -> bool {
        self.comparer.is_some()
    }
}

impl<T: 'static> Column<T> for ValueColumn<T> {
    fn header(&self) -> &str {
        &self.header
    }

    fn comparison(&self, direction: SortDirection) -> Option<Comparer<T>> {
        self.comparer
            .clone()
            .map(|comparer| direction.apply(comparer))
    }

    fn sort_direction(&self) -> Option<SortDirection> {
        *self.direction.read()
    }

    fn set_sort_direction(&self, direction: Option<SortDirection>) {
        *self.direction.write() = direction;
    }
}

/// A column that also supplies children, turning a source hierarchical.
pub struct ExpanderColumn<T> {
    inner: Box<dyn Column<T>>,
    children: ChildrenFn<T>,
    has_children: Option<HasChildrenFn<T>>,
}

impl<T: Clone + Send + Sync + 'static> ExpanderColumn<T> {
    /// Wraps `inner`, reading children through `children`.
    pub fn new<C, F>(inner: C, children: F) -> Self
    where
        C: Column<T> + 'static,
        F: Fn(&T) -> Option<Arc<SourceView<T>>> + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(inner),
            children: Arc::new(children),
            has_children: None,
        }
    }

    /// Overrides the has-children test, e.g. with a cheap flag on the model.
    pub fn with_has_children<F>(mut self, has_children: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.has_children = Some(Arc::new(has_children));
        self
    }
}

impl<T: Send + Sync> Column<T> for ExpanderColumn<T> {
    fn header(&self) -> &str {
        self.inner.header()
    }

    fn comparison(&self, direction: SortDirection) -> Option<Comparer<T>> {
        self.inner.comparison(direction)
    }

    fn sort_direction(&self) -> Option<SortDirection> {
        self.inner.sort_direction()
    }

    fn set_sort_direction(&self, direction: Option<SortDirection>) {
        self.inner.set_sort_direction(direction);
    }
}

impl<T: Send + Sync> Expander<T> for ExpanderColumn<T> {
    fn children(&self, model: &T) -> Option<Arc<SourceView<T>>> {
        (self.children)(model)
    }

    fn has_children(&self, model: &T) -> bool {
        match &self.has_children {
            Some(has_children) => has_children(model),
            None => self.children(model).is_some_and(|view| !view.is_empty()),
        }
    }
}

/// The ordered column set of a source.
pub struct Columns<T> {
    columns: Vec<Arc<dyn Column<T>>>,
    expander: Option<Arc<dyn Expander<T>>>,
}

impl<T> Default for Columns<T> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            expander: None,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Columns<T> {
    /// Creates an empty column set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    pub fn push<C: Column<T> + 'static>(&mut self, column: C) {
        self.columns.push(Arc::new(column));
    }

    /// Appends an expander column and makes it the set's expander.
    ///
    /// A later expander column replaces the earlier one as expander.
    pub fn push_expander(&mut self, column: ExpanderColumn<T>) {
        let column = Arc::new(column);
        self.expander = Some(column.clone());
        self.columns.push(column);
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the column at `index`.
    pub fn get(&self, index: usize) -> Option<&Arc<dyn Column<T>>> {
        self.columns.get(index)
    }

    /// Iterates over the columns in order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Column<T>>> {
        self.columns.iter()
    }

    /// Returns the expander, if an expander column was added.
    pub fn expander(&self) -> Option<Arc<dyn Expander<T>>> {
        self.expander.clone()
    }

    /// Clears every column's sort indicator.
    pub fn clear_sort_directions(&self) {
        for column in &self.columns {
            column.set_sort_direction(None);
        }
    }

    /// Shows `direction` on the column at `index` and clears all others.
    ///
    /// Returns `false` (and changes nothing) if `index` is out of range.
    pub fn set_sort_direction(&self, index: usize, direction: SortDirection) -> bool {
        if index >= self.columns.len() {
            return false;
        }
        for (i, column) in self.columns.iter().enumerate() {
            column.set_sort_direction((i == index).then_some(direction));
        }
        true
    }

    /// Returns the column currently showing a sort indicator.
    pub fn sorted_column(&self) -> Option<(usize, SortDirection)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(i, column)| column.sort_direction().map(|direction| (i, direction)))
    }
}

impl<T> std::fmt::Debug for Columns<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.columns.iter().map(|column| column.header()))
            .finish()
    }
}
