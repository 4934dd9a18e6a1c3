//! Flattened, expandable rows over a tree of source views.
//!
//! `HierarchicalRows<T>` keeps one node per item whose parent list has been
//! evaluated. Each node remembers whether it is expanded, even while hidden
//! under a collapsed ancestor. The visible rows are the pre-order walk of the
//! root's children and, recursively, of every expanded node's children.
//!
//! Children are evaluated lazily through the [`Expander`] the first time a
//! node becomes visible, is expanded, or is addressed. Every evaluated child
//! list is subscribed;
//! a change to it recomputes only the owning row's subtree and reports the
//! part of the row sequence that actually differs.
//!
//! # Ordering
//!
//! Every row carries a display path: its sibling positions after sorting.
//! The row sequence is strictly increasing in display-path order. With no
//! sort active the display path equals the model address, so rows are also
//! strictly increasing in [`Address`] order. Address lookups binary-search
//! on that order.

use std::ops::Deref;
use std::sync::{Arc, Weak};

use horizon_treegrid_core::logging::targets;
use horizon_treegrid_core::{ConnectionId, Signal};
use parking_lot::{RwLock, RwLockReadGuard};
use slotmap::SlotMap;

use super::{Address, CollectionChange, Comparer, ExpansionState, Expander, NodeKey, Row, SourceView};
use crate::error::{Error, Result};

/// The evaluated children of a node.
struct Children<T> {
    view: Arc<SourceView<T>>,
    /// Child node per source index.
    keys: Vec<NodeKey>,
    /// Display position to source index.
    order: Vec<usize>,
    /// Source index to display position.
    positions: Vec<usize>,
    connection: ConnectionId,
}

struct Node<T> {
    parent: Option<NodeKey>,
    /// Source index within the parent's list.
    index: usize,
    expanded: bool,
    children: Option<Children<T>>,
}

impl<T> Node<T> {
    fn new(parent: Option<NodeKey>, index: usize) -> Self {
        Self {
            parent,
            index,
            expanded: false,
            children: None,
        }
    }
}

struct State<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
    root: NodeKey,
    rows: Vec<Row<T>>,
    comparer: Option<Comparer<T>>,
    expander: Option<Arc<dyn Expander<T>>>,
    this: Weak<Shared<T>>,
}

fn sorted_order<T: Clone + Send + Sync + 'static>(
    view: &SourceView<T>,
    comparer: Option<&Comparer<T>>,
) -> Vec<usize> {
    let items = view.items();
    let mut order: Vec<usize> = (0..items.len()).collect();
    if let Some(comparer) = comparer {
        order.sort_by(|&a, &b| comparer(&items[a], &items[b]));
    }
    order
}

fn inverse(order: &[usize]) -> Vec<usize> {
    let mut positions = vec![0; order.len()];
    for (display, &source) in order.iter().enumerate() {
        positions[source] = display;
    }
    positions
}

/// Describes how `new` differs from `old`, both starting at row `start`.
///
/// Rows are matched by node identity from both ends; a matched row whose
/// expansion state changed is reported as replaced.
fn diff_rows<T>(start: usize, old: &[Row<T>], new: &[Row<T>]) -> Vec<CollectionChange> {
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| a.node() == b.node())
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a.node() == b.node())
        .count();

    let mut changes = Vec::new();
    for i in 0..prefix {
        if old[i].expansion() != new[i].expansion() {
            changes.push(CollectionChange::Replaced {
                start: start + i,
                count: 1,
            });
        }
    }
    changes.extend(CollectionChange::splice(
        start + prefix,
        old.len() - prefix - suffix,
        new.len() - prefix - suffix,
    ));
    for k in 0..suffix {
        let old_index = old.len() - suffix + k;
        let new_index = new.len() - suffix + k;
        if old[old_index].expansion() != new[new_index].expansion() {
            changes.push(CollectionChange::Replaced {
                start: start + new_index,
                count: 1,
            });
        }
    }
    changes
}

impl<T: Clone + Send + Sync + 'static> State<T> {
    fn new(
        view: Arc<SourceView<T>>,
        expander: Option<Arc<dyn Expander<T>>>,
        this: Weak<Shared<T>>,
    ) -> Self {
        let mut nodes = SlotMap::with_key();
        let mut root = Node::new(None, 0);
        root.expanded = true;
        let root = nodes.insert(root);
        let mut state = Self {
            nodes,
            root,
            rows: Vec::new(),
            comparer: None,
            expander,
            this,
        };
        state.attach_children(root, view);
        state
    }

    fn children(&self, key: NodeKey) -> Option<&Children<T>> {
        self.nodes.get(key)?.children.as_ref()
    }

    fn children_mut(&mut self, key: NodeKey) -> Option<&mut Children<T>> {
        self.nodes.get_mut(key)?.children.as_mut()
    }

    fn root_view(&self) -> Option<Arc<SourceView<T>>> {
        self.children(self.root).map(|children| children.view.clone())
    }

    fn model_of(&self, key: NodeKey) -> Option<T> {
        let node = self.nodes.get(key)?;
        self.children(node.parent?)?.view.get(node.index)
    }

    fn expansion(&self, key: NodeKey, model: &T) -> ExpansionState {
        match &self.expander {
            Some(expander) if expander.has_children(model) => {
                if self.nodes.get(key).is_some_and(|node| node.expanded) {
                    ExpansionState::Expanded
                } else {
                    ExpansionState::Collapsed
                }
            }
            _ => ExpansionState::NotExpandable,
        }
    }

    fn subscribe(&self, key: NodeKey, view: &Arc<SourceView<T>>) -> ConnectionId {
        let weak = self.this.clone();
        view.changed.connect(move |change| {
            if let Some(shared) = weak.upgrade() {
                shared.on_source_changed(key, *change);
            }
        })
    }

    fn new_child(&mut self, parent: NodeKey, index: usize) -> NodeKey {
        self.nodes.insert(Node::new(Some(parent), index))
    }

    fn attach_children(&mut self, key: NodeKey, view: Arc<SourceView<T>>) {
        let connection = self.subscribe(key, &view);
        let keys: Vec<NodeKey> = (0..view.len()).map(|i| self.new_child(key, i)).collect();
        if let Some(node) = self.nodes.get_mut(key) {
            node.children = Some(Children {
                view,
                keys,
                order: Vec::new(),
                positions: Vec::new(),
                connection,
            });
        }
        self.resort(key);
    }

    /// Evaluates the children of `key` if needed. Returns `false` if the node
    /// has no child list.
    fn ensure_children(&mut self, key: NodeKey) -> bool {
        if self.children(key).is_some() {
            return true;
        }
        let Some(expander) = self.expander.clone() else {
            return false;
        };
        let Some(view) = self.model_of(key).and_then(|model| expander.children(&model)) else {
            return false;
        };
        self.attach_children(key, view);
        true
    }

    fn resort(&mut self, key: NodeKey) {
        let comparer = self.comparer.clone();
        if let Some(children) = self.children_mut(key) {
            children.order = sorted_order(&children.view, comparer.as_ref());
            children.positions = inverse(&children.order);
        }
    }

    fn resort_all(&mut self) {
        let keys: Vec<NodeKey> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.children.is_some())
            .map(|(key, _)| key)
            .collect();
        for key in keys {
            self.resort(key);
        }
    }

    /// Drops every descendant of `key` and its subscriptions.
    fn release_children(&mut self, key: NodeKey) {
        let Some(children) = self.nodes.get_mut(key).and_then(|node| node.children.take()) else {
            return;
        };
        children.view.changed.disconnect(children.connection);
        for child in children.keys {
            self.remove_subtree(child);
        }
    }

    fn remove_subtree(&mut self, key: NodeKey) {
        self.release_children(key);
        self.nodes.remove(key);
    }

    fn reindex(&mut self, keys: &[NodeKey], from: usize) {
        for (index, &key) in keys.iter().enumerate().skip(from) {
            if let Some(node) = self.nodes.get_mut(key) {
                node.index = index;
            }
        }
    }

    fn push_children(&mut self, key: NodeKey, address: &Address, display: &Address, out: &mut Vec<Row<T>>) {
        if !self.ensure_children(key) {
            return;
        }
        let len = self.children(key).map_or(0, |children| children.order.len());
        for position in 0..len {
            let Some((source, child)) = self.children(key).and_then(|children| {
                let source = *children.order.get(position)?;
                Some((source, *children.keys.get(source)?))
            }) else {
                break;
            };
            self.push_row(child, address.append(source), display.append(position), out);
        }
    }

    fn push_row(&mut self, key: NodeKey, address: Address, display: Address, out: &mut Vec<Row<T>>) {
        let Some(model) = self.model_of(key) else {
            return;
        };
        // A visible row watches its child list so its expansion state follows it.
        self.ensure_children(key);
        let expansion = self.expansion(key, &model);
        out.push(Row::new(model, address.clone(), display.clone(), expansion, Some(key)));
        if expansion.is_expanded() {
            self.push_children(key, &address, &display, out);
        }
    }

    fn rebuild(&mut self) {
        let mut rows = Vec::with_capacity(self.rows.len());
        let root = Address::root();
        self.push_children(self.root, &root, &root, &mut rows);
        self.rows = rows;
    }

    /// Walks `address` through evaluated lists only.
    fn find(&self, address: &Address) -> Option<(NodeKey, Address)> {
        let mut key = self.root;
        let mut display = Vec::with_capacity(address.len());
        for offset in address {
            let children = self.children(key)?;
            key = *children.keys.get(offset)?;
            display.push(*children.positions.get(offset)?);
        }
        Some((key, Address::from(display)))
    }

    /// Walks `address`, evaluating children on the way.
    fn resolve(&mut self, address: &Address) -> Option<NodeKey> {
        let mut key = self.root;
        for offset in address {
            if !self.ensure_children(key) {
                return None;
            }
            key = *self.children(key)?.keys.get(offset)?;
        }
        Some(key)
    }

    /// Returns the model address and display path of `key`.
    fn paths_of(&self, key: NodeKey) -> Option<(Address, Address)> {
        let mut steps = Vec::new();
        let mut current = key;
        while current != self.root {
            let node = self.nodes.get(current)?;
            let parent = node.parent?;
            let position = *self.children(parent)?.positions.get(node.index)?;
            steps.push((node.index, position));
            current = parent;
        }
        let address = steps.iter().rev().map(|&(index, _)| index).collect();
        let display = steps.iter().rev().map(|&(_, position)| position).collect();
        Some((address, display))
    }

    fn search(&self, display: &Address) -> Option<usize> {
        self.rows
            .binary_search_by(|row| row.display().cmp(display))
            .ok()
    }

    fn row_index(&self, address: &Address, hint: usize) -> Option<usize> {
        for candidate in [Some(hint), hint.checked_add(1)].into_iter().flatten() {
            if self.rows.get(candidate).is_some_and(|row| row.address() == address) {
                return Some(candidate);
            }
        }
        let (key, display) = self.find(address)?;
        self.search(&display)
            .filter(|&index| self.rows[index].node() == Some(key))
    }

    fn row_of_key(&self, key: NodeKey) -> Option<usize> {
        let (_, display) = self.paths_of(key)?;
        self.search(&display)
            .filter(|&index| self.rows[index].node() == Some(key))
    }

    /// One past the last row of the subtree rooted at row `index`.
    fn subtree_end(&self, index: usize) -> usize {
        let depth = self.rows[index].depth();
        self.rows[index + 1..]
            .iter()
            .position(|row| row.depth() <= depth)
            .map_or(self.rows.len(), |offset| index + 1 + offset)
    }

    fn set_expanded_recursive(&mut self, key: NodeKey) {
        if !self.ensure_children(key) {
            return;
        }
        let keys = self.children(key).map(|children| children.keys.clone()).unwrap_or_default();
        for child in keys {
            let expandable = self
                .model_of(child)
                .is_some_and(|model| self.expansion(child, &model).is_expandable());
            if expandable {
                if let Some(node) = self.nodes.get_mut(child) {
                    node.expanded = true;
                }
                self.set_expanded_recursive(child);
            }
        }
    }

    /// Applies a change of the child list owned by `key` and returns the
    /// resulting row changes.
    fn apply_source_change(&mut self, key: NodeKey, change: CollectionChange) -> Vec<CollectionChange> {
        if self.children(key).is_none() {
            return Vec::new();
        }
        let span = if key == self.root {
            Some((0, self.rows.len()))
        } else {
            self.row_of_key(key).map(|index| (index, self.subtree_end(index)))
        };

        self.update_children(key, change);

        let Some((start, end)) = span else {
            return Vec::new();
        };
        if key == self.root && change == CollectionChange::Reset {
            self.rebuild();
            return vec![CollectionChange::Reset];
        }

        let mut fresh = Vec::with_capacity(end - start);
        if key == self.root {
            let root = Address::root();
            self.push_children(key, &root, &root, &mut fresh);
        } else if let Some((address, display)) = self.paths_of(key) {
            self.push_row(key, address, display, &mut fresh);
        }

        let changes = diff_rows(start, &self.rows[start..end], &fresh);
        tracing::debug!(
            target: targets::ROWS,
            start,
            removed = end - start,
            inserted = fresh.len(),
            "spliced rows after source change"
        );
        self.rows.splice(start..end, fresh);
        changes
    }

    fn update_children(&mut self, key: NodeKey, change: CollectionChange) {
        let Some((view, mut keys)) = self
            .children_mut(key)
            .map(|children| (children.view.clone(), std::mem::take(&mut children.keys)))
        else {
            return;
        };

        let consistent = match change {
            CollectionChange::Inserted { start, count } if start <= keys.len() => {
                let fresh: Vec<NodeKey> = (start..start + count).map(|i| self.new_child(key, i)).collect();
                keys.splice(start..start, fresh);
                self.reindex(&keys, start + count);
                true
            }
            CollectionChange::Removed { start, count } if start + count <= keys.len() => {
                let removed: Vec<NodeKey> = keys.drain(start..start + count).collect();
                for child in removed {
                    self.remove_subtree(child);
                }
                self.reindex(&keys, start);
                true
            }
            CollectionChange::Replaced { start, count } if start + count <= keys.len() => {
                for index in start..start + count {
                    self.remove_subtree(keys[index]);
                    keys[index] = self.new_child(key, index);
                }
                true
            }
            _ => false,
        };

        if !consistent || keys.len() != view.len() {
            for child in keys.drain(..) {
                self.remove_subtree(child);
            }
            keys = (0..view.len()).map(|i| self.new_child(key, i)).collect();
        }

        if let Some(children) = self.children_mut(key) {
            children.keys = keys;
        }
        self.resort(key);
    }
}

impl<T> Drop for State<T> {
    fn drop(&mut self) {
        for node in self.nodes.values() {
            if let Some(children) = &node.children {
                children.view.changed.disconnect(children.connection);
            }
        }
    }
}

struct Shared<T> {
    state: RwLock<State<T>>,
    rows_changed: Signal<CollectionChange>,
    expanded: Signal<Address>,
    collapsed: Signal<Address>,
}

impl<T: Clone + Send + Sync + 'static> Shared<T> {
    #[tracing::instrument(skip_all, target = "horizon_treegrid::rows", level = "trace")]
    fn on_source_changed(&self, key: NodeKey, change: CollectionChange) {
        let changes = self.state.write().apply_source_change(key, change);
        for change in changes {
            self.rows_changed.emit(change);
        }
    }
}

/// The flattened visible rows of a tree of source views.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_treegrid::model::{Address, Expander, HierarchicalRows, SourceView};
///
/// #[derive(Clone)]
/// struct Folder {
///     name: &'static str,
///     children: Option<Arc<SourceView<Folder>>>,
/// }
///
/// struct FolderChildren;
///
/// impl Expander<Folder> for FolderChildren {
///     fn children(&self, folder: &Folder) -> Option<Arc<SourceView<Folder>>> {
///         folder.children.clone()
///     }
/// }
///
/// let leaf = Folder { name: "notes.txt", children: None };
/// let docs = Folder { name: "docs", children: Some(SourceView::shared(vec![leaf])) };
/// let rows = HierarchicalRows::new(SourceView::shared(vec![docs]), Some(Arc::new(FolderChildren)));
///
/// assert_eq!(rows.len(), 1);
/// assert!(rows.expand(&Address::new(0)).unwrap());
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows.row(1).map(|row| row.model().name), Some("notes.txt"));
/// assert_eq!(rows.address_to_row_index(&Address::from([0, 0]), 0), Some(1));
/// ```
pub struct HierarchicalRows<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + Sync + 'static> HierarchicalRows<T> {
    /// Creates rows for the tree rooted at `view`.
    ///
    /// Without an expander every row is a leaf.
    pub fn new(view: Arc<SourceView<T>>, expander: Option<Arc<dyn Expander<T>>>) -> Self {
        let shared = Arc::new_cyclic(|this| Shared {
            state: RwLock::new(State::new(view, expander, this.clone())),
            rows_changed: Signal::new(),
            expanded: Signal::new(),
            collapsed: Signal::new(),
        });
        shared.state.write().rebuild();
        Self { shared }
    }

    /// Signal emitted for every change to the row sequence.
    pub fn rows_changed(&self) -> &Signal<CollectionChange> {
        &self.shared.rows_changed
    }

    /// Signal emitted with the address of each node that was expanded.
    pub fn expanded(&self) -> &Signal<Address> {
        &self.shared.expanded
    }

    /// Signal emitted with the address of each node that was collapsed.
    pub fn collapsed(&self) -> &Signal<Address> {
        &self.shared.collapsed
    }

    /// Returns `true` if an expander is configured.
    pub fn has_expander(&self) -> bool {
        self.shared.state.read().expander.is_some()
    }

    /// Returns the expander, if any.
    pub fn expander(&self) -> Option<Arc<dyn Expander<T>>> {
        self.shared.state.read().expander.clone()
    }

    /// Returns the root view.
    pub fn items(&self) -> Option<Arc<SourceView<T>>> {
        self.shared.state.read().root_view()
    }

    /// Returns the number of visible rows.
    pub fn len(&self) -> usize {
        self.shared.state.read().rows.len()
    }

    /// Returns `true` if no rows are visible.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the row at `index`.
    pub fn row(&self, index: usize) -> Option<Row<T>> {
        self.shared.state.read().rows.get(index).cloned()
    }

    /// Returns read access to the visible rows.
    ///
    /// Do not mutate any source view while the guard is alive.
    pub fn rows(&self) -> impl Deref<Target = [Row<T>]> + '_ {
        RwLockReadGuard::map(self.shared.state.read(), |state| state.rows.as_slice())
    }

    /// Returns the address shown at row `index`.
    pub fn row_index_to_address(&self, index: usize) -> Option<Address> {
        self.shared
            .state
            .read()
            .rows
            .get(index)
            .map(|row| row.address().clone())
    }

    /// Returns the row showing `address`, or `None` if it is hidden or missing.
    ///
    /// `hint` and `hint + 1` are checked before falling back to a binary
    /// search, so sequential lookups are constant time.
    pub fn address_to_row_index(&self, address: &Address, hint: usize) -> Option<usize> {
        self.shared.state.read().row_index(address, hint)
    }

    /// Returns `true` if the node at `address` is marked expanded.
    pub fn is_expanded(&self, address: &Address) -> bool {
        let state = self.shared.state.read();
        !address.is_empty()
            && state
                .find(address)
                .and_then(|(key, _)| state.nodes.get(key))
                .is_some_and(|node| node.expanded)
    }

    /// Returns the model at `address`, following the expander from the root.
    pub fn model_at(&self, address: &Address) -> Option<T> {
        let (view, expander) = {
            let state = self.shared.state.read();
            (state.root_view()?, state.expander.clone())
        };
        let mut view = view;
        let mut model: Option<T> = None;
        for offset in address {
            if let Some(parent) = &model {
                view = expander.as_ref()?.children(parent)?;
            }
            model = Some(view.get(offset)?);
        }
        model
    }

    /// Returns the child list of the node at `address`; the root view for the
    /// empty address.
    pub fn children_view(&self, address: &Address) -> Option<Arc<SourceView<T>>> {
        if address.is_empty() {
            return self.items();
        }
        let expander = self.expander()?;
        let model = self.model_at(address)?;
        expander.children(&model)
    }

    /// Expands the node at `address`.
    ///
    /// Returns `Ok(false)` if it is already expanded or has no children. A
    /// hidden node only records the flag; its children appear once every
    /// ancestor is expanded.
    #[tracing::instrument(skip_all, target = "horizon_treegrid::rows", level = "debug", fields(%address))]
    pub fn expand(&self, address: &Address) -> Result<bool> {
        let inserted = {
            let mut state = self.shared.state.write();
            let Some(expander) = state.expander.clone() else {
                tracing::warn!(target: targets::ROWS, "expand without an expander");
                return Err(Error::NoExpander);
            };
            let key = (!address.is_empty())
                .then(|| state.resolve(address))
                .flatten()
                .ok_or_else(|| Error::AddressNotFound(address.clone()))?;
            let Some(node) = state.nodes.get(key) else {
                return Err(Error::AddressNotFound(address.clone()));
            };
            if node.expanded {
                return Ok(false);
            }
            let has_children = state
                .model_of(key)
                .is_some_and(|model| expander.has_children(&model));
            if !has_children {
                return Ok(false);
            }
            if let Some(node) = state.nodes.get_mut(key) {
                node.expanded = true;
            }

            match state.row_of_key(key) {
                Some(index) => {
                    let display = state.rows[index].display().clone();
                    let mut children = Vec::new();
                    state.push_children(key, address, &display, &mut children);
                    state.rows[index].set_expansion(ExpansionState::Expanded);
                    let count = children.len();
                    state.rows.splice(index + 1..index + 1, children);
                    tracing::debug!(target: targets::ROWS, start = index + 1, inserted = count, "expanded");
                    (count > 0).then_some(CollectionChange::Inserted {
                        start: index + 1,
                        count,
                    })
                }
                None => None,
            }
        };

        if let Some(change) = inserted {
            self.shared.rows_changed.emit(change);
        }
        self.shared.expanded.emit(address.clone());
        Ok(true)
    }

    /// Collapses the node at `address`, hiding its descendants.
    ///
    /// Descendant expansion state is kept for the next expand.
    #[tracing::instrument(skip_all, target = "horizon_treegrid::rows", level = "debug", fields(%address))]
    pub fn collapse(&self, address: &Address) -> Result<bool> {
        let removed = {
            let mut state = self.shared.state.write();
            if state.expander.is_none() {
                tracing::warn!(target: targets::ROWS, "collapse without an expander");
                return Err(Error::NoExpander);
            }
            let key = (!address.is_empty())
                .then(|| state.resolve(address))
                .flatten()
                .ok_or_else(|| Error::AddressNotFound(address.clone()))?;
            match state.nodes.get_mut(key) {
                Some(node) if node.expanded => node.expanded = false,
                Some(_) => return Ok(false),
                None => return Err(Error::AddressNotFound(address.clone())),
            }

            match state.row_of_key(key) {
                Some(index) => {
                    let end = state.subtree_end(index);
                    state.rows.drain(index + 1..end);
                    if state.rows[index].expansion().is_expanded() {
                        state.rows[index].set_expansion(ExpansionState::Collapsed);
                    }
                    let count = end - index - 1;
                    tracing::debug!(target: targets::ROWS, start = index + 1, removed = count, "collapsed");
                    (count > 0).then_some(CollectionChange::Removed {
                        start: index + 1,
                        count,
                    })
                }
                None => None,
            }
        };

        if let Some(change) = removed {
            self.shared.rows_changed.emit(change);
        }
        self.shared.collapsed.emit(address.clone());
        Ok(true)
    }

    /// Expands every node that has children, evaluating the whole tree.
    pub fn expand_all(&self) -> Result<()> {
        {
            let mut state = self.shared.state.write();
            if state.expander.is_none() {
                tracing::warn!(target: targets::ROWS, "expand_all without an expander");
                return Err(Error::NoExpander);
            }
            let root = state.root;
            state.set_expanded_recursive(root);
            state.rebuild();
            tracing::debug!(target: targets::ROWS, rows = state.rows.len(), "expanded all");
        }
        self.shared.rows_changed.emit(CollectionChange::Reset);
        Ok(())
    }

    /// Collapses every node.
    pub fn collapse_all(&self) {
        {
            let mut state = self.shared.state.write();
            let root = state.root;
            for (key, node) in state.nodes.iter_mut() {
                node.expanded = key == root;
            }
            state.rebuild();
        }
        tracing::debug!(target: targets::ROWS, "collapsed all");
        self.shared.rows_changed.emit(CollectionChange::Reset);
    }

    /// Replaces the root view, dropping all node state.
    pub fn set_items(&self, view: Arc<SourceView<T>>) {
        {
            let mut state = self.shared.state.write();
            let root = state.root;
            state.release_children(root);
            state.attach_children(root, view);
            state.rebuild();
            tracing::debug!(target: targets::ROWS, rows = state.rows.len(), "items replaced");
        }
        self.shared.rows_changed.emit(CollectionChange::Reset);
    }

    /// Sorts siblings at every level; `None` restores source order.
    pub fn sort(&self, comparer: Option<Comparer<T>>) {
        {
            let mut state = self.shared.state.write();
            state.comparer = comparer;
            state.resort_all();
            state.rebuild();
        }
        tracing::debug!(target: targets::SORT, "hierarchical rows sorted");
        self.shared.rows_changed.emit(CollectionChange::Reset);
    }

    /// Returns `true` if a comparer is active.
    pub fn is_sorted(&self) -> bool {
        self.shared.state.read().comparer.is_some()
    }
}

impl<T> std::fmt::Debug for HierarchicalRows<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("HierarchicalRows")
            .field("rows", &state.rows.len())
            .field("nodes", &state.nodes.len())
            .field("sorted", &state.comparer.is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(HierarchicalRows<String>: Send, Sync);
