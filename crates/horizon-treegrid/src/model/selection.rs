//! Selection read contract and a minimal address-based selection model.
//!
//! Row sets never mutate selection; sources only read it when a drag starts
//! from the current selection.
//!
//! # Example
//!
//! ```
//! use horizon_treegrid::model::{Address, AddressSelection, RowSelection, SelectionMode};
//!
//! let selection = AddressSelection::new(SelectionMode::Multiple);
//! selection.select(Address::from([1, 0]));
//! selection.select(Address::new(0));
//!
//! // Ordered, de-duplicated.
//! assert_eq!(
//!     selection.selected_addresses(),
//!     vec![Address::new(0), Address::from([1, 0])]
//! );
//! ```

use std::collections::BTreeSet;

use horizon_treegrid_core::Signal;
use parking_lot::RwLock;

use super::Address;

/// Anything that can report the currently selected model addresses.
pub trait RowSelection: Send + Sync {
    /// Returns the selected addresses in ascending order without duplicates.
    fn selected_addresses(&self) -> Vec<Address>;
}

/// How many addresses may be selected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// At most one address (default).
    #[default]
    Single,
    /// Any number of addresses.
    Multiple,
}

/// A set of selected model addresses.
///
/// # Signals
///
/// - `selection_changed`: Emitted when selection changes, with (selected, deselected) addresses
pub struct AddressSelection {
    mode: SelectionMode,
    selected: RwLock<BTreeSet<Address>>,

    /// Emitted when selection changes. Args: (selected, deselected)
    pub selection_changed: Signal<(Vec<Address>, Vec<Address>)>,
}

impl Default for AddressSelection {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

impl AddressSelection {
    /// Creates an empty selection.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: RwLock::new(BTreeSet::new()),
            selection_changed: Signal::new(),
        }
    }

    /// Returns the selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Returns `true` if `address` is selected.
    pub fn is_selected(&self, address: &Address) -> bool {
        self.selected.read().contains(address)
    }

    /// Returns the number of selected addresses.
    pub fn len(&self) -> usize {
        self.selected.read().len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.read().is_empty()
    }

    /// Selects `address`. In single mode this replaces the selection.
    pub fn select(&self, address: Address) {
        let deselected: Vec<Address> = {
            let mut selected = self.selected.write();
            if selected.contains(&address) {
                return;
            }
            let deselected = match self.mode {
                SelectionMode::Single => std::mem::take(&mut *selected).into_iter().collect(),
                SelectionMode::Multiple => Vec::new(),
            };
            selected.insert(address.clone());
            deselected
        };
        self.selection_changed.emit((vec![address], deselected));
    }

    /// Deselects `address`. Returns `false` if it was not selected.
    pub fn deselect(&self, address: &Address) -> bool {
        if !self.selected.write().remove(address) {
            return false;
        }
        self.selection_changed
            .emit((Vec::new(), vec![address.clone()]));
        true
    }

    /// Flips the selection state of `address`.
    pub fn toggle(&self, address: Address) {
        if !self.deselect(&address) {
            self.select(address);
        }
    }

    /// Deselects everything.
    pub fn clear(&self) {
        let deselected: Vec<Address> = std::mem::take(&mut *self.selected.write())
            .into_iter()
            .collect();
        if !deselected.is_empty() {
            self.selection_changed.emit((Vec::new(), deselected));
        }
    }
}

impl RowSelection for AddressSelection {
    fn selected_addresses(&self) -> Vec<Address> {
        self.selected.read().iter().cloned().collect()
    }
}

impl std::fmt::Debug for AddressSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressSelection")
            .field("mode", &self.mode)
            .field("selected", &*self.selected.read())
            .finish()
    }
}

static_assertions::assert_impl_all!(AddressSelection: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_single_mode_replaces() {
        let selection = AddressSelection::new(SelectionMode::Single);
        selection.select(Address::new(2));
        selection.select(Address::new(0));

        assert_eq!(selection.selected_addresses(), vec![Address::new(0)]);
        assert!(!selection.is_selected(&Address::new(2)));
    }

    #[test]
    fn test_multiple_mode_toggle() {
        let selection = AddressSelection::new(SelectionMode::Multiple);
        selection.toggle(Address::new(3));
        selection.toggle(Address::from([1, 1]));
        selection.toggle(Address::new(3));

        assert_eq!(selection.selected_addresses(), vec![Address::from([1, 1])]);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_selection_changed_signal() {
        let selection = AddressSelection::new(SelectionMode::Single);
        let events = Arc::new(Mutex::new(Vec::new()));

        let events_clone = events.clone();
        selection.selection_changed.connect(move |(selected, deselected)| {
            events_clone.lock().push((selected.clone(), deselected.clone()));
        });

        selection.select(Address::new(1));
        selection.select(Address::new(1));
        selection.select(Address::new(4));
        selection.clear();
        selection.clear();

        let events = events.lock();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], (vec![Address::new(4)], vec![Address::new(1)]));
        assert_eq!(events[2], (Vec::new(), vec![Address::new(4)]));
    }
}
