//! Prelude module for Horizon TreeGrid.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use horizon_treegrid::prelude::*;
//! ```

// ============================================================================
// Errors and Signals
// ============================================================================

pub use crate::error::{Error, Result};
pub use horizon_treegrid_core::{ConnectionId, Signal};

// ============================================================================
// Model
// ============================================================================

pub use crate::model::{
    Address, AddressSelection, CollectionChange, Column, Columns, Expander, ExpanderColumn,
    ExpansionState, FlatRows, HierarchicalRows, Row, RowSelection, SelectionMode, SortDirection,
    SourceView, ValueColumn,
};

// ============================================================================
// Sources
// ============================================================================

pub use crate::source::{DragEffect, DropPosition, FlatSource, GridSource, HierarchicalSource};
