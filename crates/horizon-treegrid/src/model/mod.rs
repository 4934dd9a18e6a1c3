//! Model types for hierarchical tree grids.
//!
//! This module provides the addressing and flattening layer between source
//! collections and a virtualized row view:
//!
//! # Core Types
//!
//! - `Address`: Identifies an item by child offsets from the root
//! - `SourceView`: Change-notifying wrapper around one collection
//! - `Row`: One visible row (model, address, depth, expansion state)
//! - `FlatRows`: 1:1 rows over a single view, optionally sorted
//! - `HierarchicalRows`: Expandable pre-order rows over a tree of views
//! - `Columns`, `Column`, `Expander`: Sorting and children capabilities
//! - `RowSelection`: Read contract for the selected addresses
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐ changed ┌──────────────────┐ rows_changed ┌────────┐
//! │ SourceView  │────────>│ HierarchicalRows │─────────────>│  View  │
//! │ (per list)  │         │  (node arena)    │              │        │
//! └─────────────┘         └──────────────────┘              └────────┘
//!        ^                         │
//!        └──────── Expander ───────┘
//! ```

mod address;
mod column;
mod flat_rows;
mod hierarchical_rows;
mod row;
pub mod selection;
mod source_view;

pub use address::Address;
pub use column::{
    ChildrenFn, Column, Columns, Comparer, Expander, ExpanderColumn, HasChildrenFn,
    SortDirection, ValueColumn,
};
pub use flat_rows::FlatRows;
pub use hierarchical_rows::HierarchicalRows;
pub use row::{ExpansionState, NodeKey, Row};
pub use selection::{AddressSelection, RowSelection, SelectionMode};
pub use source_view::{same_view, CollectionChange, SourceView};
