//! Horizon TreeGrid - hierarchical addressing and row flattening for tree grids.
//!
//! This crate turns a tree of change-notifying collections into the flat,
//! virtualizable row sequence a grid view renders, and keeps the two in sync:
//!
//! - [`model::Address`] names an item by child offsets from the root
//! - [`model::SourceView`] wraps one collection and announces its changes
//! - [`model::FlatRows`] and [`model::HierarchicalRows`] flatten views into rows
//! - [`source::FlatSource`] and [`source::HierarchicalSource`] add columns,
//!   sorting, and drag-and-drop moves
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_treegrid::prelude::*;
//!
//! #[derive(Clone)]
//! struct Task {
//!     title: &'static str,
//!     subtasks: Arc<SourceView<Task>>,
//! }
//!
//! fn task(title: &'static str, subtasks: Vec<Task>) -> Task {
//!     Task { title, subtasks: SourceView::shared(subtasks) }
//! }
//!
//! let tasks = SourceView::shared(vec![
//!     task("release", vec![task("changelog", vec![]), task("tag", vec![])]),
//!     task("cleanup", vec![]),
//! ]);
//!
//! let source = HierarchicalSource::builder(tasks.clone())
//!     .expander_column(ExpanderColumn::new(
//!         ValueColumn::with_key("Title", |t: &Task| t.title),
//!         |t: &Task| Some(t.subtasks.clone()),
//!     ))
//!     .build()?;
//!
//! source.rows_changed().connect(|change| println!("rows changed: {change:?}"));
//!
//! source.expand(&Address::new(0))?;
//! assert_eq!(source.row_count(), 4);
//! assert_eq!(source.row_index_to_model_index(2), Some(Address::from([0, 1])));
//!
//! // New subtasks show up without any further call.
//! tasks.get(0).unwrap().subtasks.push(task("announce", vec![]));
//! assert_eq!(source.row_count(), 5);
//! # Ok::<(), horizon_treegrid::Error>(())
//! ```

pub mod error;
pub mod model;
pub mod prelude;
pub mod source;

pub use error::{Error, Result};
pub use horizon_treegrid_core::{ConnectionGuard, ConnectionId, Signal};
