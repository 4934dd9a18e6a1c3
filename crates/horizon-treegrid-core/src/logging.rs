//! Logging facilities for Horizon TreeGrid.
//!
//! Horizon TreeGrid uses the `tracing` crate for instrumentation. To see logs,
//! you need to install a tracing subscriber in your application:
//!
//! ```ignore
//! use tracing_subscriber;
//!
//! fn main() {
//!     // Initialize tracing (you can customize this)
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Filter by subsystem with the constants in [`targets`], e.g.
//! `RUST_LOG=horizon_treegrid::rows=debug`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_treegrid_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_treegrid_core::signal";
    /// Flat and hierarchical row sets.
    pub const ROWS: &str = "horizon_treegrid::rows";
    /// Source orchestration (columns, selection wiring).
    pub const SOURCE: &str = "horizon_treegrid::source";
    /// Drag-and-drop structural moves.
    pub const DRAG_DROP: &str = "horizon_treegrid::drag_drop";
    /// Sorting.
    pub const SORT: &str = "horizon_treegrid::sort";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_share_crate_prefix() {
        for target in [targets::ROWS, targets::SOURCE, targets::DRAG_DROP, targets::SORT] {
            assert!(target.starts_with("horizon_treegrid::"));
        }
        assert!(targets::SIGNAL.starts_with(targets::CORE));
    }
}
