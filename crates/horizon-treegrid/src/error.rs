//! Error types for the tree-grid model.

use crate::model::Address;
use crate::source::DragEffect;

/// Result type alias for tree-grid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while addressing, flattening, or restructuring rows.
///
/// Non-fatal outcomes (an address that is not currently visible, a drop that
/// is refused because the rows are sorted) are reported through `Option` or
/// `bool` return values instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A hierarchical operation was requested but no expander is configured.
    #[error("no expander configured: hierarchical operations need an expander column")]
    NoExpander,

    /// A source was built without any columns.
    #[error("no columns defined")]
    NoColumns,

    /// A negative child offset was supplied.
    #[error("child offset must be non-negative, got {offset}")]
    NegativeOffset { offset: isize },

    /// An index or range fell outside an address.
    #[error("index {index} is out of range for length {length}")]
    OutOfRange { index: usize, length: usize },

    /// The address does not resolve to a node or backing list.
    #[error("address {0} does not resolve to an item")]
    AddressNotFound(Address),

    /// `DropPosition::Inside` was requested on a flat source.
    #[error("drop position `Inside` is not valid for a flat source")]
    InvalidDropPosition,

    /// A drag effect other than move was requested.
    #[error("drag effect {0:?} is not supported, only Move")]
    UnsupportedEffect(DragEffect),

    /// The backing list at this address does not accept structural mutation.
    #[error("the list at {0} is read-only")]
    ReadOnlyList(Address),
}

impl Error {
    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, length: usize) -> Self {
        Self::OutOfRange { index, length }
    }

    /// Returns `true` for caller configuration mistakes.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NoExpander | Self::NoColumns)
    }
}
