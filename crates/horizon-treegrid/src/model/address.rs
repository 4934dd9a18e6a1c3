//! Hierarchical addresses for items in a tree of source views.
//!
//! The `Address` type is the stable way to reference an item: the ordered
//! sequence of child offsets taken from the root. `(2,0,5)` is the sixth child
//! of the first child of the root's third child. Addresses are expressed in
//! source (model) offsets, so they survive sorting and expansion changes.

use std::fmt;
use std::ops::Index;

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Inline capacity; addresses up to this depth never allocate.
const INLINE_DEPTH: usize = 2;

/// Identifies a node's position in a tree by child offsets from the root.
///
/// The empty address denotes the root itself (and doubles as the "nothing
/// selected" sentinel). Every depth shares one representation, so
/// comparison, equality, hashing, and iteration behave identically whether an
/// address is empty, one level deep, or arbitrarily deep.
///
/// # Ordering
///
/// Addresses compare element-wise over their common prefix; when the prefix
/// is equal the shorter address sorts first. This is pre-order depth-first
/// tree order: the empty address precedes everything and any address
/// precedes all of its descendants.
///
/// # Example
///
/// ```
/// use horizon_treegrid::model::Address;
///
/// let folder = Address::from([2, 0]);
/// let file = folder.append(5);
///
/// assert!(folder.is_parent_of(&file));
/// assert!(folder < file);
/// assert!(file < Address::from([2, 1]));
/// assert_eq!(file.to_string(), "(2,0,5)");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    offsets: SmallVec<[usize; INLINE_DEPTH]>,
}

impl Address {
    /// Returns the empty address (depth 0).
    #[inline]
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a single-offset address (depth 1).
    #[inline]
    pub fn new(offset: usize) -> Self {
        let mut offsets = SmallVec::new();
        offsets.push(offset);
        Self { offsets }
    }

    /// Creates an address from a slice of offsets.
    pub fn from_slice(offsets: &[usize]) -> Self {
        Self {
            offsets: SmallVec::from_slice(offsets),
        }
    }

    /// Returns a new address one level deeper.
    pub fn append(&self, offset: usize) -> Self {
        let mut offsets = self.offsets.clone();
        offsets.push(offset);
        Self { offsets }
    }

    /// Returns a new address one level deeper, rejecting negative offsets.
    pub fn try_append(&self, offset: isize) -> Result<Self> {
        let offset = usize::try_from(offset).map_err(|_| Error::NegativeOffset { offset })?;
        Ok(self.append(offset))
    }

    /// Returns the number of offsets (the depth).
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns `true` for the root address.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns the offset at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// Returns the offset at `index`, or an out-of-range error.
    pub fn at(&self, index: usize) -> Result<usize> {
        self.get(index)
            .ok_or_else(|| Error::out_of_range(index, self.len()))
    }

    /// Returns the last offset (the position within the parent list).
    #[inline]
    pub fn last(&self) -> Option<usize> {
        self.offsets.last().copied()
    }

    /// Returns the parent address, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_empty() {
            return None;
        }
        Some(Self::from_slice(&self.offsets[..self.len() - 1]))
    }

    /// Returns the sub-address `[start, start + length)`.
    ///
    /// A zero `length` yields the empty address as long as `start` is within
    /// `0..=len()`.
    pub fn slice(&self, start: usize, length: usize) -> Result<Self> {
        if start > self.len() {
            return Err(Error::out_of_range(start, self.len()));
        }
        let end = start
            .checked_add(length)
            .filter(|&end| end <= self.len())
            .ok_or_else(|| Error::out_of_range(start.saturating_add(length), self.len()))?;
        Ok(Self::from_slice(&self.offsets[start..end]))
    }

    /// Returns `true` if `other` is strictly deeper and starts with this address.
    pub fn is_ancestor_of(&self, other: &Address) -> bool {
        other.len() > self.len() && other.offsets.starts_with(&self.offsets)
    }

    /// Returns `true` if `other` is exactly one level deeper and a descendant.
    pub fn is_parent_of(&self, other: &Address) -> bool {
        other.len() == self.len() + 1 && self.is_ancestor_of(other)
    }

    /// Returns the offsets as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.offsets
    }

    /// Iterates over the offsets from the root downward.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = usize> + ExactSizeIterator + '_ {
        self.offsets.iter().copied()
    }

    /// Copies the offsets into a vector.
    pub fn to_vec(&self) -> Vec<usize> {
        self.offsets.to_vec()
    }
}

impl Index<usize> for Address {
    type Output = usize;

    fn index(&self, index: usize) -> &usize {
        &self.offsets[index]
    }
}

impl From<Vec<usize>> for Address {
    fn from(offsets: Vec<usize>) -> Self {
        Self {
            offsets: SmallVec::from_vec(offsets),
        }
    }
}

impl From<&[usize]> for Address {
    fn from(offsets: &[usize]) -> Self {
        Self::from_slice(offsets)
    }
}

impl<const N: usize> From<[usize; N]> for Address {
    fn from(offsets: [usize; N]) -> Self {
        Self::from_slice(&offsets)
    }
}

impl FromIterator<usize> for Address {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            offsets: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Address {
    type Item = usize;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.offsets.iter().copied()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, offset) in self.offsets.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{offset}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address{self}")
    }
}
