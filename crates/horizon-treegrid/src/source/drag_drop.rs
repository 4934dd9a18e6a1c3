//! Structural moves across source views.
//!
//! A move is validated completely before the first item is touched. Items
//! are removed group by group (parent lists in descending address order,
//! offsets descending within a list) and re-inserted as one block in their
//! original address order.

use std::collections::BTreeMap;
use std::sync::Arc;

use horizon_treegrid_core::logging::targets;

use super::{DragEffect, DropPosition};
use crate::error::{Error, Result};
use crate::model::{same_view, Address, SourceView};

/// A requested move, as handed to a source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MoveRequest<'a> {
    pub addresses: &'a [Address],
    pub target: &'a Address,
    pub position: DropPosition,
    pub effect: DragEffect,
}

/// What the source knows about itself when a move is requested.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MoveContext {
    pub sorted: bool,
    pub hierarchical: bool,
}

/// A parent list and the offsets to remove from it.
struct Group<T> {
    parent: Address,
    list: Arc<SourceView<T>>,
    offsets: Vec<usize>,
}

/// Drops addresses that travel with a moved ancestor. Returns the remaining
/// addresses in ascending order without duplicates.
fn outermost(addresses: &[Address]) -> Vec<Address> {
    let mut sorted = addresses.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut kept: Vec<Address> = Vec::with_capacity(sorted.len());
    for address in sorted {
        // Ancestors sort first, so only already-kept addresses can cover this one.
        if !kept.iter().any(|ancestor| ancestor.is_ancestor_of(&address)) {
            kept.push(address);
        }
    }
    kept
}

/// Validates and performs a move.
///
/// `resolve` maps a parent address to its child list; the empty address maps
/// to the root list.
#[tracing::instrument(
    skip_all,
    target = "horizon_treegrid::drag_drop",
    level = "debug",
    fields(drop_target = %request.target, count = request.addresses.len())
)]
pub(crate) fn move_rows<T, R>(request: MoveRequest<'_>, context: MoveContext, resolve: R) -> Result<bool>
where
    T: Clone + Send + Sync + 'static,
    R: Fn(&Address) -> Option<Arc<SourceView<T>>>,
{
    let MoveRequest {
        addresses,
        target,
        position,
        effect,
    } = request;

    if effect != DragEffect::Move {
        return Err(Error::UnsupportedEffect(effect));
    }
    if context.sorted {
        tracing::debug!(target: targets::DRAG_DROP, "refusing to move sorted rows");
        return Ok(false);
    }
    if !context.hierarchical && position == DropPosition::Inside {
        return Err(Error::InvalidDropPosition);
    }

    let moved = outermost(addresses);
    if moved.is_empty() {
        return Ok(false);
    }
    let into_itself = moved.iter().any(|address| {
        address.is_ancestor_of(target) || (position == DropPosition::Inside && address == target)
    });
    if into_itself {
        tracing::debug!(target: targets::DRAG_DROP, "refusing to move rows into themselves");
        return Ok(false);
    }

    // Resolve everything before mutating anything.
    let not_found = || Error::AddressNotFound(target.clone());
    let (target_parent, target_list, mut insert_at) = match position {
        DropPosition::Inside => {
            let list = resolve(target).ok_or_else(not_found)?;
            let len = list.len();
            (target.clone(), list, len)
        }
        DropPosition::Before | DropPosition::After => {
            let parent = target.parent().ok_or_else(not_found)?;
            let offset = target.last().ok_or_else(not_found)?;
            let list = resolve(&parent).ok_or_else(not_found)?;
            if offset >= list.len() {
                return Err(not_found());
            }
            let insert_at = if position == DropPosition::After {
                offset + 1
            } else {
                offset
            };
            (parent, list, insert_at)
        }
    };

    let mut by_parent: BTreeMap<Address, Vec<usize>> = BTreeMap::new();
    for address in &moved {
        let (Some(parent), Some(offset)) = (address.parent(), address.last()) else {
            return Err(Error::AddressNotFound(address.clone()));
        };
        by_parent.entry(parent).or_default().push(offset);
    }

    let mut groups: Vec<Group<T>> = Vec::with_capacity(by_parent.len());
    for (parent, mut offsets) in by_parent {
        let list = resolve(&parent).ok_or_else(|| Error::AddressNotFound(parent.clone()))?;
        offsets.sort_unstable_by(|a, b| b.cmp(a));
        if let Some(&highest) = offsets.first()
            && highest >= list.len()
        {
            return Err(Error::AddressNotFound(parent.append(highest)));
        }
        groups.push(Group {
            parent,
            list,
            offsets,
        });
    }

    if let Some(group) = groups.iter().find(|group| group.list.is_read_only()) {
        return Err(Error::ReadOnlyList(group.parent.clone()));
    }
    if target_list.is_read_only() {
        return Err(Error::ReadOnlyList(target_parent));
    }

    // Descending parent addresses, descending offsets.
    let mut removed: Vec<(Address, T)> = Vec::with_capacity(moved.len());
    for group in groups.iter().rev() {
        let same_list = same_view(&group.list, &target_list);
        for &offset in &group.offsets {
            if let Some(item) = group.list.remove(offset) {
                if same_list && offset < insert_at {
                    insert_at -= 1;
                }
                removed.push((group.parent.append(offset), item));
            }
        }
    }

    let count = removed.len();
    removed.sort_by(|(a, _), (b, _)| a.cmp(b));
    target_list.insert_many(insert_at, removed.into_iter().map(|(_, item)| item).collect());
    tracing::debug!(
        target: targets::DRAG_DROP,
        moved = count,
        insert_at,
        parent = %target_parent,
        "moved rows"
    );
    Ok(true)
}
