//! List-index normalisation for reorder and reparent.
//!
//! Drag-and-drop computes a tentative index against the sibling list as it
//! looked *before* the dragged item was removed. These helpers remove first,
//! clamp second, and hand back the index the item actually landed at.

/// Clamp `requested` into `0..=len`. Anything negative or past the end appends.
pub fn effective_index(requested: isize, len: usize) -> usize {
    match usize::try_from(requested) {
        Ok(index) if index <= len => index,
        _ => len,
    }
}

/// Insert `item` at the clamped position and return that position.
pub fn insert_at<T>(list: &mut Vec<T>, item: T, requested: isize) -> usize {
    let index = effective_index(requested, list.len());
    list.insert(index, item);
    index
}

/// Move `item` out of `old` (if present) and into `new` at `requested`.
///
/// Returns the effective index in `new` after insertion.
pub fn move_between<T: PartialEq>(
    old: &mut Vec<T>,
    new: &mut Vec<T>,
    item: T,
    requested: isize,
) -> usize {
    remove_item(old, &item);
    insert_at(new, item, requested)
}

/// Reorder `item` within a single sibling list.
pub fn move_within<T: PartialEq>(siblings: &mut Vec<T>, item: T, requested: isize) -> usize {
    remove_item(siblings, &item);
    insert_at(siblings, item, requested)
}

fn remove_item<T: PartialEq>(list: &mut Vec<T>, item: &T) -> Option<usize> {
    let position = list.iter().position(|candidate| candidate == item)?;
    list.remove(position);
    Some(position)
}
