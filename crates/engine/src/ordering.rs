//! Pure reorder logic for position-ordered lists.
//!
//! Boards within a workspace and cards within a board carry a dense,
//! zero-based `position`. These helpers operate on in-memory lists already
//! sorted by position; the ops layer persists the renumbered result inside
//! one DB transaction so other readers never observe a gap or duplicate.

use crate::{EngineError, ResultEngine};

/// Moves the element at `source` to `dest` within one list.
///
/// `dest` is clamped to `[0, len - 1]`; `source` must address an existing
/// element. `reorder(list, i, i)` leaves the list unchanged.
pub fn reorder<T>(list: &mut Vec<T>, source: usize, dest: usize) -> ResultEngine<()> {
    if source >= list.len() {
        return Err(EngineError::IndexOutOfRange(format!(
            "source index {source} out of range for list of {}",
            list.len()
        )));
    }
    let dest = clamp_dest(dest, list.len());
    if source == dest {
        return Ok(());
    }
    let item = list.remove(source);
    list.insert(dest, item);
    Ok(())
}

/// Moves the element at `source` out of `source_list` and inserts it into
/// `dest_list` at `dest` (clamped to `[0, dest_list.len()]`).
///
/// Returns a reference to the moved element so the caller can update its
/// container foreign key.
pub fn move_across<'a, T>(
    source_list: &mut Vec<T>,
    dest_list: &'a mut Vec<T>,
    source: usize,
    dest: usize,
) -> ResultEngine<&'a T> {
    if source >= source_list.len() {
        return Err(EngineError::IndexOutOfRange(format!(
            "source index {source} out of range for list of {}",
            source_list.len()
        )));
    }
    // The destination grows by one, so the valid insert range is 0..=len.
    let dest = dest.min(dest_list.len());
    let item = source_list.remove(source);
    dest_list.insert(dest, item);
    Ok(&dest_list[dest])
}

/// Clamps a destination index into the valid range of a non-empty list.
fn clamp_dest(dest: usize, len: usize) -> usize {
    debug_assert!(len > 0);
    dest.min(len - 1)
}

/// Yields `(index, item)` pairs for every element whose stored position
/// disagrees with its array index, i.e. the rows a renumbering pass must
/// rewrite.
pub fn stale_positions<T>(
    list: &[T],
    position: impl Fn(&T) -> i32,
) -> impl Iterator<Item = (usize, &T)> {
    list.iter()
        .enumerate()
        .filter(move |(index, item)| position(item) != *index as i32)
}
