//! The three record variants and their schemas.

pub mod release;
pub mod sheet;
pub mod volume;

use crate::error::EditError;

pub(crate) fn row_mut<'a, T>(
    rows: &'a mut [T],
    sequence: &'static str,
    index: usize,
) -> Result<&'a mut T, EditError> {
    let len = rows.len();
    rows.get_mut(index)
        .ok_or_else(|| EditError::out_of_range(sequence, index, len))
}

/// Appends an empty row once the current last row is complete.
pub(crate) fn append_row<T: Default>(
    rows: &mut Vec<T>,
    sequence: &'static str,
    row: &'static str,
    is_complete: impl Fn(&T) -> bool,
) -> Result<(), EditError> {
    if let Some(last) = rows.last()
        && !is_complete(last)
    {
        return Err(EditError::IncompleteRow { sequence, row });
    }
    rows.push(T::default());
    Ok(())
}

/// Removes a row, refusing to empty the sequence.
pub(crate) fn remove_row<T>(
    rows: &mut Vec<T>,
    sequence: &'static str,
    index: usize,
) -> Result<(), EditError> {
    if index >= rows.len() {
        return Err(EditError::out_of_range(sequence, index, rows.len()));
    }
    if rows.len() == 1 {
        return Err(EditError::LastRow { sequence });
    }
    rows.remove(index);
    Ok(())
}
