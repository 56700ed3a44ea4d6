//! Which period of a sequence a planner may edit.
//!
//! Only consensus values are edited, and only for the first period strictly
//! after the current one. The current period and everything before it are
//! locked.

use crate::domain::{Boundary, EditClass};
use crate::error::PeriodError;

/// Classify every label of a sequence.
pub fn classify<S: AsRef<str>>(labels: &[S], boundary: Boundary) -> Vec<EditClass> {
    let editable = boundary.first_future();
    (0..labels.len())
        .map(|i| match boundary {
            Boundary::At(b) if i < b => EditClass::Past,
            Boundary::At(b) if i == b => EditClass::Current,
            _ if i == editable => EditClass::Editable,
            _ => EditClass::Future,
        })
        .collect()
}

/// Index of the editable period, if the sequence has one.
pub fn editable_index(classes: &[EditClass]) -> Option<usize> {
    classes.iter().position(|c| *c == EditClass::Editable)
}

/// Reject an edit of anything but the editable period.
///
/// An index past the end of the sequence is `IndexOutOfRange`.
pub fn ensure_editable(classes: &[EditClass], index: usize) -> Result<(), PeriodError> {
    match classes.get(index) {
        Some(EditClass::Editable) => Ok(()),
        Some(&class) => Err(PeriodError::LockedPeriod { index, class }),
        None => Err(PeriodError::IndexOutOfRange {
            index,
            len: classes.len(),
        }),
    }
}
