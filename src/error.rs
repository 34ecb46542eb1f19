use std::error;
use std::fmt;

/// Errors reported by the cursor surface.
///
/// Logical "not found" conditions are not errors: `remove` on an absent value
/// is a no-op and `find` returns a cursor equal to `end()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The cursor does not resolve to a live node of this list: either its
    /// node was removed (the slot's generation no longer matches the handle)
    /// or the cursor was taken from a different list.
    InvalidatedIterator,
    /// The cursor stands on a sentinel where the operation has no meaning:
    /// dereferencing `end()`, stepping forward from `end()`, or stepping back
    /// from the first element.
    OutOfBounds,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidatedIterator => {
                write!(f, "cursor does not refer to a live node of this list")
            }
            Error::OutOfBounds => write!(f, "cursor stepped or dereferenced past a list bound"),
        }
    }
}

impl error::Error for Error {}
