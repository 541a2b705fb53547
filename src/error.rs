// The block parser never fails on well-formed input (see process_elts); this
// error type only covers the one invariant violation that is a bug, not
// input-driven, plus the genuinely fallible config/logger I/O.

use std::fmt;

#[derive(Debug)]
pub enum BlockTreeError {
    /// `ContainerKind::Document` was encountered somewhere other than the
    /// stack root. Can only happen if `process_elts` or `process_line` is
    /// called on a malformed tree built outside this crate's invariants.
    UnexpectedDocument,
}

impl fmt::Display for BlockTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTreeError::UnexpectedDocument => {
                write!(f, "encountered a Document container below the stack root")
            }
        }
    }
}

impl std::error::Error for BlockTreeError {}
