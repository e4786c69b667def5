use thiserror::Error;

/// Errors reported by the fallible operations of a [`List`](crate::List).
///
/// Handing a node handle to a list it does not belong to is not an `Error`:
/// the operations taking handles are `unsafe` and document it as a contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A node (or the list's sentinel node) could not be allocated.
    #[error("failed to allocate {size} bytes for a list node")]
    Alloc { size: usize },
    /// The duplicate hook refused to copy the value at `index`.
    #[error("duplicate hook failed for the value at position {index}")]
    Dup { index: usize },
    /// [`List::dup`](crate::List::dup) was called on a list without a
    /// duplicate hook.
    #[error("the list has no duplicate hook")]
    NoDupHook,
}
