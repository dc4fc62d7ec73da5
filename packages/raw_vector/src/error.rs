use std::alloc::Layout;

use thiserror::Error;

/// Errors that can occur when acquiring storage for a [`Vector`][crate::Vector] or
/// [`RawMemory`][crate::RawMemory].
///
/// Only the `try_` operations return this error. Their infallible counterparts panic with
/// the same message instead.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum AllocError {
    /// The requested number of elements does not fit in a single allocation
    /// (its size in bytes exceeds `isize::MAX`).
    #[error("capacity of {capacity} elements exceeds the maximum allocation size")]
    CapacityOverflow {
        /// The number of elements that was requested.
        capacity: usize,
    },

    /// The global allocator could not provide the requested memory region.
    #[error(
        "out of memory: failed to allocate {} bytes with alignment {}",
        .layout.size(),
        .layout.align()
    )]
    OutOfMemory {
        /// The memory layout of the allocation that failed.
        layout: Layout,
    },
}

/// A specialized `Result` type for storage operations, returning the crate's
/// [`AllocError`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, AllocError>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(AllocError: Send, Sync, Debug, Clone);

    #[test]
    fn capacity_overflow_message_names_capacity() {
        let error = AllocError::CapacityOverflow { capacity: 12 };

        assert_eq!(
            error.to_string(),
            "capacity of 12 elements exceeds the maximum allocation size"
        );
    }

    #[test]
    fn out_of_memory_message_names_layout() {
        let layout = Layout::from_size_align(32, 8).unwrap();
        let error = AllocError::OutOfMemory { layout };

        assert_eq!(
            error.to_string(),
            "out of memory: failed to allocate 32 bytes with alignment 8"
        );
    }

    #[test]
    fn is_usable_as_result_error() {
        let result: Result<()> = Err(AllocError::CapacityOverflow { capacity: 1 });
        assert!(result.is_err());
    }
}
