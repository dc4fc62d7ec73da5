#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in `raw_vector` packages.
//!
//! The container under test has to prove two things that ordinary assertions cannot see:
//!
//! 1. Every element it constructs is dropped exactly once. See [`LiveCounter`] and [`Tracked`].
//! 2. It restores the promised state when an element operation fails partway through an
//!    operation. See [`FailurePlan`] and [`Fallible`], which panic on a chosen construction
//!    or clone.

use std::panic::{self, AssertUnwindSafe};

mod failure;
mod live;

pub use failure::*;
pub use live::*;

/// Runs `f`, expecting it to panic, and returns the panic message if it was a string.
///
/// The closure is treated as unwind safe because tests inspect the state it leaves behind
/// on purpose.
///
/// # Panics
///
/// Panics if `f` completes without panicking.
///
/// # Example
///
/// ```rust
/// use testing::expect_panic;
///
/// let message = expect_panic(|| panic!("boom"));
/// assert_eq!(message.as_deref(), Some("boom"));
/// ```
pub fn expect_panic<F, R>(f: F) -> Option<String>
where
    F: FnOnce() -> R,
{
    let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) else {
        panic!("expected the operation to panic but it completed normally");
    };

    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Some((*message).to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn expect_panic_returns_static_message() {
        assert_eq!(expect_panic(|| panic!("static")).as_deref(), Some("static"));
    }

    #[test]
    fn expect_panic_returns_formatted_message() {
        let value = 42;
        assert_eq!(
            expect_panic(|| panic!("value {value}")).as_deref(),
            Some("value 42")
        );
    }

    #[test]
    #[should_panic]
    fn expect_panic_rejects_normal_completion() {
        _ = expect_panic(|| 1 + 1);
    }
}
