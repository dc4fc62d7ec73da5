use std::ptr;

use crate::raw_memory::clone_n;

/// How a [`Vector`][crate::Vector] transplants its live values into a new region when it grows.
///
/// The strategy is a type parameter of the vector, so the choice is made at compile time once
/// per element type and never depends on the state of an instance.
///
/// Two strategies are provided:
///
/// * [`MoveRelocation`] (the default) moves values bitwise. Moving cannot fail in Rust, so growth
///   never observes a failure after the new region has been allocated.
/// * [`CloneRelocation`] clones values into the new region and drops the originals only once the
///   new region is complete. A panicking clone leaves the original region and its values intact.
///
/// # Safety
///
/// Implementations must uphold the contract of [`relocate()`][Self::relocate] and report through
/// [`CONSUMES_SOURCE`][Self::CONSUMES_SOURCE] whether the source values are still live afterwards.
/// The vector relies on both for memory safety.
pub unsafe trait Relocation<T> {
    /// Whether relocation ends the life of the source values.
    ///
    /// If `true`, the source slots are logically uninitialized after a successful relocation and
    /// must not be dropped. If `false`, the source values are still live and the owner drops them
    /// once the new region has been adopted.
    const CONSUMES_SOURCE: bool;

    /// Transplants `count` live values from `source` into the uninitialized slots at `target`.
    ///
    /// If this panics, no value in `target` is left live and the source values are untouched.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `source` holds `count` live values, that `target` is valid for
    /// writes of `count` values, and that the two ranges do not overlap.
    unsafe fn relocate(source: *const T, target: *mut T, count: usize);
}

/// Relocates values by moving them bitwise. Never fails.
///
/// This is the default strategy of [`Vector`][crate::Vector] and works for every element type.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct MoveRelocation;

// SAFETY: A bitwise move transfers ownership of every value and cannot panic.
unsafe impl<T> Relocation<T> for MoveRelocation {
    const CONSUMES_SOURCE: bool = true;

    #[inline]
    unsafe fn relocate(source: *const T, target: *mut T, count: usize) {
        // SAFETY: Forwarding guarantees from the caller: valid, non-overlapping ranges of `count`.
        unsafe {
            ptr::copy_nonoverlapping(source, target, count);
        }
    }
}

/// Relocates values by cloning them, keeping the originals alive until the new region is complete.
///
/// Choose this for element types whose identity must not silently move between regions mid-way
/// through a failed operation, or to exercise clone-failure paths. If a clone panics, the clones
/// made so far are dropped and the original values remain in place.
///
/// # Example
///
/// ```rust
/// use raw_vector::{CloneRelocation, Vector};
///
/// let mut names: Vector<String, CloneRelocation> = Vector::new();
/// names.push("a".to_string());
/// names.push("b".to_string());
///
/// // Growing clones "a" and "b" into the new region, then drops the originals.
/// names.reserve(10);
/// assert_eq!(names, ["a", "b"]);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct CloneRelocation;

// SAFETY: Clones are written with `clone_n()`, which drops every completed clone if a later one
// panics. The source values are only read through shared references and stay live.
unsafe impl<T: Clone> Relocation<T> for CloneRelocation {
    const CONSUMES_SOURCE: bool = false;

    unsafe fn relocate(source: *const T, target: *mut T, count: usize) {
        // SAFETY: Forwarding guarantees from the caller: valid, non-overlapping ranges of `count`.
        unsafe {
            clone_n(source, target, count);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use testing::{FailurePlan, Fallible, LiveCounter, Tracked, expect_panic};

    use super::*;
    use crate::RawMemory;

    const _: () = assert!(<MoveRelocation as Relocation<String>>::CONSUMES_SOURCE);
    const _: () = assert!(!<CloneRelocation as Relocation<String>>::CONSUMES_SOURCE);

    type Item = Fallible<Tracked<usize>>;

    fn filled(counter: &LiveCounter, plan: &FailurePlan, count: usize) -> RawMemory<Item> {
        let memory = RawMemory::<Item>::allocate(count);
        for index in 0..count {
            unsafe { memory.slot(index).write(plan.make(counter.track(index))) };
        }
        memory
    }

    fn drop_all<T>(memory: &RawMemory<T>, count: usize) {
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(memory.slot(0), count)) };
    }

    #[test]
    fn move_relocation_transfers_values() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let source = filled(&counter, &plan, 3);
        let target = RawMemory::<Item>::allocate(3);

        unsafe { MoveRelocation::relocate(source.slot(0), target.slot(0), 3) };

        // Nothing was created or dropped by moving.
        assert_eq!(counter.created(), 3);
        assert_eq!(counter.live(), 3);
        assert_eq!(unsafe { &*target.slot(2) }.value().value(), &2);

        // Only the target owns the values now.
        drop_all(&target, 3);
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn clone_relocation_keeps_source_alive() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let source = filled(&counter, &plan, 3);
        let target = RawMemory::<Item>::allocate(3);

        unsafe { CloneRelocation::relocate(source.slot(0), target.slot(0), 3) };

        assert_eq!(counter.live(), 6);
        assert_eq!(unsafe { &*target.slot(1) }.value().value(), &1);

        drop_all(&source, 3);
        drop_all(&target, 3);
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn clone_relocation_failure_leaves_nothing_in_target() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let source = filled(&counter, &plan, 4);
        let target = RawMemory::<Item>::allocate(4);

        plan.fail_after(2);
        expect_panic(|| unsafe { CloneRelocation::relocate(source.slot(0), target.slot(0), 4) });

        // The two completed clones were dropped again, the originals are untouched.
        assert_eq!(counter.live(), 4);
        for index in 0..4 {
            assert_eq!(unsafe { &*source.slot(index) }.value().value(), &index);
        }

        drop_all(&source, 4);
        assert_eq!(counter.live(), 0);
    }
}
