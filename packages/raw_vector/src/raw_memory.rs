use std::alloc::{self, Layout};
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use crate::{AllocError, Result};

/// An owned, uninitialized memory region sized for `capacity` values of `T`.
///
/// `RawMemory` is only responsible for acquiring and releasing the region. It does not know
/// which of its slots hold live values. That is tracked by the owner, which must drop any
/// live values before the region itself is dropped. Dropping a `RawMemory` never drops values.
///
/// The region is never partially allocated. A capacity of zero (or a zero-sized `T`) means no
/// memory is allocated and the base address is dangling.
///
/// `RawMemory` can be moved but not duplicated: copying raw storage without knowing which slots
/// are live would be unsound, so there is no `Clone` implementation.
///
/// # Example
///
/// ```rust
/// use raw_vector::RawMemory;
///
/// let mut memory = RawMemory::<String>::allocate(4);
/// assert_eq!(memory.capacity(), 4);
///
/// // SAFETY: 0 is within capacity and the slot is uninitialized.
/// unsafe { memory.slot(0).write("hello".to_string()) };
///
/// // SAFETY: We initialized slot 0 above and nothing else drops it.
/// let value = unsafe { memory.slot(0).read() };
/// assert_eq!(value, "hello");
///
/// // Ownership can be transferred, leaving the source empty.
/// let taken = memory.take();
/// assert_eq!(taken.capacity(), 4);
/// assert!(memory.is_empty());
/// ```
pub struct RawMemory<T> {
    /// Base of the region. Dangling (but aligned) when nothing is allocated.
    ptr: NonNull<T>,

    /// Number of `T` slots in the region.
    capacity: usize,

    /// We own the region that may contain `T` values, as far as variance and auto traits go.
    _owns: PhantomData<T>,
}

// SAFETY: `RawMemory` exclusively owns its region, exactly like `Box<[MaybeUninit<T>]>`.
unsafe impl<T: Send> Send for RawMemory<T> {}

// SAFETY: Shared access only exposes the address and capacity; values are only reachable
// through the owner, which follows the usual `T: Sync` rules.
unsafe impl<T: Sync> Sync for RawMemory<T> {}

impl<T> RawMemory<T> {
    /// Creates an empty region with zero capacity. Does not allocate.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            _owns: PhantomData,
        }
    }

    /// Allocates an uninitialized region with room for exactly `capacity` values.
    ///
    /// # Panics
    ///
    /// Panics if the allocation fails or if the region would exceed `isize::MAX` bytes.
    /// Use [`try_allocate()`][Self::try_allocate] to handle these conditions.
    #[must_use]
    pub fn allocate(capacity: usize) -> Self {
        Self::try_allocate(capacity).unwrap_or_else(|error| panic!("{error}"))
    }

    /// Allocates an uninitialized region with room for exactly `capacity` values.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::CapacityOverflow`] if the region would exceed `isize::MAX` bytes
    /// and [`AllocError::OutOfMemory`] if the global allocator cannot provide the region.
    /// No memory is held when an error is returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raw_vector::{AllocError, RawMemory};
    ///
    /// let memory = RawMemory::<u64>::try_allocate(16).unwrap();
    /// assert_eq!(memory.capacity(), 16);
    ///
    /// let too_big = RawMemory::<u64>::try_allocate(usize::MAX);
    /// assert!(matches!(too_big, Err(AllocError::CapacityOverflow { .. })));
    /// ```
    pub fn try_allocate(capacity: usize) -> Result<Self> {
        let layout = Self::layout_for(capacity)?;

        if layout.size() == 0 {
            // Zero capacity or zero-sized `T`. Nothing to allocate but we still remember the
            // requested capacity so the owner can track slots of zero-sized values.
            return Ok(Self {
                ptr: NonNull::dangling(),
                capacity,
                _owns: PhantomData,
            });
        }

        // SAFETY: The layout has a non-zero size, as checked above.
        let ptr = unsafe { alloc::alloc(layout) };

        let ptr = NonNull::new(ptr.cast::<T>()).ok_or(AllocError::OutOfMemory { layout })?;

        Ok(Self {
            ptr,
            capacity,
            _owns: PhantomData,
        })
    }

    /// The number of values the region has room for.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the region has zero capacity.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.capacity == 0
    }

    /// The base address of the region.
    ///
    /// The pointer is dangling (but aligned and non-null) if nothing is allocated.
    #[must_use]
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// The address of the slot at `offset`.
    ///
    /// An `offset` equal to the capacity is allowed and yields the one-past-the-end address.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `offset <= self.capacity()`.
    #[must_use]
    #[inline]
    pub unsafe fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(
            offset <= self.capacity,
            "slot offset {offset} is out of bounds of region with capacity {}",
            self.capacity
        );

        // SAFETY: Forwarding guarantee from the caller. The result is within the region or
        // one past its end (for zero-sized values every offset is the same address).
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// Transfers ownership of the region to the returned value, leaving `self` empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    /// Exchanges the regions owned by `self` and `other`. Never touches the contents.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    fn layout_for(capacity: usize) -> Result<Layout> {
        Layout::array::<T>(capacity).map_err(|_overflow| AllocError::CapacityOverflow { capacity })
    }
}

impl<T> Default for RawMemory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for RawMemory<T> {
    #[cfg_attr(test, mutants::skip)] // Diagnostic output only.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMemory")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> Drop for RawMemory<T> {
    fn drop(&mut self) {
        let layout = Self::layout_for(self.capacity)
            .expect("layout was already validated when the region was allocated");

        if layout.size() == 0 {
            return;
        }

        // SAFETY: A non-zero-sized layout means `try_allocate()` allocated this exact layout
        // and nothing has released it since. Ownership transfers leave an empty region behind.
        unsafe {
            alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout);
        }
    }
}

/// Writes `count` values produced by `construct` into consecutive uninitialized slots starting
/// at `target`, passing each value's position (relative to `target`) to `construct`.
///
/// If `construct` panics, the values written so far are dropped before the panic continues,
/// leaving all `count` slots uninitialized again.
///
/// # Safety
///
/// The caller must ensure that `target` is valid for writes of `count` consecutive values and
/// that those slots do not hold live values.
pub(crate) unsafe fn construct_n<T>(
    target: *mut T,
    count: usize,
    mut construct: impl FnMut(usize) -> T,
) {
    let mut written = scopeguard::guard(0_usize, |written| {
        // SAFETY: Exactly `written` values were initialized at the start of the range below.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(target, written));
        }
    });

    for index in 0..count {
        let value = construct(index);

        // SAFETY: The caller guarantees `count` slots are valid for writes and `index < count`.
        unsafe {
            target.add(index).write(value);
        }

        // Cannot overflow because `index < count`.
        *written = index.wrapping_add(1);
    }

    scopeguard::ScopeGuard::into_inner(written);
}

/// Clones `count` live values starting at `source` into consecutive uninitialized slots
/// starting at `target`.
///
/// If a clone panics, the clones made so far are dropped before the panic continues. The
/// source values are only read.
///
/// # Safety
///
/// The caller must ensure that `source` holds `count` live values, that `target` is valid for
/// writes of `count` values and that the two ranges do not overlap.
pub(crate) unsafe fn clone_n<T: Clone>(source: *const T, target: *mut T, count: usize) {
    let clone_at = |index: usize| {
        // SAFETY: `index < count` and the caller guarantees `source` holds `count` values.
        let original = unsafe { source.add(index) };

        // SAFETY: The value at `original` is live and only read through a shared reference.
        unsafe { &*original }.clone()
    };

    // SAFETY: Forwarding the caller's guarantee about `target`.
    unsafe {
        construct_n(target, count, clone_at);
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
    use static_assertions::{assert_impl_all, assert_not_impl_any};
    use testing::{FailurePlan, Fallible, LiveCounter, Tracked, expect_panic};

    use super::*;

    assert_impl_all!(RawMemory<u32>: Send, Sync, Debug, Default);
    assert_not_impl_any!(RawMemory<u32>: Clone, Copy);
    assert_not_impl_any!(RawMemory<std::rc::Rc<u32>>: Send, Sync);

    #[test]
    fn new_is_empty() {
        let memory = RawMemory::<u64>::new();

        assert_eq!(memory.capacity(), 0);
        assert!(memory.is_empty());
    }

    #[test]
    fn allocate_zero_is_empty() {
        let memory = RawMemory::<String>::allocate(0);

        assert!(memory.is_empty());
        assert_eq!(memory.as_ptr(), NonNull::<String>::dangling().as_ptr().cast_const());
    }

    #[test]
    fn allocate_gives_aligned_region_of_requested_capacity() {
        let memory = RawMemory::<u128>::allocate(10);

        assert_eq!(memory.capacity(), 10);
        assert!(!memory.is_empty());
        assert!(memory.as_ptr().is_aligned());
    }

    #[test]
    fn slots_are_contiguous() {
        let memory = RawMemory::<u32>::allocate(3);

        let first = unsafe { memory.slot(0) };
        let end = unsafe { memory.slot(3) };

        assert_eq!(first.cast_const(), memory.as_ptr());
        assert_eq!(unsafe { end.offset_from(first) }, 3);
    }

    #[test]
    fn slots_can_hold_values() {
        let memory = RawMemory::<String>::allocate(2);

        unsafe {
            memory.slot(0).write("a".to_string());
            memory.slot(1).write("b".to_string());

            assert_eq!(*memory.slot(0), "a");
            assert_eq!(*memory.slot(1), "b");

            ptr::drop_in_place(memory.slot(0));
            ptr::drop_in_place(memory.slot(1));
        }
    }

    #[test]
    fn capacity_overflow_is_reported() {
        let result = RawMemory::<u64>::try_allocate(usize::MAX);

        assert_eq!(
            result.unwrap_err(),
            AllocError::CapacityOverflow {
                capacity: usize::MAX
            }
        );
    }

    #[test]
    #[cfg_attr(
        miri,
        ignore = "Miri reports the impossible allocation as an error instead of returning null"
    )]
    fn out_of_memory_is_reported() {
        // Valid layout (exactly isize::MAX bytes) that no real allocator can satisfy.
        let capacity = isize::MAX.unsigned_abs();

        let result = RawMemory::<u8>::try_allocate(capacity);

        assert!(matches!(result, Err(AllocError::OutOfMemory { .. })));
    }

    #[test]
    fn allocate_panics_on_capacity_overflow() {
        let message = expect_panic(|| RawMemory::<u64>::allocate(usize::MAX));

        assert!(
            message
                .unwrap()
                .ends_with("elements exceeds the maximum allocation size")
        );
    }

    #[test]
    fn zero_sized_values_keep_capacity_without_allocating() {
        let memory = RawMemory::<()>::allocate(1000);

        assert_eq!(memory.capacity(), 1000);
        assert_eq!(memory.as_ptr(), NonNull::<()>::dangling().as_ptr().cast_const());
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut source = RawMemory::<u16>::allocate(5);
        let address = source.as_ptr();

        let taken = source.take();

        assert_eq!(taken.capacity(), 5);
        assert_eq!(taken.as_ptr(), address);
        assert!(source.is_empty());
    }

    #[test]
    fn swap_exchanges_regions() {
        let mut a = RawMemory::<u8>::allocate(1);
        let mut b = RawMemory::<u8>::allocate(7);
        let (a_address, b_address) = (a.as_ptr(), b.as_ptr());

        a.swap(&mut b);

        assert_eq!(a.capacity(), 7);
        assert_eq!(a.as_ptr(), b_address);
        assert_eq!(b.capacity(), 1);
        assert_eq!(b.as_ptr(), a_address);
    }

    #[test]
    fn construct_n_fills_all_slots() {
        let memory = RawMemory::<usize>::allocate(4);

        unsafe {
            construct_n(memory.slot(0), 4, |index| index * 10);

            assert_eq!(*memory.slot(0), 0);
            assert_eq!(*memory.slot(3), 30);
        }
    }

    #[test]
    fn construct_n_drops_partial_run_on_panic() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let memory = RawMemory::<Tracked<usize>>::allocate(5);

        plan.fail_after(3);
        expect_panic(|| unsafe {
            construct_n(memory.slot(0), 5, |index| {
                plan.check();
                counter.track(index)
            });
        });

        assert_eq!(counter.created(), 3);
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn clone_n_clones_every_value_and_keeps_sources() {
        let source = RawMemory::<String>::allocate(3);
        let target = RawMemory::<String>::allocate(3);

        unsafe {
            construct_n(source.slot(0), 3, |index| index.to_string());
            clone_n(source.as_ptr(), target.slot(0), 3);

            for index in 0..3 {
                assert_eq!(*target.slot(index), index.to_string());
                assert_eq!(*source.slot(index), index.to_string());
            }

            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(source.slot(0), 3));
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(target.slot(0), 3));
        }
    }

    #[test]
    fn clone_n_drops_partial_clones_on_panic() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let source = RawMemory::<Fallible<Tracked<usize>>>::allocate(4);
        let target = RawMemory::<Fallible<Tracked<usize>>>::allocate(4);

        unsafe {
            construct_n(source.slot(0), 4, |index| plan.make(counter.track(index)));
        }

        plan.fail_after(2);
        expect_panic(|| unsafe { clone_n(source.as_ptr(), target.slot(0), 4) });

        assert_eq!(counter.live(), 4);

        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(source.slot(0), 4));
        }
        assert_eq!(counter.live(), 0);
    }
}
