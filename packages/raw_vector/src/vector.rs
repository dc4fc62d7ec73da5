use std::any::type_name;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::slice::{self, SliceIndex};
use std::{mem, ptr};

use scopeguard::ScopeGuard;
use tracing::{debug, trace};

use crate::raw_memory::{clone_n, construct_n};
use crate::{AllocError, MoveRelocation, RawMemory, Relocation};

/// A growable, contiguous sequence of values stored in a [`RawMemory`] region.
///
/// Slots `[0, len)` of the region hold live values, slots `[len, capacity)` are uninitialized.
/// Growth always allocates a new region, transplants the live values into it according to the
/// relocation strategy `R` and releases the old region. Storage is never resized in place.
///
/// # Relocation strategy
///
/// The second type parameter selects how values are transplanted during growth:
///
/// * [`MoveRelocation`] (default) moves values bitwise.
/// * [`CloneRelocation`][crate::CloneRelocation] clones values and drops the originals only once
///   the new region is complete.
///
/// # Failure safety
///
/// Constructing a value (a constructor closure, [`Default`] or [`Clone`]) may panic. Every
/// operation documents what state it leaves behind when that happens. Values are never leaked,
/// duplicated or dropped twice, and storage is always released when the vector is dropped,
/// including during unwinding.
///
/// # Growth
///
/// Appending or inserting into a full vector grows its capacity to `max(1, 2 * len)`.
/// [`reserve()`][Self::reserve] and [`resize()`][Self::resize] grow to exactly the requested
/// capacity.
///
/// # Example
///
/// ```rust
/// use raw_vector::Vector;
///
/// let mut numbers: Vector<i32> = Vector::new();
/// numbers.push(1);
/// numbers.push(2);
/// numbers.push(4);
///
/// numbers.insert(2, 3);
/// assert_eq!(numbers, [1, 2, 3, 4]);
///
/// numbers.erase(0);
/// assert_eq!(numbers, [2, 3, 4]);
/// assert!(numbers.capacity() >= 4);
/// ```
pub struct Vector<T, R = MoveRelocation> {
    memory: RawMemory<T>,

    /// Number of live values at the start of `memory`.
    len: usize,

    /// The relocation strategy is a pure type-level choice and owns nothing.
    _relocation: PhantomData<fn() -> R>,
}

impl<T, R> Vector<T, R> {
    /// Creates an empty vector. Does not allocate.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            memory: RawMemory::new(),
            len: 0,
            _relocation: PhantomData,
        }
    }

    /// Creates an empty vector with room for exactly `capacity` values.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            memory: RawMemory::allocate(capacity),
            len: 0,
            _relocation: PhantomData,
        }
    }

    /// Creates a vector of `len` values produced by calling `construct` once per value, in order.
    ///
    /// The capacity is exactly `len`.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated. If `construct` panics, the values created so
    /// far are dropped and the storage is released before the panic continues.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raw_vector::Vector;
    ///
    /// let mut next = 0;
    /// let squares: Vector<u32> = Vector::with_len_with(4, || {
    ///     next += 1;
    ///     next * next
    /// });
    ///
    /// assert_eq!(squares, [1, 4, 9, 16]);
    /// ```
    #[must_use]
    pub fn with_len_with(len: usize, mut construct: impl FnMut() -> T) -> Self {
        let mut vector = Self::with_capacity(len);

        // SAFETY: Offset 0 is always within bounds.
        let start = unsafe { vector.memory.slot(0) };

        // SAFETY: The new region has exactly `len` uninitialized slots. If construction panics,
        // `construct_n()` drops the partial run and `vector` (still empty) releases the region.
        unsafe {
            construct_n(start, len, |_| construct());
        }

        vector.len = len;
        vector
    }

    /// The number of live values in the vector.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector holds no values. It may still hold allocated capacity.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of values the vector can hold without growing.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    /// The address of the first slot.
    ///
    /// The pointer is dangling (but aligned and non-null) if nothing is allocated. It is
    /// invalidated by any operation that grows the vector.
    #[must_use]
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.memory.as_ptr()
    }

    /// The live values as a slice.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: Slots `[0, len)` are live and the base address is aligned and non-null even
        // when nothing is allocated.
        unsafe { slice::from_raw_parts(self.memory.as_ptr(), self.len) }
    }

    /// The live values as a mutable slice.
    #[must_use]
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: Offset 0 is always within bounds.
        let start = unsafe { self.memory.slot(0) };

        // SAFETY: As in `as_slice()`, and `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(start, self.len) }
    }

    /// Returns a reference to the value at `index` without bounds checking.
    ///
    /// Debug builds assert the precondition.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `index < self.len()`.
    #[must_use]
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(
            index < self.len,
            "index {index} is out of bounds of vector with len {}",
            self.len
        );

        // SAFETY: The caller guarantees the slot is within `[0, len)`.
        let slot = unsafe { self.memory.slot(index) };

        // SAFETY: Slots within `[0, len)` are live.
        unsafe { &*slot }
    }

    /// Returns an exclusive reference to the value at `index` without bounds checking.
    ///
    /// Debug builds assert the precondition.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `index < self.len()`.
    #[must_use]
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(
            index < self.len,
            "index {index} is out of bounds of vector with len {}",
            self.len
        );

        // SAFETY: The caller guarantees the slot is within `[0, len)`.
        let slot = unsafe { self.memory.slot(index) };

        // SAFETY: Slots within `[0, len)` are live and `&mut self` guarantees exclusive access.
        unsafe { &mut *slot }
    }

    /// Transfers the storage and values to the returned vector in O(1), leaving `self` empty
    /// with no storage.
    ///
    /// Move-assignment is expressed as `*target = source.take()`: the previous contents of
    /// `target` are dropped and it adopts the storage of `source`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raw_vector::Vector;
    ///
    /// let mut source: Vector<i32> = Vector::from([1, 2, 3]);
    /// let mut target: Vector<i32> = Vector::from([9]);
    /// assert_eq!(target, [9]);
    ///
    /// target = source.take();
    ///
    /// assert_eq!(target, [1, 2, 3]);
    /// assert!(source.is_empty());
    /// assert_eq!(source.capacity(), 0);
    /// ```
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            memory: self.memory.take(),
            len: mem::take(&mut self.len),
            _relocation: PhantomData,
        }
    }

    /// Exchanges the storage and values of `self` and `other` in O(1) without touching any value.
    #[inline]
    pub fn swap_with(&mut self, other: &mut Self) {
        self.memory.swap(&mut other.memory);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Removes the last value and returns it, or `None` if the vector is empty.
    #[must_use]
    pub fn pop(&mut self) -> Option<T> {
        let new_len = self.len.checked_sub(1)?;
        self.len = new_len;

        // SAFETY: `new_len < len <= capacity`.
        let slot = unsafe { self.memory.slot(new_len) };

        // SAFETY: The slot held the last live value and is no longer counted as live, so
        // ownership moves out exactly once.
        Some(unsafe { slot.read() })
    }

    /// Drops the last value.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty. Popping an empty vector is a programming error.
    pub fn pop_back(&mut self) {
        assert!(!self.is_empty(), "pop_back() called on an empty vector");

        drop(self.pop());
    }

    /// Drops the values at and after `len`, keeping the first `len` values.
    ///
    /// Does nothing if `len >= self.len()`. The capacity is unchanged.
    pub fn truncate(&mut self, len: usize) {
        let Some(excess) = self.len.checked_sub(len).filter(|excess| *excess > 0) else {
            return;
        };

        // SAFETY: `len < self.len`, so the tail `[len, len + excess)` is in bounds and live.
        let tail = unsafe { ptr::slice_from_raw_parts_mut(self.memory.slot(len), excess) };

        // Shrink first: a panicking destructor must not leave dropped values counted as live.
        self.len = len;

        // SAFETY: The tail values are live and no longer reachable through `self`.
        unsafe {
            ptr::drop_in_place(tail);
        }
    }

    /// Drops all values. The capacity is unchanged.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Removes the value at `index` and returns it, shifting all values after it one slot left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "removal index (is {index}) should be < len (is {})",
            self.len
        );

        // Cannot underflow because `index < len`.
        let following = self.len.wrapping_sub(index).wrapping_sub(1);

        // SAFETY: `index < len`, so the slot is live and `[index + 1, len)` is in bounds.
        let slot = unsafe { self.memory.slot(index) };

        // SAFETY: The slot is live. Its value is moved out and the slot is overwritten below.
        let removed = unsafe { slot.read() };

        // SAFETY: `index + 1 <= len <= capacity`.
        let next = unsafe { slot.add(1) };

        // SAFETY: Both ranges lie within `[index, len)`; `ptr::copy()` handles the overlap.
        unsafe {
            ptr::copy(next, slot, following);
        }

        // Cannot underflow because `index < len`.
        self.len = self.len.wrapping_sub(1);

        removed
    }

    /// Drops the value at `index`, shifting all values after it one slot left.
    ///
    /// Returns a reference to the value that now occupies `index` (the one that followed the
    /// erased value), or `None` if the erased value was the last one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raw_vector::Vector;
    ///
    /// let mut values: Vector<i32> = Vector::from([1, 2, 3, 4]);
    ///
    /// assert_eq!(values.erase(1), Some(&mut 3));
    /// assert_eq!(values, [1, 3, 4]);
    ///
    /// assert_eq!(values.erase(2), None);
    /// assert_eq!(values, [1, 3]);
    /// ```
    pub fn erase(&mut self, index: usize) -> Option<&mut T> {
        // The value is dropped after the vector is consistent again, so a panicking destructor
        // cannot observe or cause a duplicated slot.
        drop(self.remove(index));

        self.as_mut_slice().get_mut(index)
    }
}

impl<T: Default, R> Vector<T, R> {
    /// Creates a vector of `len` default values. The capacity is exactly `len`.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated. If [`Default::default()`] panics, the values
    /// created so far are dropped and the storage is released before the panic continues.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raw_vector::Vector;
    ///
    /// let zeros: Vector<u8> = Vector::with_len(3);
    ///
    /// assert_eq!(zeros, [0, 0, 0]);
    /// assert_eq!(zeros.capacity(), 3);
    /// ```
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self::with_len_with(len, T::default)
    }
}

impl<T, R: Relocation<T>> Vector<T, R> {
    /// Ensures the vector can hold `new_capacity` values without growing.
    ///
    /// Does nothing if `new_capacity <= self.capacity()`. Otherwise allocates a region of exactly
    /// `new_capacity`, relocates the live values into it and releases the old region.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated. If relocation panics (only possible with
    /// [`CloneRelocation`][crate::CloneRelocation]), the vector is unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raw_vector::Vector;
    ///
    /// let mut values: Vector<i32> = Vector::from([1, 2, 3]);
    ///
    /// values.reserve(10);
    /// assert_eq!(values.capacity(), 10);
    /// assert_eq!(values, [1, 2, 3]);
    ///
    /// // Never shrinks.
    /// values.reserve(2);
    /// assert_eq!(values.capacity(), 10);
    /// ```
    pub fn reserve(&mut self, new_capacity: usize) {
        if let Err(error) = self.try_reserve(new_capacity) {
            panic!("{error}");
        }
    }

    /// Ensures the vector can hold `new_capacity` values without growing, reporting
    /// allocation failure as an error.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the storage cannot be allocated. The vector is unchanged.
    ///
    /// # Panics
    ///
    /// If relocation panics (only possible with [`CloneRelocation`][crate::CloneRelocation]),
    /// the vector is unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raw_vector::{AllocError, Vector};
    ///
    /// let mut values: Vector<u64> = Vector::new();
    ///
    /// assert!(values.try_reserve(100).is_ok());
    /// assert!(matches!(
    ///     values.try_reserve(usize::MAX),
    ///     Err(AllocError::CapacityOverflow { .. })
    /// ));
    /// assert_eq!(values.capacity(), 100);
    /// ```
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }

        trace!(
            len = self.len,
            old_capacity = self.capacity(),
            new_capacity,
            relocation = type_name::<R>(),
            "reserving vector storage"
        );

        let target = RawMemory::try_allocate(new_capacity)?;

        // SAFETY: The gap is at the end and `new_capacity > capacity >= len`, so the target has
        // room for every live value plus the (empty) gap.
        unsafe {
            self.transplant(&target, self.len);
        }

        self.adopt(target, self.len);

        Ok(())
    }

    /// Resizes the vector to `new_len`, calling `construct` once for every new value.
    ///
    /// Shrinking drops the tail `[new_len, len)`. Growing first reserves exactly `new_len`
    /// capacity (if needed) and then appends the new values in order.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated. If `construct` panics, the new values created
    /// so far are dropped and the length is unchanged; the capacity may already have grown.
    pub fn resize_with(&mut self, new_len: usize, mut construct: impl FnMut() -> T) {
        let Some(additional) = new_len.checked_sub(self.len) else {
            self.truncate(new_len);
            return;
        };

        self.reserve(new_len);

        // SAFETY: `len <= new_len <= capacity` after reserving.
        let tail = unsafe { self.memory.slot(self.len) };

        // SAFETY: Slots `[len, new_len)` are in bounds and uninitialized.
        unsafe {
            construct_n(tail, additional, |_| construct());
        }

        self.len = new_len;
    }

    /// Appends `value` to the end of the vector and returns a reference to it.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated. The vector is then unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raw_vector::Vector;
    ///
    /// let mut values: Vector<i32> = Vector::new();
    ///
    /// for value in 1..=3 {
    ///     values.push(value);
    /// }
    ///
    /// assert_eq!(values, [1, 2, 3]);
    /// assert_eq!(values.capacity(), 4);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) -> &mut T {
        self.emplace_back(|| value)
    }

    /// Appends the value returned by `construct` to the end of the vector and returns a
    /// reference to it.
    ///
    /// With spare capacity, the value is written straight into the next free slot. A full
    /// vector grows to `max(1, 2 * len)`: the value is constructed directly in the new region
    /// first, then the existing values are relocated around it.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated. If `construct` or relocation panics (the latter
    /// only with [`CloneRelocation`][crate::CloneRelocation]), the length, capacity and all
    /// existing values are unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raw_vector::Vector;
    ///
    /// let mut names: Vector<String> = Vector::new();
    ///
    /// let name = names.emplace_back(|| "Ferris".to_string());
    /// name.push_str(" the crab");
    ///
    /// assert_eq!(names[0], "Ferris the crab");
    /// ```
    pub fn emplace_back(&mut self, construct: impl FnOnce() -> T) -> &mut T {
        let index = self.len;

        if self.len == self.capacity() {
            self.grow_and_emplace(index, construct);
        } else {
            let value = construct();

            // SAFETY: `len < capacity`, so the slot is in bounds and uninitialized.
            unsafe {
                self.memory.slot(index).write(value);
            }

            // Cannot overflow because `len < capacity`.
            self.len = index.wrapping_add(1);
        }

        // SAFETY: The new value is live at `index < len`.
        unsafe { self.get_unchecked_mut(index) }
    }

    /// Inserts `value` at `index`, shifting the values at and after `index` one slot right,
    /// and returns a reference to the inserted value.
    ///
    /// # Panics
    ///
    /// Panics if `index > self.len()` or if the storage cannot be allocated.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raw_vector::Vector;
    ///
    /// let mut values: Vector<i32> = Vector::from([1, 2, 4]);
    ///
    /// values.insert(2, 3);
    ///
    /// assert_eq!(values, [1, 2, 3, 4]);
    /// ```
    #[inline]
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.emplace(index, || value)
    }

    /// Inserts the value returned by `construct` at `index`, shifting the values at and after
    /// `index` one slot right, and returns a reference to the inserted value.
    ///
    /// The new value is always constructed before any existing value is shifted.
    ///
    /// # Panics
    ///
    /// Panics if `index > self.len()` or if the storage cannot be allocated.
    ///
    /// With spare capacity, the documented guarantee is the basic one: after a panic the vector
    /// is valid but not necessarily unchanged. If `construct` panics, nothing has been shifted
    /// yet; the shift itself is a bitwise move that cannot panic.
    ///
    /// A full vector grows to `max(1, 2 * len)` with the new value constructed directly in the
    /// new region. If `construct` or relocation panics, the new value and any values already
    /// relocated into the new region are dropped and the vector is unchanged.
    pub fn emplace(&mut self, index: usize, construct: impl FnOnce() -> T) -> &mut T {
        assert!(
            index <= self.len,
            "insertion index (is {index}) should be <= len (is {})",
            self.len
        );

        if self.len == self.capacity() {
            self.grow_and_emplace(index, construct);
        } else {
            // Built before shifting, while every existing value is still in place.
            let value = construct();

            // Cannot underflow because `index <= len`.
            let following = self.len.wrapping_sub(index);

            // SAFETY: `index <= len < capacity`, so the slot and the shifted range
            // `[index + 1, len + 1)` are in bounds.
            let slot = unsafe { self.memory.slot(index) };

            // SAFETY: See above.
            let next = unsafe { slot.add(1) };

            // SAFETY: Moves the live values `[index, len)` one slot right, which stays in bounds
            // (see above). `ptr::copy()` handles the overlap.
            unsafe {
                ptr::copy(slot, next, following);
            }

            // SAFETY: The slot at `index` was vacated by the shift and is within bounds.
            unsafe {
                slot.write(value);
            }

            // Cannot overflow because `len < capacity`.
            self.len = self.len.wrapping_add(1);
        }

        // SAFETY: The new value is live at `index < len`.
        unsafe { self.get_unchecked_mut(index) }
    }

    /// Grows to `max(1, 2 * len)`, constructing the value returned by `construct` at `index` of
    /// the new region and relocating the existing values around it.
    ///
    /// If anything panics, the vector is unchanged and the new region is released.
    #[cold]
    fn grow_and_emplace(&mut self, index: usize, construct: impl FnOnce() -> T) {
        debug_assert!(index <= self.len);

        let new_capacity = self.grown_capacity();

        trace!(
            len = self.len,
            old_capacity = self.capacity(),
            new_capacity,
            relocation = type_name::<R>(),
            "growing vector storage"
        );

        let target = RawMemory::<T>::allocate(new_capacity);

        // SAFETY: `index <= len < new_capacity`.
        let slot = unsafe { target.slot(index) };

        let value = construct();

        // SAFETY: The slot is in bounds of the new region and uninitialized.
        unsafe {
            slot.write(value);
        }

        let inserted = scopeguard::guard(slot, |slot| {
            // SAFETY: The new value was written above and has not been adopted by the vector.
            unsafe {
                ptr::drop_in_place(slot);
            }
        });

        // SAFETY: `index <= len` and the new region has room for `len + 1` values.
        unsafe {
            self.transplant(&target, index);
        }

        ScopeGuard::into_inner(inserted);

        // Cannot overflow because `len < new_capacity`.
        let new_len = self.len.wrapping_add(1);
        self.adopt(target, new_len);
    }

    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Shrinking the growth writes out of bounds instead of failing.
    fn grown_capacity(&self) -> usize {
        if self.len == 0 {
            return 1;
        }

        self.len.checked_mul(2).unwrap_or_else(|| {
            panic!(
                "{}",
                AllocError::CapacityOverflow {
                    capacity: self.len
                }
            )
        })
    }

    /// Relocates every live value into `target`, keeping the slot at `gap` free: values before
    /// `gap` keep their index, values at and after it move one slot right.
    ///
    /// If relocation panics, `target` holds no values relocated by this call and the values of
    /// `self` are untouched. The values of `self` are still counted as live afterwards; whether
    /// they still need dropping is decided by [`adopt()`][Self::adopt].
    ///
    /// # Safety
    ///
    /// The caller must ensure that `gap <= self.len` and that `target` is a different region
    /// with room for at least `self.len + 1` values, all of them uninitialized.
    unsafe fn transplant(&self, target: &RawMemory<T>, gap: usize) {
        // Cannot underflow because the caller guarantees `gap <= len`.
        let following = self.len.wrapping_sub(gap);

        let source = self.memory.as_ptr();

        // SAFETY: Offset 0 is always within bounds.
        let target_start = unsafe { target.slot(0) };

        // SAFETY: `source` holds `len >= gap` live values, `target` has room for them and the
        // regions are distinct.
        unsafe {
            R::relocate(source, target_start, gap);
        }

        let prefix = scopeguard::guard(target_start, |target_start| {
            if !R::CONSUMES_SOURCE {
                // SAFETY: The prefix was copied into `target` above and the copies are owned by
                // nobody else. A moved prefix is never rolled back.
                unsafe {
                    ptr::drop_in_place(ptr::slice_from_raw_parts_mut(target_start, gap));
                }
            }
        });

        // SAFETY: `gap <= len <= capacity` of the source.
        let suffix_source = unsafe { source.add(gap) };

        // Cannot overflow because `gap <= len < target capacity`.
        let suffix_offset = gap.wrapping_add(1);

        // SAFETY: The suffix lands in `[gap + 1, len + 1)`, which fits because the target has
        // room for `len + 1` values.
        let suffix_target = unsafe { target_start.add(suffix_offset) };

        // SAFETY: `suffix_source` holds `following` live values, the target range is
        // uninitialized and the regions are distinct.
        unsafe {
            R::relocate(suffix_source, suffix_target, following);
        }

        ScopeGuard::into_inner(prefix);
    }

    /// Replaces the storage with `target`, whose first `new_len` slots are live, then disposes of
    /// the previous region and any values the relocation strategy left alive in it.
    fn adopt(&mut self, mut target: RawMemory<T>, new_len: usize) {
        let old_len = mem::replace(&mut self.len, new_len);
        self.memory.swap(&mut target);

        let previous = target;

        if !R::CONSUMES_SOURCE {
            // SAFETY: Offset 0 is always within bounds.
            let start = unsafe { previous.slot(0) };

            // SAFETY: Copy relocation left the previous values live. They are no longer reachable
            // through `self`, so this is their only drop. The previous region is released when
            // `previous` goes out of scope, even if a destructor panics.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(start, old_len));
            }
        }
    }
}

impl<T: Default, R: Relocation<T>> Vector<T, R> {
    /// Resizes the vector to `new_len`, filling new slots with default values.
    ///
    /// Shrinking drops the tail `[new_len, len)`. Growing first reserves exactly `new_len`
    /// capacity (if needed) and then appends `new_len - len` default values.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated. If [`Default::default()`] panics, the new
    /// values created so far are dropped and the length is unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raw_vector::Vector;
    ///
    /// let mut values: Vector<i32> = Vector::from([1, 2, 3]);
    ///
    /// values.resize(5);
    /// assert_eq!(values, [1, 2, 3, 0, 0]);
    ///
    /// values.resize(1);
    /// assert_eq!(values, [1]);
    /// assert_eq!(values.capacity(), 5);
    /// ```
    pub fn resize(&mut self, new_len: usize) {
        self.resize_with(new_len, T::default);
    }
}

impl<T, R> Drop for Vector<T, R> {
    fn drop(&mut self) {
        // SAFETY: Slots `[0, len)` hold live values owned by the vector. The region itself is
        // released by `RawMemory` afterwards, also when a destructor panics.
        unsafe {
            ptr::drop_in_place(ptr::from_mut(self.as_mut_slice()));
        }
    }
}

impl<T, R> Default for Vector<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, R> Clone for Vector<T, R> {
    /// Creates a vector with capacity exactly `self.len()` holding clones of every value.
    ///
    /// If a clone panics, the clones made so far are dropped and the storage is released.
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.len);

        // SAFETY: Offset 0 is always within bounds.
        let target = unsafe { copy.memory.slot(0) };

        // SAFETY: `self` holds `len` live values; `copy` is a distinct region with exactly `len`
        // uninitialized slots. On panic `copy` is still empty and only releases its region.
        unsafe {
            clone_n(self.memory.as_ptr(), target, self.len);
        }

        copy.len = self.len;
        copy
    }

    /// Makes `self` equal to `source`.
    ///
    /// If `source` has more values than `self` has capacity, a full copy of `source` is built
    /// first and swapped in, so `self` is unchanged if a clone panics. Otherwise the storage is
    /// reused: the overlapping prefix is assigned with [`Clone::clone_from()`], excess values are
    /// dropped and missing values are cloned in place. A panic on this path leaves `self` valid
    /// with a prefix of assigned values.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            debug!(
                capacity = self.capacity(),
                source_len = source.len,
                "assigning vector through copy-and-swap"
            );

            let mut copy = source.clone();
            self.swap_with(&mut copy);
            return;
        }

        for (target, value) in self.as_mut_slice().iter_mut().zip(source.as_slice()) {
            target.clone_from(value);
        }

        let Some(missing) = source.len.checked_sub(self.len) else {
            self.truncate(source.len);
            return;
        };

        // SAFETY: `len < source.len`, so the offset is within the live values of `source`.
        let tail_source = unsafe { source.memory.as_ptr().add(self.len) };

        // SAFETY: `len <= source.len <= capacity`.
        let tail_target = unsafe { self.memory.slot(self.len) };

        // SAFETY: Slots `[len, source.len)` of `self` are in bounds and uninitialized, and
        // `source` holds live values at the same positions. The regions are distinct because
        // `self` and `source` cannot alias.
        unsafe {
            clone_n(tail_source, tail_target, missing);
        }

        self.len = source.len;
    }
}

impl<T, R> Deref for Vector<T, R> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, R> DerefMut for Vector<T, R> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, R> AsRef<[T]> for Vector<T, R> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, R> AsMut<[T]> for Vector<T, R> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

/// Indexing is bounds-checked; an out-of-range index is a programming error and panics.
/// Use [`Vector::get_unchecked()`] to skip the check.
impl<T, R, I: SliceIndex<[T]>> Index<I> for Vector<T, R> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, R, I: SliceIndex<[T]>> IndexMut<I> for Vector<T, R> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<'a, T, R> IntoIterator for &'a Vector<T, R> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, R> IntoIterator for &'a mut Vector<T, R> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, R: Relocation<T>> Extend<T> for Vector<T, R> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();

        // Growth stays geometric so that repeated small extends remain amortized O(1).
        let (lower, _) = iter.size_hint();

        // Cannot underflow because `len <= capacity`.
        if lower > self.capacity().wrapping_sub(self.len) {
            self.reserve(self.len.saturating_add(lower).max(self.grown_capacity()));
        }

        for value in iter {
            self.push(value);
        }
    }
}

impl<T, R: Relocation<T>> FromIterator<T> for Vector<T, R> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vector = Self::new();
        vector.extend(iter);
        vector
    }
}

impl<T, R: Relocation<T>, const N: usize> From<[T; N]> for Vector<T, R> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Debug, R> Debug for Vector<T, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: Hash, R> Hash for Vector<T, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, U, R1, R2> PartialEq<Vector<U, R2>> for Vector<T, R1>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &Vector<U, R2>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, R> Eq for Vector<T, R> {}

impl<T, U, R> PartialEq<[U]> for Vector<T, R>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, R> PartialEq<&[U]> for Vector<T, R>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, R, const N: usize> PartialEq<[U; N]> for Vector<T, R>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use static_assertions::{assert_impl_all, assert_not_impl_any};
    use testing::{FailurePlan, Fallible, LiveCounter, Tracked, expect_panic};

    use super::*;
    use crate::CloneRelocation;

    assert_impl_all!(Vector<u32>: Send, Sync, Debug, Default, Clone);
    assert_impl_all!(Vector<u32, CloneRelocation>: Send, Sync, Clone);
    assert_not_impl_any!(Vector<Rc<u32>>: Send, Sync);
    assert_not_impl_any!(Vector<Cell<u32>>: Sync);

    type Item = Fallible<Tracked<usize>>;

    /// A vector of `len` values `0..len`, with exactly `len` capacity.
    fn tracked<R: Relocation<Item>>(
        counter: &LiveCounter,
        plan: &FailurePlan,
        len: usize,
    ) -> Vector<Item, R> {
        let mut next = 0;
        Vector::with_len_with(len, || {
            next += 1;
            plan.make(counter.track(next - 1))
        })
    }

    fn values<R>(vector: &Vector<Item, R>) -> Vec<usize> {
        vector.iter().map(|item| *item.value().value()).collect()
    }

    #[test]
    fn new_is_empty_without_storage() {
        let vector = Vector::<String>::new();

        assert_eq!(vector.len(), 0);
        assert!(vector.is_empty());
        assert_eq!(vector.capacity(), 0);
        assert!(vector.as_slice().is_empty());
    }

    #[test]
    fn with_capacity_allocates_without_values() {
        let vector = Vector::<String>::with_capacity(7);

        assert_eq!(vector.len(), 0);
        assert_eq!(vector.capacity(), 7);
    }

    #[test]
    fn with_len_default_constructs_values() {
        let vector = Vector::<String>::with_len(3);

        assert_eq!(vector.len(), 3);
        assert_eq!(vector.capacity(), 3);
        assert!(vector.iter().all(String::is_empty));
    }

    #[test]
    fn with_len_with_failure_drops_partial_run() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();

        plan.fail_after(2);
        expect_panic(|| tracked::<MoveRelocation>(&counter, &plan, 5));

        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn push_appends_in_order_and_doubles_capacity() {
        let mut vector = Vector::<usize>::new();
        let mut capacities = Vec::new();

        for value in 0..9 {
            vector.push(value);
            capacities.push(vector.capacity());
        }

        assert_eq!(vector.len(), 9);
        assert_eq!(vector, [0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(capacities, [1, 2, 4, 4, 8, 8, 8, 8, 16]);
    }

    #[test]
    fn push_returns_reference_to_new_value() {
        let mut vector = Vector::<String>::new();

        vector.push("a".to_string()).push('b');

        assert_eq!(vector[0], "ab");
    }

    #[test]
    fn push_with_spare_capacity_keeps_address() {
        let mut vector = Vector::<u8>::with_capacity(4);
        let address = vector.as_ptr();

        vector.push(1);
        vector.push(2);

        assert_eq!(vector.as_ptr(), address);
    }

    #[test]
    fn emplace_back_failure_with_spare_capacity_changes_nothing() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item> = tracked(&counter, &plan, 2);
        vector.reserve(4);

        plan.fail_after(0);
        expect_panic(|| {
            vector.emplace_back(|| plan.make(counter.track(99)));
        });

        assert_eq!(values(&vector), [0, 1]);
        assert_eq!(vector.capacity(), 4);
        assert_eq!(counter.live(), 2);
    }

    #[test]
    fn emplace_back_failure_on_growth_changes_nothing() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item> = tracked(&counter, &plan, 3);
        let address = vector.as_ptr();

        plan.fail_after(0);
        expect_panic(|| {
            vector.emplace_back(|| plan.make(counter.track(99)));
        });

        assert_eq!(values(&vector), [0, 1, 2]);
        assert_eq!(vector.capacity(), 3);
        assert_eq!(vector.as_ptr(), address);
        assert_eq!(counter.live(), 3);
    }

    #[test]
    fn clone_relocation_failure_on_growth_changes_nothing() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item, CloneRelocation> = tracked(&counter, &plan, 4);
        let address = vector.as_ptr();

        // The new value is made, then relocation clones two values and fails on the third.
        plan.fail_after(3);
        expect_panic(|| {
            vector.emplace_back(|| plan.make(counter.track(99)));
        });

        assert_eq!(values(&vector), [0, 1, 2, 3]);
        assert_eq!(vector.capacity(), 4);
        assert_eq!(vector.as_ptr(), address);
        assert_eq!(counter.live(), 4);
    }

    #[test]
    fn clone_relocation_growth_drops_originals() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item, CloneRelocation> = tracked(&counter, &plan, 2);

        vector.push(plan.make(counter.track(2)));

        assert_eq!(values(&vector), [0, 1, 2]);
        assert_eq!(counter.live(), 3);
        // Two originals, two clones and the new value.
        assert_eq!(counter.created(), 5);
    }

    #[test]
    fn move_relocation_growth_creates_nothing() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item> = tracked(&counter, &plan, 2);

        vector.push(plan.make(counter.track(2)));
        vector.reserve(100);

        assert_eq!(values(&vector), [0, 1, 2]);
        assert_eq!(counter.created(), 3);
        assert_eq!(counter.live(), 3);
    }

    #[test]
    fn reserve_smaller_is_noop() {
        let mut vector = Vector::<u32>::from([1, 2, 3]);
        vector.reserve(8);
        let address = vector.as_ptr();

        vector.reserve(8);
        vector.reserve(3);
        vector.reserve(0);

        assert_eq!(vector.capacity(), 8);
        assert_eq!(vector.as_ptr(), address);
        assert_eq!(vector, [1, 2, 3]);
    }

    #[test]
    fn reserve_is_exact() {
        let mut vector = Vector::<u32>::from([1, 2, 3]);

        vector.reserve(10);

        assert_eq!(vector.capacity(), 10);
        assert_eq!(vector.len(), 3);
        assert_eq!(vector, [1, 2, 3]);
    }

    #[test]
    fn reserve_failure_with_clone_relocation_changes_nothing() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item, CloneRelocation> = tracked(&counter, &plan, 3);

        plan.fail_after(1);
        expect_panic(|| vector.reserve(10));

        assert_eq!(values(&vector), [0, 1, 2]);
        assert_eq!(vector.capacity(), 3);
        assert_eq!(counter.live(), 3);
    }

    #[test]
    fn try_reserve_overflow_changes_nothing() {
        let mut vector = Vector::<u64>::from([5, 6]);

        let result = vector.try_reserve(usize::MAX);

        assert_eq!(
            result,
            Err(AllocError::CapacityOverflow {
                capacity: usize::MAX
            })
        );
        assert_eq!(vector, [5, 6]);
        assert_eq!(vector.capacity(), 2);
    }

    #[test]
    fn resize_shrink_drops_tail_only() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item> = tracked(&counter, &plan, 5);

        vector.resize_with(2, || unreachable!());

        assert_eq!(values(&vector), [0, 1]);
        assert_eq!(counter.live(), 2);
        assert_eq!(vector.capacity(), 5);
    }

    #[test]
    fn resize_grow_reserves_exactly_and_constructs_tail() {
        let mut vector = Vector::<u32>::from([7, 8]);

        vector.resize(5);

        assert_eq!(vector, [7, 8, 0, 0, 0]);
        assert_eq!(vector.capacity(), 5);
    }

    #[test]
    fn resize_to_same_len_is_noop() {
        let mut vector = Vector::<u32>::from([1, 2]);

        vector.resize(2);

        assert_eq!(vector, [1, 2]);
    }

    #[test]
    fn resize_failure_keeps_len() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item> = tracked(&counter, &plan, 2);

        let mut next = 10;
        plan.fail_after(2);
        expect_panic(|| {
            vector.resize_with(6, || {
                next += 1;
                plan.make(counter.track(next))
            });
        });

        assert_eq!(values(&vector), [0, 1]);
        assert_eq!(counter.live(), 2);
        assert_eq!(vector.capacity(), 6);
    }

    #[test]
    fn insert_with_spare_capacity_shifts_right() {
        let mut vector = Vector::<u32>::with_capacity(8);
        vector.extend([1, 2, 4, 5]);
        let address = vector.as_ptr();

        let inserted = vector.insert(2, 3);
        assert_eq!(*inserted, 3);

        assert_eq!(vector, [1, 2, 3, 4, 5]);
        assert_eq!(vector.as_ptr(), address);
    }

    #[test]
    fn insert_at_end_and_start() {
        let mut vector = Vector::<u32>::with_capacity(8);
        vector.extend([2, 3]);

        vector.insert(2, 4);
        vector.insert(0, 1);

        assert_eq!(vector, [1, 2, 3, 4]);
    }

    #[test]
    fn insert_into_empty_vector() {
        let mut vector = Vector::<u32>::new();

        vector.insert(0, 9);

        assert_eq!(vector, [9]);
        assert_eq!(vector.capacity(), 1);
    }

    #[test]
    fn insert_on_growth_places_value_between_prefix_and_suffix() {
        let mut vector = Vector::<u32>::from([1, 2, 4, 5]);
        assert_eq!(vector.capacity(), 4);

        vector.insert(2, 3);

        assert_eq!(vector, [1, 2, 3, 4, 5]);
        assert_eq!(vector.capacity(), 8);
    }

    #[test]
    fn insert_on_growth_with_clone_relocation() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item, CloneRelocation> = tracked(&counter, &plan, 4);

        vector.insert(1, plan.make(counter.track(100)));

        assert_eq!(values(&vector), [0, 100, 1, 2, 3]);
        assert_eq!(counter.live(), 5);
    }

    #[test]
    #[should_panic]
    fn insert_past_end_panics() {
        let mut vector = Vector::<u32>::from([1]);

        vector.insert(2, 0);
    }

    #[test]
    fn emplace_failure_with_spare_capacity_changes_nothing() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item> = tracked(&counter, &plan, 3);
        vector.reserve(6);

        plan.fail_after(0);
        expect_panic(|| {
            vector.emplace(1, || plan.make(counter.track(99)));
        });

        assert_eq!(values(&vector), [0, 1, 2]);
        assert_eq!(counter.live(), 3);
    }

    #[test]
    fn emplace_failure_in_suffix_relocation_drops_new_value_and_prefix() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item, CloneRelocation> = tracked(&counter, &plan, 4);

        // New value, then prefix clones of 0 and 1, then the first suffix clone fails.
        plan.fail_after(3);
        expect_panic(|| {
            vector.emplace(2, || plan.make(counter.track(99)));
        });

        assert_eq!(values(&vector), [0, 1, 2, 3]);
        assert_eq!(vector.capacity(), 4);
        assert_eq!(counter.live(), 4);
    }

    #[test]
    fn erase_shifts_left_and_returns_following() {
        let mut vector = Vector::<u32>::from([1, 2, 3, 4]);

        let following = vector.erase(1).copied();

        assert_eq!(following, Some(3));
        assert_eq!(vector, [1, 3, 4]);
        assert_eq!(vector.capacity(), 4);
    }

    #[test]
    fn erase_last_returns_none() {
        let mut vector = Vector::<u32>::from([1, 2]);

        assert_eq!(vector.erase(1), None);
        assert_eq!(vector, [1]);
    }

    #[test]
    fn erase_drops_exactly_one_value() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item> = tracked(&counter, &plan, 4);

        vector.erase(0);

        assert_eq!(values(&vector), [1, 2, 3]);
        assert_eq!(counter.live(), 3);
    }

    #[test]
    #[should_panic]
    fn erase_out_of_bounds_panics() {
        let mut vector = Vector::<u32>::from([1]);

        vector.erase(1);
    }

    #[test]
    fn remove_returns_value() {
        let mut vector = Vector::<String>::from(["x".to_string(), "y".to_string()]);

        let removed = vector.remove(0);

        assert_eq!(removed, "x");
        assert_eq!(vector, ["y"]);
    }

    #[test]
    fn pop_returns_last_values_then_none() {
        let mut vector = Vector::<u32>::from([1, 2]);

        assert_eq!(vector.pop(), Some(2));
        assert_eq!(vector.pop(), Some(1));
        assert_eq!(vector.pop(), None);
        assert_eq!(vector.capacity(), 2);
    }

    #[test]
    fn pop_back_drops_last_value() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item> = tracked(&counter, &plan, 2);

        vector.pop_back();

        assert_eq!(values(&vector), [0]);
        assert_eq!(counter.live(), 1);
    }

    #[test]
    fn pop_back_on_empty_panics() {
        let mut vector = Vector::<u32>::new();

        let message = expect_panic(|| vector.pop_back());

        assert_eq!(
            message.as_deref(),
            Some("pop_back() called on an empty vector")
        );
    }

    #[test]
    fn clear_drops_all_and_keeps_capacity() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut vector: Vector<Item> = tracked(&counter, &plan, 3);

        vector.clear();

        assert!(vector.is_empty());
        assert_eq!(vector.capacity(), 3);
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn drop_drops_every_value_once() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();

        let vector: Vector<Item> = tracked(&counter, &plan, 10);
        assert_eq!(counter.live(), 10);

        drop(vector);
        assert_eq!(counter.live(), 0);
        assert_eq!(counter.dropped(), 10);
    }

    #[test]
    fn clone_is_exact_and_independent() {
        let mut original = Vector::<String>::with_capacity(10);
        original.extend(["a".to_string(), "b".to_string()]);

        let mut copy = original.clone();
        copy[0].push('!');
        copy.push("c".to_string());

        assert_eq!(original, ["a", "b"]);
        assert_eq!(copy, ["a!", "b", "c"]);
        assert_eq!(original.capacity(), 10);
    }

    #[test]
    fn clone_has_exact_capacity() {
        let mut original = Vector::<u8>::with_capacity(10);
        original.extend([1, 2, 3]);

        assert_eq!(original.clone().capacity(), 3);
    }

    #[test]
    fn clone_failure_drops_partial_copy() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let original: Vector<Item> = tracked(&counter, &plan, 4);

        plan.fail_after(2);
        expect_panic(|| original.clone());

        assert_eq!(counter.live(), 4);
    }

    #[test]
    fn clone_from_larger_source_swaps_in_copy() {
        let mut target = Vector::<u32>::from([1, 2, 3]);
        let source = Vector::<u32>::from([9, 9, 9, 9, 9]);

        target.clone_from(&source);

        assert_eq!(target, [9, 9, 9, 9, 9]);
        assert_eq!(target.capacity(), 5);
    }

    #[test]
    fn clone_from_larger_source_failure_leaves_target_unchanged() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut target: Vector<Item> = tracked(&counter, &plan, 3);
        let source: Vector<Item> = Vector::with_len_with(5, || plan.make(counter.track(9)));

        plan.fail_after(2);
        expect_panic(|| target.clone_from(&source));

        assert_eq!(values(&target), [0, 1, 2]);
        assert_eq!(target.capacity(), 3);
        assert_eq!(counter.live(), 8);
    }

    #[test]
    fn clone_from_shorter_source_reuses_storage() {
        let mut target = Vector::<String>::with_capacity(8);
        target.extend(["a", "b", "c", "d"].map(String::from));
        let address = target.as_ptr();
        let source = Vector::<String>::from(["x".to_string(), "y".to_string()]);

        target.clone_from(&source);

        assert_eq!(target, ["x", "y"]);
        assert_eq!(target.capacity(), 8);
        assert_eq!(target.as_ptr(), address);
    }

    #[test]
    fn clone_from_longer_source_within_capacity_reuses_storage() {
        let mut target = Vector::<String>::with_capacity(8);
        target.extend(["a".to_string()]);
        let address = target.as_ptr();
        let source = Vector::<String>::from(["x", "y", "z"].map(String::from));

        target.clone_from(&source);

        assert_eq!(target, ["x", "y", "z"]);
        assert_eq!(target.as_ptr(), address);
    }

    #[test]
    fn clone_from_tail_failure_keeps_assigned_prefix() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut target: Vector<Item> = tracked(&counter, &plan, 1);
        target.reserve(5);
        let source: Vector<Item> = Vector::with_len_with(4, || plan.make(counter.track(7)));

        // The prefix is assigned by `clone_from()`, which clones once; the tail then clones
        // one value and fails on the second.
        plan.fail_after(2);
        expect_panic(|| target.clone_from(&source));

        assert_eq!(values(&target), [7]);
        assert_eq!(counter.live(), 5);
    }

    #[test]
    fn take_moves_storage_and_empties_source() {
        let mut source = Vector::<u32>::from([1, 2, 3]);
        let address = source.as_ptr();

        let taken = source.take();

        assert_eq!(taken, [1, 2, 3]);
        assert_eq!(taken.as_ptr(), address);
        assert_eq!(source.len(), 0);
        assert_eq!(source.capacity(), 0);
    }

    #[test]
    fn move_assignment_drops_previous_contents() {
        let counter = LiveCounter::new();
        let plan = FailurePlan::new();
        let mut target: Vector<Item> = tracked(&counter, &plan, 2);
        let mut source: Vector<Item> = tracked(&counter, &plan, 3);

        target = source.take();

        assert_eq!(values(&target), [0, 1, 2]);
        assert!(source.is_empty());
        assert_eq!(counter.live(), 3);
    }

    #[test]
    fn swap_with_exchanges_everything() {
        let mut a = Vector::<u32>::from([1]);
        let mut b = Vector::<u32>::with_capacity(5);
        b.extend([2, 3]);
        let (a_address, b_address) = (a.as_ptr(), b.as_ptr());

        a.swap_with(&mut b);

        assert_eq!(a, [2, 3]);
        assert_eq!(a.capacity(), 5);
        assert_eq!(a.as_ptr(), b_address);
        assert_eq!(b, [1]);
        assert_eq!(b.as_ptr(), a_address);
    }

    #[test]
    fn get_unchecked_reads_live_values() {
        let mut vector = Vector::<u32>::from([4, 5]);

        assert_eq!(unsafe { *vector.get_unchecked(1) }, 5);

        unsafe { *vector.get_unchecked_mut(0) = 6 };
        assert_eq!(vector, [6, 5]);
    }

    #[test]
    #[should_panic]
    fn index_out_of_bounds_panics() {
        let vector = Vector::<u32>::from([1]);

        _ = vector[1];
    }

    #[test]
    fn iteration_covers_live_values_in_order() {
        let mut vector = Vector::<u32>::from([1, 2, 3]);

        for value in &mut vector {
            *value *= 10;
        }

        let collected: Vec<u32> = (&vector).into_iter().copied().collect();
        assert_eq!(collected, [10, 20, 30]);
        assert_eq!(vector[1..], [20, 30]);
    }

    #[test]
    fn repeated_small_extends_grow_like_push() {
        fn capacity_changes(mut append: impl FnMut(&mut Vector<usize>, usize)) -> (usize, usize) {
            let mut vector = Vector::<usize>::from([1, 2, 3, 4]);
            let mut changes = 0;

            for value in 0..100 {
                let before = vector.capacity();
                append(&mut vector, value);

                if vector.capacity() != before {
                    changes += 1;
                }
            }

            (changes, vector.capacity())
        }

        let pushed = capacity_changes(|vector, value| {
            vector.push(value);
        });
        let extended = capacity_changes(|vector, value| vector.extend([value]));

        assert_eq!(pushed, (5, 128));
        assert_eq!(extended, pushed);
    }

    #[test]
    fn extend_within_capacity_does_not_reallocate() {
        let mut vector = Vector::<u32>::with_capacity(10);
        vector.extend([1, 2]);
        let address = vector.as_ptr();

        vector.extend([3, 4, 5]);

        assert_eq!(vector.capacity(), 10);
        assert_eq!(vector.as_ptr(), address);
    }

    #[test]
    fn extend_larger_than_doubling_reserves_exactly() {
        let mut vector = Vector::<u32>::from([1]);

        vector.extend(0..10);

        assert_eq!(vector.len(), 11);
        assert_eq!(vector.capacity(), 11);
    }

    #[test]
    fn collect_and_extend() {
        let mut vector: Vector<u32> = (0..3).collect();

        vector.extend(3..5);

        assert_eq!(vector, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn equality_ignores_capacity_and_strategy() {
        let mut a = Vector::<u32>::with_capacity(10);
        a.extend([1, 2]);
        let b = Vector::<u32, CloneRelocation>::from([1, 2]);

        assert_eq!(a, b);
        assert_eq!(a, [1, 2][..]);
        assert_ne!(a, Vector::<u32>::from([2, 1]));
    }

    #[test]
    fn debug_lists_values() {
        let vector = Vector::<u32>::from([1, 2]);

        assert_eq!(format!("{vector:?}"), "[1, 2]");
    }

    #[test]
    fn zero_sized_values_are_counted() {
        let mut vector = Vector::<()>::new();

        for _ in 0..100 {
            vector.push(());
        }
        vector.insert(50, ());
        vector.erase(0);

        assert_eq!(vector.len(), 100);
        assert_eq!(vector.capacity(), 128);
    }
}
