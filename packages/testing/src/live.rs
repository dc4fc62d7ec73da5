use std::cell::Cell;
use std::fmt::{self, Debug, Formatter};
use std::ops::Deref;
use std::rc::Rc;

/// Counts how many [`Tracked`] values created through it are currently alive.
///
/// Clones of the counter share the same counts, so a test can keep one copy and hand
/// others to the values it creates.
///
/// # Example
///
/// ```rust
/// use testing::LiveCounter;
///
/// let counter = LiveCounter::new();
///
/// let a = counter.track(1);
/// let b = a.clone();
/// assert_eq!(counter.live(), 2);
///
/// drop(a);
/// drop(b);
/// assert_eq!(counter.live(), 0);
/// assert_eq!(counter.created(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LiveCounter {
    counts: Rc<Counts>,
}

#[derive(Debug, Default)]
struct Counts {
    created: Cell<usize>,
    dropped: Cell<usize>,
}

impl LiveCounter {
    /// Creates a counter with no values created yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `value` so that its lifetime is recorded by this counter.
    #[must_use]
    pub fn track<T>(&self, value: T) -> Tracked<T> {
        self.record_created();

        Tracked {
            value,
            counter: self.clone(),
        }
    }

    /// Number of tracked values created and not yet dropped.
    ///
    /// # Panics
    ///
    /// Panics if more values were dropped than created, which means something was
    /// dropped twice.
    #[must_use]
    pub fn live(&self) -> usize {
        self.created()
            .checked_sub(self.dropped())
            .expect("more tracked values were dropped than created - double drop detected")
    }

    /// Total number of tracked values ever created, including clones.
    #[must_use]
    pub fn created(&self) -> usize {
        self.counts.created.get()
    }

    /// Total number of tracked values dropped.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.counts.dropped.get()
    }

    fn record_created(&self) {
        let created = &self.counts.created;
        created.set(created.get().wrapping_add(1));
    }

    fn record_dropped(&self) {
        let dropped = &self.counts.dropped;
        dropped.set(dropped.get().wrapping_add(1));
    }
}

/// A value whose creation, cloning and dropping is recorded by a [`LiveCounter`].
pub struct Tracked<T> {
    value: T,
    counter: LiveCounter,
}

impl<T> Tracked<T> {
    /// Returns a reference to the wrapped value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Clone> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        self.counter.track(self.value.clone())
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.counter.record_dropped();
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T: Debug> Debug for Tracked<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&self.value).finish()
    }
}

impl<T: PartialEq> PartialEq for Tracked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Tracked<T> {}

impl<T: PartialEq> PartialEq<T> for Tracked<T> {
    fn eq(&self, other: &T) -> bool {
        self.value == *other
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn counts_creation_and_drop() {
        let counter = LiveCounter::new();

        let value = counter.track("x".to_string());
        assert_eq!(counter.live(), 1);
        assert_eq!(counter.created(), 1);
        assert_eq!(counter.dropped(), 0);

        drop(value);
        assert_eq!(counter.live(), 0);
        assert_eq!(counter.dropped(), 1);
    }

    #[test]
    fn clone_counts_as_creation() {
        let counter = LiveCounter::new();

        let original = counter.track(5);
        let copy = original.clone();

        assert_eq!(counter.live(), 2);
        assert_eq!(*copy, 5);
        assert_eq!(copy, original);
    }

    #[test]
    fn counter_clones_share_counts() {
        let counter = LiveCounter::new();
        let other = counter.clone();

        let _value = other.track(());

        assert_eq!(counter.live(), 1);
    }
}
