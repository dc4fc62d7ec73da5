use std::cell::Cell;
use std::fmt::{self, Debug, Formatter};
use std::ops::Deref;
use std::rc::Rc;

/// The panic message used for every injected failure.
pub const INJECTED_FAILURE: &str = "injected element operation failure";

/// Decides which element operation (construction or clone) fails with a panic.
///
/// A new plan never fails. After [`fail_after(n)`][Self::fail_after], the next `n` operations
/// succeed and the one after them panics with [`INJECTED_FAILURE`]; the plan then disarms itself.
///
/// # Example
///
/// ```rust
/// use testing::{FailurePlan, expect_panic};
///
/// let plan = FailurePlan::new();
/// let value = plan.make(1);
///
/// plan.fail_after(1);
/// let _first = value.clone();
/// expect_panic(|| value.clone());
///
/// // Disarmed again after firing.
/// let _third = value.clone();
/// ```
#[derive(Clone, Debug, Default)]
pub struct FailurePlan {
    remaining_successes: Rc<Cell<Option<usize>>>,
}

impl FailurePlan {
    /// Creates a plan that lets every operation succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the plan so that the operation after the next `successes` operations panics.
    pub fn fail_after(&self, successes: usize) {
        self.remaining_successes.set(Some(successes));
    }

    /// Lets every subsequent operation succeed.
    pub fn disarm(&self) {
        self.remaining_successes.set(None);
    }

    /// Whether a failure is still pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.remaining_successes.get().is_some()
    }

    /// Records one element operation, panicking if this is the planned failure.
    ///
    /// # Panics
    ///
    /// Panics with [`INJECTED_FAILURE`] when the armed countdown reaches this operation.
    pub fn check(&self) {
        match self.remaining_successes.get() {
            None => {}
            Some(0) => {
                self.disarm();
                panic!("{INJECTED_FAILURE}");
            }
            Some(remaining) => {
                // Cannot underflow, zero is handled above.
                self.remaining_successes
                    .set(Some(remaining.wrapping_sub(1)));
            }
        }
    }

    /// Constructs a [`Fallible`] value, which counts as one operation of this plan.
    ///
    /// # Panics
    ///
    /// Panics with [`INJECTED_FAILURE`] if this construction is the planned failure.
    #[must_use]
    pub fn make<T>(&self, value: T) -> Fallible<T> {
        self.check();

        Fallible {
            value,
            plan: self.clone(),
        }
    }
}

/// A value whose clones consult a [`FailurePlan`] and may panic.
pub struct Fallible<T> {
    value: T,
    plan: FailurePlan,
}

impl<T> Fallible<T> {
    /// Returns a reference to the wrapped value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consumes the wrapper, returning the wrapped value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Clone> Clone for Fallible<T> {
    fn clone(&self) -> Self {
        self.plan.make(self.value.clone())
    }
}

impl<T> Deref for Fallible<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T: Debug> Debug for Fallible<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fallible").field(&self.value).finish()
    }
}

impl<T: PartialEq> PartialEq for Fallible<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Fallible<T> {}

impl<T: PartialEq> PartialEq<T> for Fallible<T> {
    fn eq(&self, other: &T) -> bool {
        self.value == *other
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::expect_panic;

    #[test]
    fn unarmed_plan_never_fails() {
        let plan = FailurePlan::new();
        let value = plan.make(1);

        for _ in 0..100 {
            drop(value.clone());
        }

        assert!(!plan.is_armed());
    }

    #[test]
    fn fails_exactly_once_after_successes() {
        let plan = FailurePlan::new();
        let value = plan.make("a");

        plan.fail_after(2);
        drop(value.clone());
        drop(value.clone());

        let message = expect_panic(|| value.clone());
        assert_eq!(message.as_deref(), Some(INJECTED_FAILURE));
        assert!(!plan.is_armed());

        drop(value.clone());
    }

    #[test]
    fn construction_counts_as_operation() {
        let plan = FailurePlan::new();
        plan.fail_after(0);

        expect_panic(|| plan.make(7));
    }

    #[test]
    fn disarm_cancels_pending_failure() {
        let plan = FailurePlan::new();
        plan.fail_after(0);
        plan.disarm();

        assert_eq!(plan.make(3).into_inner(), 3);
    }
}
