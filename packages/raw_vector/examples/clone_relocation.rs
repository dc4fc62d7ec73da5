//! Demonstrates the failure-safety guarantees of `Vector` with the `CloneRelocation` strategy.
//!
//! A value type whose clone panics on demand shows that growth leaves the vector untouched when
//! relocation fails partway through.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use raw_vector::{CloneRelocation, Vector};

thread_local! {
    static FAIL_NEXT_CLONE: Cell<bool> = const { Cell::new(false) };
}

#[derive(Debug, PartialEq)]
struct Fragile(u32);

impl Clone for Fragile {
    fn clone(&self) -> Self {
        assert!(
            !FAIL_NEXT_CLONE.replace(false),
            "refusing to clone Fragile({})",
            self.0
        );

        Self(self.0)
    }
}

fn main() {
    // Keep the demonstration output readable.
    panic::set_hook(Box::new(|info| println!("Panicked: {info}")));

    let mut values: Vector<Fragile, CloneRelocation> = Vector::new();
    values.push(Fragile(1));
    values.push(Fragile(2));

    println!(
        "Before: {values:?} (len {}, capacity {})",
        values.len(),
        values.capacity()
    );

    FAIL_NEXT_CLONE.set(true);

    // The vector is full, so this must relocate both values. The first clone fails.
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        values.push(Fragile(3));
    }));

    println!("Push failed: {}", result.is_err());
    println!(
        "After: {values:?} (len {}, capacity {})",
        values.len(),
        values.capacity()
    );

    // Nothing was lost and the vector is still usable.
    values.push(Fragile(3));
    println!("Retried: {values:?}");

    drop(panic::take_hook());
}
