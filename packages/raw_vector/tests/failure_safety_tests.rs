//! Failure-safety tests for the `raw_vector` package.
//!
//! Element operations are made to panic at chosen points with `testing::FailurePlan`, and
//! `testing::LiveCounter` verifies afterwards that no value was leaked or dropped twice and that
//! the vector is left in the state each operation promises.

use raw_vector::{CloneRelocation, MoveRelocation, Relocation, Vector};
use testing::{FailurePlan, Fallible, INJECTED_FAILURE, LiveCounter, Tracked, expect_panic};

type Item = Fallible<Tracked<u32>>;

struct Fixture {
    counter: LiveCounter,
    plan: FailurePlan,
}

impl Fixture {
    fn new() -> Self {
        Self {
            counter: LiveCounter::new(),
            plan: FailurePlan::new(),
        }
    }

    fn item(&self, value: u32) -> Item {
        self.plan.make(self.counter.track(value))
    }

    fn vector<R: Relocation<Item>>(&self, values: &[u32]) -> Vector<Item, R> {
        values.iter().map(|value| self.item(*value)).collect()
    }
}

fn values<R>(vector: &Vector<Item, R>) -> Vec<u32> {
    vector.iter().map(|item| *item.value().value()).collect()
}

#[test]
fn failed_assignment_leaves_target_unchanged() {
    let fixture = Fixture::new();
    let mut target: Vector<Item> = fixture.vector(&[1, 2, 3]);
    let capacity = target.capacity();
    let source: Vector<Item> = fixture.vector(&[9, 9, 9, 9, 9]);
    assert!(source.len() > capacity);

    fixture.plan.fail_after(3);
    let message = expect_panic(|| target.clone_from(&source));

    assert_eq!(message.as_deref(), Some(INJECTED_FAILURE));
    assert_eq!(values(&target), [1, 2, 3]);
    assert_eq!(target.capacity(), capacity);
    assert_eq!(fixture.counter.live(), 8);
}

#[test]
fn failed_append_on_growth_leaves_vector_unchanged() {
    fn check<R: Relocation<Item>>(failing_operation: usize) {
        let fixture = Fixture::new();
        let mut vector: Vector<Item, R> = Vector::with_capacity(4);
        vector.extend([10, 20, 30, 40].map(|value| fixture.item(value)));
        let address = vector.as_ptr();

        fixture.plan.fail_after(failing_operation);
        expect_panic(|| {
            vector.emplace_back(|| fixture.item(50));
        });

        assert_eq!(values(&vector), [10, 20, 30, 40]);
        assert_eq!(vector.capacity(), 4);
        assert_eq!(vector.as_ptr(), address);
        assert_eq!(fixture.counter.live(), 4);

        // Still fully usable afterwards.
        vector.push(fixture.item(50));
        assert_eq!(values(&vector), [10, 20, 30, 40, 50]);
    }

    check::<MoveRelocation>(0);

    // Construction is operation 0, the four relocating clones are operations 1 to 4.
    for failing_operation in 0..=4 {
        check::<CloneRelocation>(failing_operation);
    }
}

#[test]
fn failed_insert_on_growth_leaves_vector_unchanged() {
    for failing_operation in 0..=3 {
        let fixture = Fixture::new();
        let mut vector: Vector<Item, CloneRelocation> = fixture.vector(&[1, 2, 3]);
        assert_eq!(vector.len(), vector.capacity());

        fixture.plan.fail_after(failing_operation);
        expect_panic(|| {
            vector.insert(1, fixture.item(100));
        });

        assert_eq!(values(&vector), [1, 2, 3]);
        assert_eq!(fixture.counter.live(), 3);
    }
}

#[test]
fn failed_insert_with_spare_capacity_leaves_valid_vector() {
    let fixture = Fixture::new();
    let mut vector: Vector<Item> = fixture.vector(&[1, 2, 3]);
    vector.reserve(8);

    fixture.plan.fail_after(0);
    expect_panic(|| {
        vector.emplace(1, || fixture.item(100));
    });

    // No shift happens before the new value exists.
    assert_eq!(values(&vector), [1, 2, 3]);
    assert_eq!(fixture.counter.live(), 3);
}

#[test]
fn failed_reserve_leaves_vector_unchanged() {
    for failing_operation in 0..3 {
        let fixture = Fixture::new();
        let mut vector: Vector<Item, CloneRelocation> = fixture.vector(&[1, 2, 3]);
        let capacity = vector.capacity();

        fixture.plan.fail_after(failing_operation);
        expect_panic(|| vector.reserve(100));

        assert_eq!(values(&vector), [1, 2, 3]);
        assert_eq!(vector.capacity(), capacity);
        assert_eq!(fixture.counter.live(), 3);
    }
}

#[test]
fn failed_resize_keeps_length() {
    let fixture = Fixture::new();
    let mut vector: Vector<Item> = fixture.vector(&[1]);

    fixture.plan.fail_after(2);
    expect_panic(|| vector.resize_with(5, || fixture.item(0)));

    assert_eq!(values(&vector), [1]);
    assert_eq!(fixture.counter.live(), 1);
}

#[test]
fn failed_clone_leaves_original_intact() {
    let fixture = Fixture::new();
    let original: Vector<Item> = fixture.vector(&[1, 2, 3, 4]);

    fixture.plan.fail_after(2);
    expect_panic(|| original.clone());

    assert_eq!(values(&original), [1, 2, 3, 4]);
    assert_eq!(fixture.counter.live(), 4);
}

#[test]
fn failed_construction_of_new_vector_releases_everything() {
    let fixture = Fixture::new();

    fixture.plan.fail_after(3);
    expect_panic(|| Vector::<Item>::with_len_with(10, || fixture.item(7)));

    assert_eq!(fixture.counter.live(), 0);
}

#[test]
fn dropping_after_failures_drops_every_value_once() {
    let fixture = Fixture::new();

    {
        let mut vector: Vector<Item, CloneRelocation> = fixture.vector(&[1, 2]);

        // Each attempt fails on one of the two relocating clones.
        for failing_operation in [0, 1, 1, 0] {
            fixture.plan.fail_after(failing_operation);
            expect_panic(|| vector.reserve(vector.capacity() * 2 + 100));
        }

        fixture.plan.disarm();
        vector.push(fixture.item(3));
        assert_eq!(values(&vector), [1, 2, 3]);
    }

    assert_eq!(fixture.counter.live(), 0);
    assert_eq!(fixture.counter.created(), fixture.counter.dropped());
}
