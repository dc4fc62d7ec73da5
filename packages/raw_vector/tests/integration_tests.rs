//! Integration tests for the `raw_vector` package.
//!
//! These tests exercise `Vector` through its public API only: ordering, growth and the
//! behavior of every mutating operation on realistic sequences.

use raw_vector::{CloneRelocation, Vector};
use testing::LiveCounter;

#[test]
fn push_back_three_values() {
    let mut vector: Vector<i32> = Vector::new();

    vector.push(1);
    vector.push(2);
    vector.push(3);

    assert_eq!(vector.len(), 3);
    assert_eq!(vector, [1, 2, 3]);
    assert!(vector.capacity() >= 3);
}

#[test]
fn reserve_keeps_values() {
    let mut vector: Vector<i32> = Vector::from([1, 2, 3]);

    vector.reserve(10);

    assert_eq!(vector.capacity(), 10);
    assert_eq!(vector.len(), 3);
    assert_eq!(vector, [1, 2, 3]);
}

#[test]
fn insert_in_middle() {
    let mut vector: Vector<i32> = Vector::from([1, 2, 4]);

    vector.insert(2, 3);

    assert_eq!(vector, [1, 2, 3, 4]);
    assert_eq!(vector.len(), 4);
}

#[test]
fn erase_in_middle() {
    let mut vector: Vector<i32> = Vector::from([1, 2, 3, 4]);

    vector.erase(1);

    assert_eq!(vector, [1, 3, 4]);
    assert_eq!(vector.len(), 3);
}

#[test]
fn pushes_are_kept_in_order() {
    let mut vector: Vector<usize> = Vector::new();

    for value in 0..1000_usize {
        vector.push(value);
    }

    assert_eq!(vector.len(), 1000);
    for (index, value) in vector.iter().enumerate() {
        assert_eq!(*value, index);
    }
}

#[test]
fn reserve_below_capacity_changes_nothing() {
    let mut vector: Vector<&str> = Vector::from(["a", "b", "c"]);
    vector.reserve(5);
    let address = vector.as_ptr();

    for capacity in 0..=5 {
        vector.reserve(capacity);
    }

    assert_eq!(vector.capacity(), 5);
    assert_eq!(vector.as_ptr(), address);
    assert_eq!(vector, ["a", "b", "c"]);
}

#[test]
fn resize_drops_exactly_the_tail() {
    let counter = LiveCounter::new();
    let mut vector: Vector<_> = (0..6).map(|value| counter.track(value)).collect();

    vector.resize_with(2, || counter.track(99));

    let values: Vec<i32> = vector.iter().map(|value| *value.value()).collect();
    assert_eq!(values, [0, 1]);
    assert_eq!(counter.live(), 2);
    assert_eq!(counter.dropped(), 4);
}

#[test]
fn resize_default_constructs_exactly_the_missing_values() {
    let mut vector: Vector<String> = Vector::from([String::from("kept")]);

    vector.resize(4);

    assert_eq!(vector, ["kept", "", "", ""]);
}

#[test]
fn erase_shifts_following_values_left() {
    let mut vector: Vector<u32> = (0..10).collect();

    let following = vector.erase(4).copied();

    assert_eq!(following, Some(5));
    assert_eq!(vector, [0, 1, 2, 3, 5, 6, 7, 8, 9]);
}

#[test]
fn insert_at_every_position() {
    for position in 0..=5 {
        let mut vector: Vector<u32> = (0..5).collect();

        let inserted = *vector.insert(position, 100);

        assert_eq!(inserted, 100);
        assert_eq!(vector.len(), 6);
        assert_eq!(vector[position], 100);

        let mut expected: Vec<u32> = (0..5).collect();
        expected.insert(position, 100);
        assert_eq!(vector, expected[..]);
    }
}

#[test]
fn insert_copy_of_own_value_at_full_capacity() {
    let mut vector: Vector<String> = Vector::from([String::from("x"), String::from("y")]);
    assert_eq!(vector.len(), vector.capacity());

    let copy = vector[1].clone();
    vector.insert(0, copy);

    assert_eq!(vector, ["y", "x", "y"]);
}

#[test]
fn copy_is_independent() {
    let original: Vector<Vec<i32>> = Vector::from([vec![1], vec![2, 3]]);

    let mut copy = original.clone();
    copy[0].push(10);
    copy.pop_back();
    drop(original.clone());

    assert_eq!(original, [vec![1], vec![2, 3]]);
    assert_eq!(copy, [vec![1, 10]]);
}

#[test]
fn move_leaves_source_empty() {
    let mut source: Vector<i32> = Vector::from([1, 2, 3]);
    let capacity = source.capacity();

    let target = source.take();

    assert_eq!(target, [1, 2, 3]);
    assert_eq!(target.capacity(), capacity);
    assert_eq!(source.len(), 0);

    // The emptied source is fully usable again.
    source.push(4);
    assert_eq!(source, [4]);
}

#[test]
fn assign_larger_vector() {
    let mut target: Vector<i32> = Vector::from([1, 2, 3]);
    let source: Vector<i32> = Vector::from([9, 9, 9, 9, 9]);

    target.clone_from(&source);

    assert_eq!(target, source);
}

#[test]
fn assign_to_self_sized_copies() {
    let mut target: Vector<i32> = Vector::from([1, 2, 3]);
    let source = target.clone();

    target.clone_from(&source);

    assert_eq!(target, [1, 2, 3]);
}

#[test]
fn every_value_is_dropped_once_across_operations() {
    let counter = LiveCounter::new();

    {
        let mut vector: Vector<_> = Vector::new();

        for value in 0..20 {
            vector.push(counter.track(value));
        }
        vector.insert(3, counter.track(100));
        vector.erase(7);
        drop(vector.remove(0));
        vector.pop_back();
        vector.truncate(10);
        vector.resize_with(15, || counter.track(200));

        let copy = vector.clone();
        vector.clone_from(&copy);

        assert_eq!(vector.len(), 15);
    }

    assert_eq!(counter.live(), 0);
    assert_eq!(counter.created(), counter.dropped());
}

#[test]
fn clone_relocation_matches_move_relocation() {
    let mut moved: Vector<String> = Vector::new();
    let mut cloned: Vector<String, CloneRelocation> = Vector::new();

    for value in 0..50 {
        moved.push(value.to_string());
        cloned.push(value.to_string());
    }
    moved.insert(25, String::from("middle"));
    cloned.insert(25, String::from("middle"));

    assert_eq!(moved, cloned);
    assert_eq!(moved.capacity(), cloned.capacity());
}

#[test]
fn usable_as_slice() {
    let mut vector: Vector<i32> = Vector::from([3, 1, 2]);

    vector.sort_unstable();

    assert_eq!(vector.first(), Some(&1));
    assert!(vector.contains(&3));
    assert_eq!(vector.iter().sum::<i32>(), 6);
}

#[test]
fn zero_sized_values() {
    let mut vector: Vector<()> = Vector::with_len(10);

    vector.push(());
    vector.resize(3);
    vector.reserve(1000);

    assert_eq!(vector.len(), 3);
    assert_eq!(vector.capacity(), 1000);
}
