#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A growable, contiguous container built directly on top of raw allocator memory, with
//! documented behavior for every failure an element operation can cause.
//!
//! The crate has two layers:
//!
//! - [`RawMemory<T>`] owns an uninitialized region with room for a fixed number of `T`. It
//!   allocates and releases storage and hands out slot addresses, but never constructs or drops
//!   values.
//! - [`Vector<T, R>`] keeps the first `len` slots of a [`RawMemory<T>`] populated and manages
//!   the lifetime of every value in them.
//!
//! # Key Features
//!
//! - **Amortized O(1) append**: a full vector grows to `max(1, 2 * len)`
//! - **Exact reservation**: [`Vector::reserve()`] and [`Vector::resize()`] allocate exactly what
//!   was asked for
//! - **Construction in place**: [`Vector::emplace_back()`] and [`Vector::emplace()`] build the
//!   new value directly in its final slot
//! - **Failure safety**: growth never leaves a vector half-relocated, and a panicking element
//!   operation never leaks, duplicates or double-drops a value
//! - **Selectable relocation**: the [`Relocation`] strategy decides whether growth moves values
//!   ([`MoveRelocation`], the default) or clones them ([`CloneRelocation`])
//!
//! # Failure model
//!
//! Element construction and cloning report failure by panicking. Each operation documents the
//! state it leaves behind when that happens:
//!
//! - Appending and growing-insert leave the vector **unchanged**.
//! - Reserving leaves the vector **unchanged**.
//! - Inserting into spare capacity and assigning a shorter-or-equal vector leave the vector
//!   **valid** but possibly modified.
//!
//! Allocation failure is reported as [`AllocError`] by the `try_` operations and as a panic
//! with the same message by everything else.
//!
//! # Example
//!
//! ```rust
//! use raw_vector::Vector;
//!
//! let mut words: Vector<String> = Vector::new();
//!
//! words.push("hello".to_string());
//! words.emplace_back(|| "world".to_string());
//! words.insert(1, "brave new".to_string());
//!
//! assert_eq!(words, ["hello", "brave new", "world"]);
//! assert_eq!(words.len(), 3);
//! assert_eq!(words.capacity(), 4);
//!
//! let sentence = words.join(" ");
//! assert_eq!(sentence, "hello brave new world");
//! ```
//!
//! # Relocating by cloning
//!
//! ```rust
//! use raw_vector::{CloneRelocation, Vector};
//!
//! let mut values: Vector<Vec<u8>, CloneRelocation> = Vector::with_capacity(1);
//! values.push(vec![1, 2]);
//!
//! // Growth clones the existing value into the new region, then drops the original.
//! values.push(vec![3]);
//!
//! assert_eq!(values, [vec![1, 2], vec![3]]);
//! ```

mod error;
mod raw_memory;
mod relocation;
mod vector;

pub use error::AllocError;
pub(crate) use error::Result;
pub use raw_memory::RawMemory;
pub use relocation::{CloneRelocation, MoveRelocation, Relocation};
pub use vector::Vector;
