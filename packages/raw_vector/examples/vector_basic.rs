//! Basic usage example for `Vector`.
//!
//! This example demonstrates appending, inserting and erasing values, and how capacity grows
//! as values are added. Every reallocation is also logged at trace level.

use raw_vector::Vector;
use tracing::Level;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_target(false)
        .init();

    let mut planets: Vector<String> = Vector::new();

    println!(
        "Created Vector with len {} and capacity {}",
        planets.len(),
        planets.capacity()
    );

    for name in ["Mercury", "Venus", "Mars", "Jupiter"] {
        planets.push(name.to_string());

        println!(
            "Pushed {name}: len {}, capacity {}",
            planets.len(),
            planets.capacity()
        );
    }

    // Earth goes between Venus and Mars. The vector is full, so this grows it.
    let earth = planets.insert(2, "Earth".to_string());
    earth.push_str(" (home)");

    println!("After insert: {planets:?}");

    // Construct the value directly in its slot.
    planets.emplace_back(|| "Saturn".to_string());

    // Erasing returns the value that moved into the erased slot.
    if let Some(following) = planets.erase(0) {
        println!("Erased Mercury, {following} now comes first");
    }

    planets.reserve(16);
    println!(
        "After reserve: len {}, capacity {}",
        planets.len(),
        planets.capacity()
    );

    // The vector dereferences to a slice.
    let longest = planets.iter().map(String::len).max().unwrap_or_default();
    println!("Longest name has {longest} bytes");

    planets.resize(3);
    println!("After resize: {planets:?}");

    let copy = planets.clone();
    planets.clear();

    println!("Cleared original ({} values), copy still has {copy:?}", planets.len());
}
