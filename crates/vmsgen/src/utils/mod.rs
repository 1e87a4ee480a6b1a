pub mod metamodel;

pub use metamodel::{ComponentDirectory, load_index, load_navigation};
