pub mod memory;

pub use memory::{Dataset, RegistryStore};
