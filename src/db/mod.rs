//! Database layer (in-process catalog).

pub mod memory;

pub use memory::{MemoryDb, Stored};
