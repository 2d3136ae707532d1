//! Session persistence adapters.

mod memory;

pub use memory::InMemorySessionStore;
