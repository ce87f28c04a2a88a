pub mod memory;

pub use memory::{shared_config_store, shared_state_store, InMemoryConfigStore, InMemoryStateStore};
