// Service exports
pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryStore;
pub use postgres::{PoolOptions, PostgresClient};
pub use store::{DriverStore, StoreError};
