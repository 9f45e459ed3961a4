//! # shopcrm-database
//!
//! PostgreSQL connection management, the store traits the communication
//! scheduler depends on, and their PostgreSQL and in-memory
//! implementations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{AppointmentStore, CustomerStore, MarkOutcome};
