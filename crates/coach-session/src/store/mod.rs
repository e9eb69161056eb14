//! [`crate::services::SessionStore`] implementations.

mod memory;
mod postgres;

pub use memory::{MemoryStore, SavedGame};
pub use postgres::PgStore;
