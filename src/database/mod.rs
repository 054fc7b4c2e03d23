pub mod bootstrap;
pub mod manager;
pub mod models;

pub use manager::{begin_write, is_busy, is_unique_violation, DatabaseError, DatabaseManager};
