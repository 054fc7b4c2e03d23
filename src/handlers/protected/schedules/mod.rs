// handlers/protected/schedules/mod.rs - Recurring and one-off schedule CRUD
//
// Both resources share the same shape: list, create (201), full-replace update, delete.

pub mod one_off;
pub mod recurring;
