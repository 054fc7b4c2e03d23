// handlers/elevated/mod.rs - Handlers behind require_session + require_admin
//
// Admin-only user management. The role guard has already rejected non-admins
// with 403 before any of these run.

pub mod users;
