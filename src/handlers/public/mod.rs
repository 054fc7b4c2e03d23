// handlers/public/mod.rs - Handlers without a session guard
//
// Login endpoints issue session tokens. Settings are readable by anyone; saving
// them checks the session and Admin role inside the handler.

pub mod auth;
pub mod settings;
