// handlers/mod.rs - Three-tier handler layout
//
// Public (no session) -> Protected (require_session) -> Elevated (require_session + require_admin)
//
// Guards are attached per route group in app.rs; handlers only ever see requests
// that already passed their tier's guards.

pub mod elevated;
pub mod protected;
pub mod public;
