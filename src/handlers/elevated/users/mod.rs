// handlers/elevated/users/mod.rs - /api/users handlers

use crate::database::models::Role;
use crate::services::DirectoryError;

pub mod change_password;
pub mod create;
pub mod delete;
pub mod list;
pub mod role;

pub use change_password::change_password_post;
pub use create::user_create;
pub use delete::user_delete;
pub use list::user_list;
pub use role::user_role_put;

/// Parse a wire role name. Only `Admin` and `User` are accepted.
fn parse_role(role: &str) -> Result<Role, DirectoryError> {
    role.parse::<Role>().map_err(|e| DirectoryError::InvalidRole(e.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_are_case_sensitive() {
        assert_eq!(parse_role("Admin").unwrap(), Role::Admin);
        assert_eq!(parse_role("User").unwrap(), Role::User);
        assert!(matches!(parse_role("admin"), Err(DirectoryError::InvalidRole(_))));
        assert!(matches!(parse_role("Owner"), Err(DirectoryError::InvalidRole(_))));
    }
}
