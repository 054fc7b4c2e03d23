use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::password::{self, PasswordError, MIN_PASSWORD_LENGTH};
use crate::database::{begin_write, is_busy, is_unique_violation};
use crate::database::models::{Role, User};

const USER_COLUMNS: &str =
    "id, email, name, password_hash, role, google_id, drive_access_token, drive_refresh_token";

/// Suffix used for password-login accounts whose username is not an email address
const LOCAL_ADMIN_DOMAIN: &str = "@local.admin";

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("email already exists: {0}")]
    DuplicateEmail(String),

    #[error("Password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    WeakPassword,

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("Cannot remove the last admin account")]
    LastAdminProtected,

    #[error("user {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

/// Input for [`UserDirectory::create`]
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: Option<String>,
    pub role: Role,
    pub google_id: Option<String>,
}

/// User records, role changes and the last-admin invariant.
///
/// Every mutation runs in its own transaction; a returned error means nothing was written.
#[derive(Clone)]
pub struct UserDirectory {
    pool: SqlitePool,
}

impl UserDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_by_id(&mut conn, id).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_by_email(&mut conn, email).await?)
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_by_google_id(&mut conn, external_id).await?)
    }

    pub async fn list(&self) -> Result<Vec<User>, DirectoryError> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn count_admins(&self) -> Result<i64, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(count_admins(&mut conn).await?)
    }

    /// Find an Admin for password login: `<username>@local.admin` first, then `<username>` as-is
    pub async fn find_admin_for_login(&self, username: &str) -> Result<Option<User>, DirectoryError> {
        let username = username.trim().to_lowercase();
        let sql = format!("SELECT {} FROM users WHERE email = ? AND role = 'Admin'", USER_COLUMNS);

        for email in [format!("{}{}", username, LOCAL_ADMIN_DOMAIN), username.clone()] {
            let user = sqlx::query_as::<_, User>(&sql)
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;
            if user.is_some() {
                return Ok(user);
            }
        }
        Ok(None)
    }

    /// Duplicate email is reported before a weak password. The UNIQUE constraint still
    /// decides races between two creates.
    pub async fn create(&self, new_user: NewUser) -> Result<User, DirectoryError> {
        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(DirectoryError::DuplicateEmail(new_user.email));
        }

        let password_hash = match new_user.password.as_deref() {
            Some(password) if !password.is_empty() => Some(hash_checked(password).await?),
            _ => None,
        };
        let google_id = new_user.google_id.filter(|id| !id.trim().is_empty());

        let mut tx = begin_write(&self.pool).await?;
        let sql = format!(
            "INSERT INTO users (email, name, password_hash, role, google_id) VALUES (?, ?, ?, ?, ?) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.email)
            .bind(&new_user.name)
            .bind(&password_hash)
            .bind(new_user.role.as_str())
            .bind(&google_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DirectoryError::DuplicateEmail(new_user.email.clone())
                } else {
                    DirectoryError::Store(e)
                }
            })?;

        tx.commit().await?;
        info!("Created user {} ({}) with role {}", user.id, user.email, user.role);
        Ok(user)
    }

    /// Resolve an identity-provider login to a local user, creating or linking as needed.
    ///
    /// A uniqueness violation or a lock timeout means a concurrent login got there first; the
    /// lookup is repeated once instead of failing.
    pub async fn upsert_from_identity_provider(
        &self,
        external_id: &str,
        email: &str,
        name: &str,
    ) -> Result<User, DirectoryError> {
        const ATTEMPTS: usize = 2;

        let mut last_error = None;
        for attempt in 1..=ATTEMPTS {
            match self.try_upsert(external_id, email, name).await {
                Ok(user) => return Ok(user),
                Err(DirectoryError::Store(e)) if is_unique_violation(&e) || is_busy(&e) => {
                    warn!("Concurrent identity-provider login for {} (attempt {}), re-reading", email, attempt);
                    last_error = Some(DirectoryError::Store(e));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| DirectoryError::DuplicateEmail(email.to_string())))
    }

    async fn try_upsert(&self, external_id: &str, email: &str, name: &str) -> Result<User, DirectoryError> {
        let mut tx = begin_write(&self.pool).await?;

        if let Some(user) = fetch_by_google_id(&mut tx, external_id).await? {
            return Ok(user);
        }

        if let Some(existing) = fetch_by_email(&mut tx, email).await? {
            sqlx::query("UPDATE users SET google_id = ?, name = ? WHERE id = ?")
                .bind(external_id)
                .bind(name)
                .bind(existing.id)
                .execute(&mut *tx)
                .await?;
            let user = fetch_by_id(&mut tx, existing.id)
                .await?
                .ok_or(DirectoryError::NotFound(existing.id))?;
            tx.commit().await?;
            info!("Linked external identity to existing user {} ({})", user.id, user.email);
            return Ok(user);
        }

        let sql = format!(
            "INSERT INTO users (email, name, role, google_id) VALUES (?, ?, 'User', ?) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(name)
            .bind(external_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("Created user {} ({}) from identity-provider login", user.id, user.email);
        Ok(user)
    }

    /// Change a user's role. Demoting the only Admin is refused.
    pub async fn set_role(&self, user_id: i64, role: Role) -> Result<User, DirectoryError> {
        let mut tx = begin_write(&self.pool).await?;

        // The guard and the write are one statement so concurrent demotions cannot both pass.
        let updated = sqlx::query(
            "UPDATE users SET role = ?1 WHERE id = ?2 \
             AND NOT (role = 'Admin' AND ?1 <> 'Admin' \
                      AND (SELECT COUNT(*) FROM users WHERE role = 'Admin') <= 1)",
        )
        .bind(role.as_str())
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let user = fetch_by_id(&mut tx, user_id)
            .await?
            .ok_or(DirectoryError::NotFound(user_id))?;
        if updated == 0 {
            return Err(DirectoryError::LastAdminProtected);
        }

        tx.commit().await?;
        info!("User {} role set to {}", user.id, user.role);
        Ok(user)
    }

    /// Delete a user. Deleting the only Admin is refused; deleting one of several is allowed.
    pub async fn delete(&self, user_id: i64, requested_by: i64) -> Result<(), DirectoryError> {
        let mut tx = begin_write(&self.pool).await?;

        let deleted = sqlx::query(
            "DELETE FROM users WHERE id = ? \
             AND NOT (role = 'Admin' AND (SELECT COUNT(*) FROM users WHERE role = 'Admin') <= 1)",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if deleted == 0 {
            return match fetch_by_id(&mut tx, user_id).await? {
                Some(_) => Err(DirectoryError::LastAdminProtected),
                None => Err(DirectoryError::NotFound(user_id)),
            };
        }

        tx.commit().await?;
        info!("User {} deleted by user {}", user_id, requested_by);
        Ok(())
    }

    pub async fn set_password(&self, user_id: i64, new_password: &str) -> Result<(), DirectoryError> {
        let password_hash = hash_checked(new_password).await?;

        let mut tx = begin_write(&self.pool).await?;
        let updated = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(DirectoryError::NotFound(user_id));
        }
        tx.commit().await?;

        info!("Password updated for user {}", user_id);
        Ok(())
    }

    /// Store Drive integration tokens. The refresh token is kept unless a new one is supplied.
    pub async fn save_integration_tokens(
        &self,
        user_id: i64,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), DirectoryError> {
        let mut tx = begin_write(&self.pool).await?;
        let updated = sqlx::query(
            "UPDATE users SET drive_access_token = ?, \
             drive_refresh_token = COALESCE(?, drive_refresh_token) WHERE id = ?",
        )
        .bind(access_token)
        .bind(refresh_token)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(DirectoryError::NotFound(user_id));
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn hash_checked(password: &str) -> Result<String, DirectoryError> {
    if !password::meets_minimum_length(password) {
        return Err(DirectoryError::WeakPassword);
    }
    Ok(password::hash_password_blocking(password.to_string()).await?)
}

async fn fetch_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(conn).await
}

async fn fetch_by_email(conn: &mut SqliteConnection, email: &str) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
    sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(conn).await
}

async fn fetch_by_google_id(conn: &mut SqliteConnection, google_id: &str) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {} FROM users WHERE google_id = ?", USER_COLUMNS);
    sqlx::query_as::<_, User>(&sql).bind(google_id).fetch_optional(conn).await
}

pub(crate) async fn count_admins(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'Admin'")
        .fetch_one(conn)
        .await
}
