//! User repository
//!
//! Accounts, authentication and profile updates.

use chrono::{DateTime, Utc};
use lms_core::models::{NewUser, Password, ProfileUpdate, Role};
use sqlx::{FromRow, SqlitePool};

use super::{unique_or, DbError};

const USER_COLUMNS: &str =
    "id, username, password, role, name, email, phone_nr, age, created_at";

/// User record from database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_nr: Option<String>,
    pub age: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name to show in pages: display name if set, else username.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an account. A taken username is a `Conflict`.
    pub async fn create(&self, user: &NewUser) -> Result<User, DbError> {
        let sql = format!(
            "INSERT INTO users (username, password, role, name, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.username.as_str())
            .bind(user.password.as_str())
            .bind(user.role.as_str())
            .bind(user.name.as_ref().map(|n| n.as_str()))
            .bind(Utc::now())
            .fetch_one(self.pool)
            .await
            .map_err(|e| unique_or(e, format!("username '{}' is already taken", user.username.as_str())))
    }

    pub async fn get(&self, id: i64) -> Result<User, DbError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Check credentials. `None` for unknown user or wrong password; the
    /// two cases are not distinguished to callers.
    pub async fn authenticate(&self, username: &str, password: &Password) -> Result<Option<User>, DbError> {
        let Some(user) = self.find_by_username(username).await? else {
            tracing::debug!(username, "login for unknown user");
            return Ok(None);
        };

        if user.password == password.as_str() {
            Ok(Some(user))
        } else {
            tracing::debug!(user_id = user.id, "password mismatch");
            Ok(None)
        }
    }

    /// All users, optionally restricted to one role, ordered by username.
    pub async fn list(&self, role: Option<Role>) -> Result<Vec<User>, DbError> {
        let users = match role {
            Some(role) => {
                let sql = format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY username"
                );
                sqlx::query_as::<_, User>(&sql)
                    .bind(role.as_str())
                    .fetch_all(self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username");
                sqlx::query_as::<_, User>(&sql).fetch_all(self.pool).await?
            }
        };
        Ok(users)
    }

    /// Replace the editable profile fields of `id`.
    pub async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<User, DbError> {
        let sql = format!(
            "UPDATE users
             SET username = $1, password = $2, name = $3, email = $4, phone_nr = $5, age = $6
             WHERE id = $7
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(update.username.as_str())
            .bind(update.password.as_str())
            .bind(update.name.as_ref().map(|v| v.as_str()))
            .bind(update.email.as_ref().map(|v| v.as_str()))
            .bind(update.phone_nr.as_ref().map(|v| v.as_str()))
            .bind(update.age.map(|a| i64::from(a.get())))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| {
                unique_or(
                    e,
                    format!("username '{}' is already taken", update.username.as_str()),
                )
            })?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Delete an account.
    ///
    /// Instructor assignments, enrollments and submissions cascade; authored
    /// materials stay with their course. Returns the stored upload names of
    /// the deleted submissions so the caller can remove the files.
    pub async fn delete(&self, id: i64) -> Result<Vec<String>, DbError> {
        let mut tx = self.pool.begin().await?;

        let files: Vec<(String,)> = sqlx::query_as(
            "SELECT stored_name FROM submissions WHERE student_id = $1 AND stored_name IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }

        tx.commit().await?;
        Ok(files.into_iter().map(|(name,)| name).collect())
    }

    pub async fn count(&self) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
