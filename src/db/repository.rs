//! User repository for Kairan (the identity store).

use tracing::{debug, info};

use super::user::{NewUser, Role, User};
use super::{now_timestamp, DbPool};
use crate::config::SeedConfig;
use crate::Result;

/// Repository for user records.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// Fails with a storage error if the username is already taken.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (username, password, role, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, username, password, role, created_at",
        )
        .bind(&new_user.username)
        .bind(&new_user.password)
        .bind(new_user.role.as_str())
        .bind(now_timestamp())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into_user())
    }

    /// Get a user by exact (case-sensitive) username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, password, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    /// Check if a username is already taken.
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Resolve a username/credential pair.
    ///
    /// Returns the user only when both fields match exactly. Nothing about
    /// which field was wrong is reported.
    pub async fn verify(&self, username: &str, credential: &str) -> Result<Option<User>> {
        let user = self.get_by_username(username).await?;
        Ok(user.filter(|u| u.credential_matches(credential)))
    }

    /// Create the seed accounts, skipping any username that already exists.
    ///
    /// Returns the number of accounts created.
    pub async fn seed_defaults(&self, seed: &SeedConfig) -> Result<usize> {
        let accounts = [
            NewUser::new(&seed.admin_username, &seed.admin_password).with_role(Role::Admin),
            NewUser::new(&seed.user_username, &seed.user_password),
        ];

        let mut created = 0;
        for account in &accounts {
            if self.username_exists(&account.username).await? {
                debug!(username = %account.username, "Seed account already present");
                continue;
            }
            self.create(account).await?;
            info!(username = %account.username, role = %account.role, "Seed account created");
            created += 1;
        }
        Ok(created)
    }
}

/// Internal struct for mapping database rows to User.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    role: String,
    created_at: String,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password: self.password,
            // Unknown roles get the least privilege.
            role: self.role.parse().unwrap_or(Role::User),
            created_at: self.created_at,
        }
    }
}
