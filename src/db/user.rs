//! User model for Kairan.
//!
//! This module defines the User struct and Role enum.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// User role for permission management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Board administrator.
    Admin,
    /// Regular signed-in user.
    #[default]
    User,
}

impl Role {
    /// Convert role to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Check if this is the administrator role.
    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// A registered account.
///
/// The credential never leaves the identity store: it is redacted from
/// `Debug` output and the type is not serializable.
#[derive(Clone)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login username (unique, immutable).
    pub username: String,
    /// Login credential.
    pub(crate) password: String,
    /// User role for permissions.
    pub role: Role,
    /// Account creation timestamp.
    pub created_at: String,
}

impl User {
    /// Check whether `credential` matches exactly.
    pub(crate) fn credential_matches(&self, credential: &str) -> bool {
        self.password == credential
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Data for creating a new user.
#[derive(Clone)]
pub struct NewUser {
    /// Login username.
    pub username: String,
    /// Login credential.
    pub password: String,
    /// User role (defaults to User).
    pub role: Role,
}

impl NewUser {
    /// Create a new regular user.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: Role::User,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::User.as_str(), "user");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert!("sysop".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_default_is_least_privileged() {
        assert_eq!(Role::default(), Role::User);
        assert!(!Role::default().is_admin());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_new_user_builder() {
        let user = NewUser::new("alice", "pw").with_role(Role::Admin);
        assert_eq!(user.username, "alice");
        assert_eq!(user.password, "pw");
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_debug_redacts_credential() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            password: "hunter2".to_string(),
            role: Role::User,
            created_at: "2024-01-01 00:00:00.000000".to_string(),
        };
        let printed = format!("{user:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));

        let printed = format!("{:?}", NewUser::new("bob", "s3cret"));
        assert!(!printed.contains("s3cret"));
    }

    #[test]
    fn test_credential_matches_is_case_sensitive() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            password: "Secret".to_string(),
            role: Role::User,
            created_at: String::new(),
        };
        assert!(user.credential_matches("Secret"));
        assert!(!user.credential_matches("secret"));
        assert!(!user.credential_matches("Secret "));
    }
}
