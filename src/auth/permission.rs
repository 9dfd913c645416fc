//! Access guard for Kairan.
//!
//! The policy is a fixed table over (role, operation). Everyone signed in may
//! read and like; only administrators may create, edit or delete posts.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::Session;
use crate::db::Role;

/// Operations subject to the access guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Browse posts and download attachments.
    View,
    /// Create a post.
    CreatePost,
    /// Edit a post's title, content or category.
    EditPost,
    /// Delete a post and its attachment.
    DeletePost,
    /// Like a post.
    LikePost,
}

impl Operation {
    /// All operations, in table order.
    pub const ALL: [Operation; 5] = [
        Operation::View,
        Operation::LikePost,
        Operation::CreatePost,
        Operation::EditPost,
        Operation::DeletePost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::View => "view",
            Operation::CreatePost => "create_post",
            Operation::EditPost => "edit_post",
            Operation::DeletePost => "delete_post",
            Operation::LikePost => "like_post",
        }
    }

    /// Get display name for the operation.
    pub fn display_name(&self) -> &'static str {
        match self {
            Operation::View => "閲覧",
            Operation::CreatePost => "投稿",
            Operation::EditPost => "編集",
            Operation::DeletePost => "削除",
            Operation::LikePost => "いいね",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication and authorization errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No live session. Transports answer this with a redirect to login.
    #[error("ログインが必要です")]
    Unauthenticated,

    /// Username/credential pair did not resolve.
    #[error("ユーザー名かパスワードが違います")]
    InvalidCredentials,

    /// The caller's role may not perform the operation.
    #[error("{}は管理者のみ可能です", .0.display_name())]
    Forbidden(Operation),
}

/// Decide whether `role` may perform `operation`.
pub fn authorize(role: Role, operation: Operation) -> bool {
    match operation {
        Operation::View | Operation::LikePost => true,
        Operation::CreatePost | Operation::EditPost | Operation::DeletePost => role.is_admin(),
    }
}

/// Check a caller against the access guard.
///
/// Returns the session back on success so callers can keep using it.
///
/// # Examples
///
/// ```
/// use kairan::auth::{check_permission, AuthError, Operation, Session};
/// use kairan::db::Role;
///
/// assert_eq!(
///     check_permission(None, Operation::View).unwrap_err(),
///     AuthError::Unauthenticated
/// );
///
/// let user = Session::new("user1", Role::User);
/// assert!(check_permission(Some(&user), Operation::LikePost).is_ok());
/// assert_eq!(
///     check_permission(Some(&user), Operation::CreatePost).unwrap_err(),
///     AuthError::Forbidden(Operation::CreatePost)
/// );
/// ```
pub fn check_permission(
    session: Option<&Session>,
    operation: Operation,
) -> Result<&Session, AuthError> {
    let session = session.ok_or(AuthError::Unauthenticated)?;
    if !authorize(session.role, operation) {
        return Err(AuthError::Forbidden(operation));
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        let expected = [
            (Operation::View, true, true),
            (Operation::LikePost, true, true),
            (Operation::CreatePost, true, false),
            (Operation::EditPost, true, false),
            (Operation::DeletePost, true, false),
        ];
        for (operation, admin, user) in expected {
            assert_eq!(authorize(Role::Admin, operation), admin, "admin {operation}");
            assert_eq!(authorize(Role::User, operation), user, "user {operation}");
        }
    }

    #[test]
    fn test_unauthenticated_denied_everything() {
        for operation in Operation::ALL {
            assert_eq!(
                check_permission(None, operation).unwrap_err(),
                AuthError::Unauthenticated
            );
        }
    }

    #[test]
    fn test_admin_allowed_everything() {
        let admin = Session::new("admin", Role::Admin);
        for operation in Operation::ALL {
            let session = check_permission(Some(&admin), operation).unwrap();
            assert_eq!(session.username, "admin");
        }
    }

    #[test]
    fn test_forbidden_names_the_operation() {
        let user = Session::new("user1", Role::User);
        let err = check_permission(Some(&user), Operation::DeletePost).unwrap_err();
        assert_eq!(err, AuthError::Forbidden(Operation::DeletePost));
        assert_eq!(err.to_string(), "削除は管理者のみ可能です");
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        let message = AuthError::InvalidCredentials.to_string();
        assert_eq!(message, "ユーザー名かパスワードが違います");
    }
}
