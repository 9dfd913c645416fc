//! Board service for Kairan.
//!
//! This module provides the operations behind every board request. Each call
//! resolves the caller's session against the access guard before touching the
//! post repository or the attachment store.

use tracing::{debug, info, warn};

use crate::auth::{check_permission, AuthError, Operation, Session, SessionCarrier};
use crate::db::{Database, UserRepository};
use crate::file::AttachmentStore;
use crate::{KairanError, Result};

use super::post::{NewPost, Post, PostEdit, DEFAULT_CATEGORY};
use super::post_repository::PostRepository;

/// A file delivered with a create request.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name as sent by the client.
    pub name: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// An upload without a name means the form's file field was left empty.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }
}

/// Service for board operations with permission checking.
pub struct BoardService<'a> {
    db: &'a Database,
    storage: &'a AttachmentStore,
    default_category: String,
}

impl<'a> BoardService<'a> {
    /// Create a new BoardService over the given database and attachment store.
    pub fn new(db: &'a Database, storage: &'a AttachmentStore) -> Self {
        Self {
            db,
            storage,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    /// Use a different category when a listing names none.
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    /// Category used when a listing names none.
    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    // ========== Session Operations ==========

    /// Resolve credentials and establish a session on the carrier.
    ///
    /// On failure the carrier is left untouched.
    pub async fn login(
        &self,
        carrier: &mut impl SessionCarrier,
        username: &str,
        credential: &str,
    ) -> Result<Session> {
        let repo = UserRepository::new(self.db.pool());
        let Some(user) = repo.verify(username, credential).await? else {
            warn!(username = %username, "Login failed");
            return Err(AuthError::InvalidCredentials.into());
        };

        let session = Session::from(&user);
        carrier.establish(session.clone());
        info!(username = %session.username, role = %session.role, "Login successful");
        Ok(session)
    }

    /// Clear whatever session the carrier holds.
    pub fn logout(&self, carrier: &mut impl SessionCarrier) {
        if let Some(session) = carrier.current_identity() {
            info!(username = %session.username, "Logout");
        }
        carrier.clear();
    }

    // ========== Read Operations ==========

    /// List posts in a category, newest first.
    ///
    /// `None` or an empty string selects the default category.
    pub async fn list_posts(
        &self,
        session: Option<&Session>,
        category: Option<&str>,
    ) -> Result<Vec<Post>> {
        check_permission(session, Operation::View)?;

        let category = category
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.default_category);
        PostRepository::new(self.db.pool())
            .list_by_category(category)
            .await
    }

    /// Get a single post.
    pub async fn get_post(&self, session: Option<&Session>, post_id: i64) -> Result<Post> {
        check_permission(session, Operation::View)?;

        PostRepository::new(self.db.pool())
            .get_by_id(post_id)
            .await?
            .ok_or(KairanError::NotFound { post_id })
    }

    /// Read the bytes of an attachment that belongs to a live post.
    pub async fn open_attachment(
        &self,
        session: Option<&Session>,
        filename: &str,
    ) -> Result<Vec<u8>> {
        check_permission(session, Operation::View)?;

        let repo = PostRepository::new(self.db.pool());
        if !repo.attachment_in_use(filename).await? {
            return Err(KairanError::AttachmentNotFound {
                filename: filename.to_string(),
            });
        }
        self.storage.load(filename)
    }

    // ========== Write Operations ==========

    /// Create a post, storing the upload first when one is supplied.
    ///
    /// If the insert fails after the file was stored, the file is released again.
    pub async fn create_post(
        &self,
        session: Option<&Session>,
        new_post: &NewPost,
        upload: Option<&Upload>,
    ) -> Result<Post> {
        let session = check_permission(session, Operation::CreatePost)?;
        new_post.validate()?;

        let attachment = match upload.filter(|u| !u.is_empty()) {
            Some(upload) => Some(self.storage.accept(&upload.name, &upload.bytes)?),
            None => None,
        };

        let repo = PostRepository::new(self.db.pool());
        match repo.create(new_post, attachment.as_ref()).await {
            Ok(post) => {
                info!(
                    post_id = post.id,
                    category = %post.category,
                    username = %session.username,
                    has_attachment = post.has_attachment(),
                    "Post created"
                );
                Ok(post)
            }
            Err(e) => {
                if let Err(release_err) = self.storage.release(attachment.as_ref()) {
                    warn!(error = %release_err, "Failed to release attachment of unsaved post");
                }
                Err(e)
            }
        }
    }

    /// Replace a post's title, content and category.
    pub async fn edit_post(
        &self,
        session: Option<&Session>,
        post_id: i64,
        edit: &PostEdit,
    ) -> Result<Post> {
        let session = check_permission(session, Operation::EditPost)?;

        let post = PostRepository::new(self.db.pool())
            .edit(post_id, edit)
            .await?;
        info!(post_id, username = %session.username, "Post edited");
        Ok(post)
    }

    /// Add one like to a post.
    pub async fn like_post(&self, session: Option<&Session>, post_id: i64) -> Result<Post> {
        let session = check_permission(session, Operation::LikePost)?;

        let post = PostRepository::new(self.db.pool())
            .increment_like(post_id)
            .await?;
        debug!(
            post_id,
            username = %session.username,
            like_count = post.like_count,
            "Post liked"
        );
        Ok(post)
    }

    /// Delete a post and release its attachment.
    ///
    /// A failure to release the file is logged and the post is deleted anyway.
    pub async fn delete_post(&self, session: Option<&Session>, post_id: i64) -> Result<()> {
        let session = check_permission(session, Operation::DeletePost)?;

        let repo = PostRepository::new(self.db.pool());
        let post = repo
            .get_by_id(post_id)
            .await?
            .ok_or(KairanError::NotFound { post_id })?;

        if let Err(e) = self.storage.release(post.attachment.as_ref()) {
            warn!(post_id, error = %e, "Failed to release attachment; deleting post anyway");
        }

        repo.delete(post_id).await?;
        info!(post_id, username = %session.username, "Post deleted");
        Ok(())
    }
}
