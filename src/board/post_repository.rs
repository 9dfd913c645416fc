//! Post repository for Kairan.
//!
//! The repository is the only code that mutates post rows. Each mutation is a
//! single statement, so concurrent likes on one post never lose updates and a
//! like racing a delete either lands before the row disappears or reports
//! `NotFound`.

use super::post::{normalize_title, Attachment, NewPost, Post, PostEdit};
use crate::db::{now_timestamp, parse_timestamp, DbPool};
use crate::{KairanError, Result};

/// Repository for post CRUD operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new PostRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new post with zero likes, stamped with the current time.
    pub async fn create(
        &self,
        new_post: &NewPost,
        attachment: Option<&Attachment>,
    ) -> Result<Post> {
        self.insert(new_post, attachment, &now_timestamp()).await
    }

    async fn insert(
        &self,
        new_post: &NewPost,
        attachment: Option<&Attachment>,
        created_at: &str,
    ) -> Result<Post> {
        new_post.validate()?;

        let row: PostRow = sqlx::query_as(
            "INSERT INTO posts
                 (title, content, category, filename, filetype, like_count, created_at)
             VALUES ($1, $2, $3, $4, $5, 0, $6)
             RETURNING id, title, content, category, filename, filetype, like_count, created_at",
        )
        .bind(normalize_title(new_post.title.as_deref()))
        .bind(&new_post.content)
        .bind(&new_post.category)
        .bind(attachment.map(|a| a.filename.as_str()))
        .bind(attachment.map(|a| a.filetype.as_str()))
        .bind(created_at)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into_post())
    }

    /// Get a post by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row: Option<PostRow> = sqlx::query_as(
            "SELECT id, title, content, category, filename, filetype, like_count, created_at
             FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(PostRow::into_post))
    }

    /// List posts in a category, newest first.
    ///
    /// The category is matched exactly. Posts created in the same instant are
    /// ordered by ID, newest first.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Post>> {
        let rows: Vec<PostRow> = sqlx::query_as(
            "SELECT id, title, content, category, filename, filetype, like_count, created_at
             FROM posts WHERE category = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }

    /// Overwrite title, content and category.
    pub async fn edit(&self, id: i64, edit: &PostEdit) -> Result<Post> {
        edit.validate()?;

        let row: Option<PostRow> = sqlx::query_as(
            "UPDATE posts SET title = $1, content = $2, category = $3
             WHERE id = $4
             RETURNING id, title, content, category, filename, filetype, like_count, created_at",
        )
        .bind(normalize_title(edit.title.as_deref()))
        .bind(&edit.content)
        .bind(&edit.category)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(PostRow::into_post)
            .ok_or(KairanError::NotFound { post_id: id })
    }

    /// Add exactly one like.
    pub async fn increment_like(&self, id: i64) -> Result<Post> {
        let row: Option<PostRow> = sqlx::query_as(
            "UPDATE posts SET like_count = like_count + 1
             WHERE id = $1
             RETURNING id, title, content, category, filename, filetype, like_count, created_at",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(PostRow::into_post)
            .ok_or(KairanError::NotFound { post_id: id })
    }

    /// Remove a post permanently and return the removed record.
    ///
    /// Releasing the attachment is the caller's responsibility.
    pub async fn delete(&self, id: i64) -> Result<Post> {
        let row: Option<PostRow> = sqlx::query_as(
            "DELETE FROM posts WHERE id = $1
             RETURNING id, title, content, category, filename, filetype, like_count, created_at",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(PostRow::into_post)
            .ok_or(KairanError::NotFound { post_id: id })
    }

    /// Count all posts.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Check whether any post still references the stored file.
    pub async fn attachment_in_use(&self, filename: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE filename = $1)")
                .bind(filename)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }
}

/// Internal struct for mapping database rows to Post.
#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: Option<String>,
    content: String,
    category: String,
    filename: Option<String>,
    filetype: Option<String>,
    like_count: i64,
    created_at: String,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            id: self.id,
            title: self.title,
            content: self.content,
            category: self.category,
            attachment: Attachment::from_columns(self.filename, self.filetype),
            like_count: self.like_count,
            created_at: parse_timestamp(&self.created_at).unwrap_or_default(),
        }
    }
}
