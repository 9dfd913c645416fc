//! Post model for Kairan.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Category used when the caller does not name one.
pub const DEFAULT_CATEGORY: &str = "event";

/// Validation errors for post input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Content is empty or whitespace only.
    #[error("本文を入力してください")]
    EmptyContent,

    /// Category is empty or whitespace only.
    #[error("カテゴリを入力してください")]
    EmptyCategory,

    /// Uploaded file exceeds the configured limit.
    #[error("ファイルサイズが大きすぎます（{limit}バイト以内）")]
    FileTooLarge { size: u64, limit: u64 },
}

/// Reference to a stored file. Either both fields are set or there is no attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Storage key of the file.
    pub filename: String,
    /// Lowercase file extension.
    pub filetype: String,
}

impl Attachment {
    /// Build an attachment from nullable columns.
    ///
    /// A half-populated pair is treated as no attachment.
    pub fn from_columns(filename: Option<String>, filetype: Option<String>) -> Option<Self> {
        match (filename, filetype) {
            (Some(filename), Some(filetype)) => Some(Self { filename, filetype }),
            _ => None,
        }
    }
}

/// A board announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Unique, monotonically assigned post ID.
    pub id: i64,
    /// Optional headline.
    pub title: Option<String>,
    /// Body text.
    pub content: String,
    /// Grouping label, matched exactly.
    pub category: String,
    /// Attached file, if one was uploaded.
    pub attachment: Option<Attachment>,
    /// Number of likes. Only ever incremented.
    pub like_count: i64,
    /// Creation time, the sort key.
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Check if the post has an attached file.
    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }
}

/// Data for creating a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: Option<String>,
    pub content: String,
    pub category: String,
}

impl NewPost {
    /// Create a new untitled post.
    pub fn new(content: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: None,
            content: content.into(),
            category: category.into(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Check the write-time invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.content, &self.category)
    }
}

/// Replacement values for an edit. Like count, attachment and creation
/// time are never touched by an edit.
#[derive(Debug, Clone)]
pub struct PostEdit {
    pub title: Option<String>,
    pub content: String,
    pub category: String,
}

impl PostEdit {
    /// Create an edit with the given content and category and no title.
    pub fn new(content: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: None,
            content: content.into(),
            category: category.into(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Check the write-time invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.content, &self.category)
    }
}

fn validate_fields(content: &str, category: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if category.trim().is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    Ok(())
}

/// Blank titles are stored as no title.
pub(crate) fn normalize_title(title: Option<&str>) -> Option<&str> {
    title.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_validate() {
        assert!(NewPost::new("meeting at 5", "event").validate().is_ok());
        assert_eq!(
            NewPost::new("", "event").validate(),
            Err(ValidationError::EmptyContent)
        );
        assert_eq!(
            NewPost::new("  \n", "event").validate(),
            Err(ValidationError::EmptyContent)
        );
        assert_eq!(
            NewPost::new("body", "").validate(),
            Err(ValidationError::EmptyCategory)
        );
    }

    #[test]
    fn test_content_checked_before_category() {
        assert_eq!(
            NewPost::new("", "").validate(),
            Err(ValidationError::EmptyContent)
        );
    }

    #[test]
    fn test_post_edit_validate() {
        assert!(PostEdit::new("updated", "notice").validate().is_ok());
        assert_eq!(
            PostEdit::new("updated", " ").validate(),
            Err(ValidationError::EmptyCategory)
        );
    }

    #[test]
    fn test_with_title() {
        let post = NewPost::new("body", "event").with_title("Heads up");
        assert_eq!(post.title.as_deref(), Some("Heads up"));
        let edit = PostEdit::new("body", "event").with_title("Fixed");
        assert_eq!(edit.title.as_deref(), Some("Fixed"));
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title(Some("Title")), Some("Title"));
        assert_eq!(normalize_title(Some("   ")), None);
        assert_eq!(normalize_title(Some("")), None);
        assert_eq!(normalize_title(None), None);
    }

    #[test]
    fn test_attachment_from_columns() {
        let full = Attachment::from_columns(Some("a.png".into()), Some("png".into()));
        assert_eq!(
            full,
            Some(Attachment {
                filename: "a.png".into(),
                filetype: "png".into()
            })
        );
        assert_eq!(Attachment::from_columns(Some("a.png".into()), None), None);
        assert_eq!(Attachment::from_columns(None, Some("png".into())), None);
        assert_eq!(Attachment::from_columns(None, None), None);
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::FileTooLarge { size: 20, limit: 10 }.to_string(),
            "ファイルサイズが大きすぎます（10バイト以内）"
        );
    }
}
