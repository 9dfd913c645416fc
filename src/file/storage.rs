//! Attachment storage for Kairan.
//!
//! Uploaded bytes are kept on disk under a storage key derived from the
//! uploaded name:
//! - the name is reduced to its last path component and to safe characters
//! - a UUID prefix keeps equal names from colliding
//! - files are sharded by the first 2 characters of the key
//!
//! ```text
//! {base_path}/
//! ├── 3f/
//! │   └── 3f2a9c0d..._flyer.png
//! └── a7/
//!     └── a7c1e4b2..._minutes.pdf
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::board::{Attachment, ValidationError};
use crate::config::FilesConfig;
use crate::{KairanError, Result};

/// Extensions accepted when no allow-list is configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "pdf"];

/// Default maximum upload size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Owner of the physical files behind post attachments.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    /// Base directory for file storage.
    base_path: PathBuf,
    /// Lowercase allowed extensions.
    allowed_extensions: Vec<String>,
    /// Maximum accepted size in bytes.
    max_size: u64,
}

impl AttachmentStore {
    /// Create a store with the default allow-list and size limit.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_size: DEFAULT_MAX_FILE_SIZE,
        })
    }

    /// Create a store from the `[files]` configuration section.
    pub fn from_config(config: &FilesConfig) -> Result<Self> {
        let max_size = config.max_upload_size_bytes()?;
        Ok(Self::new(&config.storage_path)?
            .with_allowed_extensions(config.allowed_extensions.iter().map(String::as_str))
            .with_max_size(max_size))
    }

    /// Replace the extension allow-list.
    pub fn with_allowed_extensions<'e>(
        mut self,
        extensions: impl IntoIterator<Item = &'e str>,
    ) -> Self {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Set the maximum accepted size in bytes.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Validate and store an upload.
    ///
    /// Fails with `UnsupportedType` unless the extension (case-insensitive)
    /// is on the allow-list, and with `FileTooLarge` above the size limit.
    pub fn accept(&self, raw_name: &str, bytes: &[u8]) -> Result<Attachment> {
        let name = sanitize_filename(raw_name);
        let filetype = extension_of(&name).map(str::to_lowercase).unwrap_or_default();

        if !self.allowed_extensions.iter().any(|e| *e == filetype) {
            return Err(KairanError::UnsupportedType {
                extension: filetype,
            });
        }

        let size = bytes.len() as u64;
        if size > self.max_size {
            return Err(ValidationError::FileTooLarge {
                size,
                limit: self.max_size,
            }
            .into());
        }

        let filename = format!("{}_{}", Uuid::new_v4().simple(), name);
        let file_path = self.shard_path(&filename);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, bytes)?;

        debug!(filename = %filename, size, "Stored attachment");
        Ok(Attachment { filename, filetype })
    }

    /// Delete the bytes behind an attachment.
    ///
    /// A missing attachment or an already-deleted file is not an error.
    pub fn release(&self, attachment: Option<&Attachment>) -> Result<()> {
        let Some(attachment) = attachment else {
            return Ok(());
        };
        let Some(file_path) = self.file_path(&attachment.filename) else {
            return Ok(());
        };

        match fs::remove_file(&file_path) {
            Ok(()) => {
                debug!(filename = %attachment.filename, "Released attachment");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load stored bytes by key.
    pub fn load(&self, filename: &str) -> Result<Vec<u8>> {
        let not_found = || KairanError::AttachmentNotFound {
            filename: filename.to_string(),
        };
        let file_path = self.file_path(filename).ok_or_else(not_found)?;

        match fs::read(&file_path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a file exists in storage.
    pub fn exists(&self, filename: &str) -> bool {
        self.file_path(filename).is_some_and(|p| p.is_file())
    }

    /// Full path for a storage key, or `None` if the key could escape the
    /// base directory.
    pub fn file_path(&self, filename: &str) -> Option<PathBuf> {
        is_safe_key(filename).then(|| self.shard_path(filename))
    }

    fn shard_path(&self, filename: &str) -> PathBuf {
        let shard = filename.get(..2).unwrap_or(filename);
        self.base_path.join(shard).join(filename)
    }
}

/// Reduce an uploaded name to a safe file name.
///
/// Directory components (either separator) are dropped, characters other
/// than alphanumerics, `.`, `-` and `_` become `_`, and leading dots are
/// stripped.
pub fn sanitize_filename(raw_name: &str) -> String {
    let base = raw_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

fn extension_of(name: &str) -> Option<&str> {
    Path::new(name).extension().and_then(|s| s.to_str())
}

fn is_safe_key(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains(['/', '\\', '\0'])
}
