//! File attachment module for Kairan.
//!
//! This module stores the bytes behind post attachments, addressed by a
//! sanitized storage key.

mod storage;

pub use storage::{
    sanitize_filename, AttachmentStore, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_FILE_SIZE,
};
