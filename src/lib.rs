//! Kairan - circulation board for small organizations
//!
//! Members sign in, read notices by category, like them and download their
//! attachments. Administrators publish, edit and delete notices.

pub mod auth;
pub mod board;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;

pub use auth::{
    authorize, check_permission, AuthError, Operation, Session, SessionCarrier, SessionManager,
    TokenCarrier,
};
pub use board::{
    Attachment, BoardService, NewPost, Post, PostEdit, PostRepository, Upload, ValidationError,
};
pub use config::Config;
pub use db::{Database, NewUser, Role, User, UserRepository};
pub use error::{KairanError, Result};
pub use file::AttachmentStore;
