//! Board module for Kairan.
//!
//! This module provides the circulation board:
//! - Posts with an optional title and at most one attachment
//! - Category listings, newest first
//! - Likes counted atomically per post
//! - Role-based access control on every operation

mod post;
mod post_repository;
mod service;

pub use post::{Attachment, NewPost, Post, PostEdit, ValidationError, DEFAULT_CATEGORY};
pub use post_repository::PostRepository;
pub use service::{BoardService, Upload};
