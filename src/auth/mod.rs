//! Authentication module for Kairan.
//!
//! This module provides the access guard and the session value passed into
//! board operations.

pub mod permission;
mod session;

pub use permission::{authorize, check_permission, AuthError, Operation};
pub use session::{Session, SessionCarrier, SessionManager, TokenCarrier};
