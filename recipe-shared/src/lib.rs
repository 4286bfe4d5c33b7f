//! # Recipe Shared Library
//!
//! This crate contains the data layer and authentication primitives used by
//! the recipe API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pooling and migrations
//! - `models`: Users, auth tokens, tags, ingredients and recipes
//! - `auth`: Password hashing, opaque token handling and request auth context

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the recipe shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
