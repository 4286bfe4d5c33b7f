//! # Recipe API Server Library
//!
//! HTTP layer of the recipe service: account creation, token issuing and
//! owner-scoped CRUD for tags, ingredients and recipes.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and token auth layer
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON body extractor and deserialization helpers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
