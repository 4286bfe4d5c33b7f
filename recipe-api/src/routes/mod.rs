/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `user`: Account creation, token issuing, caller profile
/// - `tags`: Owner-scoped tag CRUD
/// - `ingredients`: Owner-scoped ingredient CRUD
/// - `recipes`: Owner-scoped recipe CRUD with tag/ingredient links

pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod user;
