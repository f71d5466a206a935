//! Records passed into and returned from the repositories.
//!
//! Database models are kept apart from the API models in [`crate::api::models`] so that
//! storage columns (such as `password_hash`) never reach a response by accident. Each
//! module has `*DBRequest` types for writes and `*DBResponse` types for reads.
//!
//! ## Storefront
//!
//! - [`users`], [`authors`], [`books`]
//! - [`cart`], [`favorites`], [`orders`]
//! - [`reports`]: aggregates for the admin dashboard and sales report
//!
//! ## Bazar
//!
//! - [`catalog_books`]: the catalog service's stock rows
//! - [`purchases`]: the order service's purchase rows

pub mod authors;
pub mod books;
pub mod cart;
pub mod catalog_books;
pub mod favorites;
pub mod orders;
pub mod purchases;
pub mod reports;
pub mod users;
