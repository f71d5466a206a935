//! HTTP request handlers for the storefront API.
//!
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and authorization checks, through the [`crate::auth::current_user`]
//!   extractors
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`admin`]: dashboard, sales report, user promotion, sample data
//! - [`auth`]: signup, login, logout, current user
//! - [`cart`]: viewing and editing the cart
//! - [`catalog`]: home page, authors, books
//! - [`favorites`]: bookmarked books
//! - [`orders`]: checkout and order history
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`], which converts to the matching HTTP status and a
//! `{"message": ...}` JSON body.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod favorites;
pub mod orders;
