//! API request and response data models.
//!
//! These structs define the public JSON contract and are kept apart from
//! [`crate::db::models`]. Money is serialized as a decimal string (`"12.50"`) so no
//! precision is lost on the way to the browser.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod favorites;
pub mod orders;
pub mod users;
