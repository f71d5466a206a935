//! Storefront authentication.
//!
//! Accounts are native: a username, an email and an Argon2id password hash in the `users` table.
//! Signing in issues an HS256 JWT which travels back and forth in an HTTP-only cookie; there is
//! no server-side session store.
//!
//! # Modules
//!
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT claims plus the `Set-Cookie` values for login and logout
//! - [`current_user`]: Extractors that turn the session cookie into a user for handlers
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use bookstore::api::models::users::CurrentUser;
//! use bookstore::auth::current_user::AdminUser;
//!
//! async fn my_cart(user: CurrentUser) -> String {
//!     format!("Cart for {}", user.username)
//! }
//!
//! async fn dashboard(AdminUser(admin): AdminUser) -> String {
//!     format!("Welcome back, {}", admin.username)
//! }
//! ```
//!
//! The bazar services have no accounts, so nothing here is mounted for those roles.

pub mod current_user;
pub mod password;
pub mod session;
