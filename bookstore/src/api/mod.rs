//! Storefront JSON API.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): signup, login, logout, current user
//! - **Catalog** (`/api/v1/home`, `/api/v1/authors`, `/api/v1/books`): browsing for everyone,
//!   writes for admins
//! - **Cart** (`/api/v1/cart`), **Checkout** (`/api/v1/checkout`), **Orders** (`/api/v1/orders`)
//! - **Favorites** (`/api/v1/favorites`)
//! - **Admin** (`/api/v1/admin/*`): dashboard, sales report, user management, sample data
//!
//! The bazar services speak their own wire format and live in [`crate::bazar`].

pub mod handlers;
pub mod models;
