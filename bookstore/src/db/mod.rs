//! Database layer for data persistence and access.
//!
//! All access goes through SQLx against PostgreSQL. Two independent schemas live in
//! `migrations/`:
//!
//! - `migrations/storefront`: users, authors, books, cart_items, favorites, orders, order_items
//! - `migrations/bazar`: the catalog service's `books` and the order service's `orders`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (api::handlers, bazar::{catalog, orders})
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries per table)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - request/response records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations, one per table
//! - [`models`]: Records passed into and returned from repositories
//! - [`errors`]: Database-specific error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use bookstore::db::handlers::{Books, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut books = Books::new(&mut tx);
//!
//!     if let Some(book) = books.get_by_id(1).await? {
//!         println!("{} by {}", book.name, book.author_name);
//!     }
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
