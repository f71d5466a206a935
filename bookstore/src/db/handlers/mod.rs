//! Repository implementations for database access.
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed operations over one table (plus the joins it needs for reads)
//! - Returns models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! Storefront:
//! - [`Users`]: accounts and the admin flag
//! - [`Authors`], [`Books`]: the catalog
//! - [`Carts`]: pending cart lines, including the locked read used by checkout
//! - [`Favorites`]: bookmarked books
//! - [`Orders`]: committed orders and their line items
//! - [`Reports`]: read-only aggregates for the admin pages
//!
//! Bazar:
//! - [`CatalogBooks`]: the catalog service's stock
//! - [`Purchases`]: the order service's purchase rows
//!
//! # Common Pattern
//!
//! ```ignore
//! use bookstore::db::handlers::{Books, Carts};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!
//!     let lines = Carts::new(&mut tx).lock_for_checkout(user_id).await?;
//!     for line in &lines {
//!         Books::new(&mut tx).decrement_stock(line.book_id, line.quantity).await?;
//!     }
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod authors;
pub mod books;
pub mod cart;
pub mod catalog_books;
pub mod favorites;
pub mod orders;
pub mod purchases;
pub mod reports;
pub mod repository;
pub mod users;

pub use authors::Authors;
pub use books::Books;
pub use cart::Carts;
pub use catalog_books::CatalogBooks;
pub use favorites::Favorites;
pub use orders::Orders;
pub use purchases::Purchases;
pub use reports::Reports;
pub use repository::Repository;
pub use users::Users;
