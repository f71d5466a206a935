//! Common type definitions.
//!
//! Storefront rows are keyed by `SERIAL` integer columns, so the ID aliases here are all `i32`.
//! They exist so that function signatures say which table an ID belongs to:
//!
//! - [`UserId`]: `users.user_id`
//! - [`AuthorId`]: `authors.author_id`
//! - [`BookId`]: `books.book_id` (storefront) or `books.id` (bazar catalog)
//! - [`CartItemId`]: `cart_items.cart_id`
//! - [`FavoriteId`]: `favorites.favorite_id`
//! - [`OrderId`]: `orders.order_id`

use serde::{Deserialize, Serialize};
use std::fmt;

pub type UserId = i32;
pub type AuthorId = i32;
pub type BookId = i32;
pub type CartItemId = i32;
pub type FavoriteId = i32;
pub type OrderId = i32;

/// Actions that can be refused to a non-admin caller. Used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}
