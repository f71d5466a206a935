//! Database repository for storefront orders.

use crate::db::{
    errors::Result,
    models::orders::{OrderCreateDBRequest, OrderDBResponse, OrderItemDBResponse},
};
use crate::types::{BookId, OrderId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

const SELECT_ORDERS: &str = r#"
    SELECT o.order_id, o.user_id, u.username, o.total_amount, o.order_date, o.status
    FROM orders o
    LEFT JOIN users u ON u.user_id = o.user_id
"#;

#[derive(Debug, Clone, FromRow)]
struct Order {
    pub order_id: OrderId,
    pub user_id: Option<UserId>,
    pub username: Option<String>,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub status: String,
}

impl From<Order> for OrderDBResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.order_id,
            user_id: order.user_id,
            username: order.username,
            total_amount: order.total_amount,
            order_date: order.order_date,
            status: order.status,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct OrderItem {
    pub order_item_id: i32,
    pub order_id: OrderId,
    pub book_id: Option<BookId>,
    pub quantity: i32,
    pub price: Decimal,
    pub book_name: String,
    pub cover_url: Option<String>,
}

impl From<OrderItem> for OrderItemDBResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.order_item_id,
            order_id: item.order_id,
            book_id: item.book_id,
            quantity: item.quantity,
            price: item.price,
            book_name: item.book_name,
            cover_url: item.cover_url,
        }
    }
}

pub struct Orders<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Orders<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert an order and its line items.
    ///
    /// Run this on a transaction: stock is not touched here, and the caller decrements it
    /// alongside.
    #[instrument(skip(self, request), fields(user_id = request.user_id, items = request.items.len()), err)]
    pub async fn create(&mut self, request: &OrderCreateDBRequest) -> Result<OrderDBResponse> {
        let order_id: OrderId = sqlx::query_scalar("INSERT INTO orders (user_id, total_amount) VALUES ($1, $2) RETURNING order_id")
            .bind(request.user_id)
            .bind(request.total_amount)
            .fetch_one(&mut *self.db)
            .await?;

        for item in &request.items {
            sqlx::query("INSERT INTO order_items (order_id, book_id, quantity, price, book_name) VALUES ($1, $2, $3, $4, $5)")
                .bind(order_id)
                .bind(item.book_id)
                .bind(item.quantity)
                .bind(item.price)
                .bind(&item.book_name)
                .execute(&mut *self.db)
                .await?;
        }

        let order = sqlx::query_as::<_, Order>(&format!("{SELECT_ORDERS} WHERE o.order_id = $1"))
            .bind(order_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(order.into())
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: OrderId) -> Result<Option<OrderDBResponse>> {
        let order = sqlx::query_as::<_, Order>(&format!("{SELECT_ORDERS} WHERE o.order_id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(order.map(Into::into))
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<OrderDBResponse>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "{SELECT_ORDERS} WHERE o.user_id = $1 ORDER BY o.order_date DESC, o.order_id DESC"
        ))
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(orders.into_iter().map(Into::into).collect())
    }

    /// Newest orders across all users
    #[instrument(skip(self), err)]
    pub async fn recent(&mut self, limit: i64) -> Result<Vec<OrderDBResponse>> {
        let orders = sqlx::query_as::<_, Order>(&format!("{SELECT_ORDERS} ORDER BY o.order_date DESC, o.order_id DESC LIMIT $1"))
            .bind(limit)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(orders.into_iter().map(Into::into).collect())
    }

    /// Line items with the current cover, if the book still exists
    #[instrument(skip(self), err)]
    pub async fn items(&mut self, order_id: OrderId) -> Result<Vec<OrderItemDBResponse>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT oi.order_item_id, oi.order_id, oi.book_id, oi.quantity, oi.price, oi.book_name, b.cover_url
            FROM order_items oi
            LEFT JOIN books b ON b.book_id = oi.book_id
            WHERE oi.order_id = $1
            ORDER BY oi.order_item_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::orders::OrderItemDBRequest;
    use crate::test_utils::{create_test_author, create_test_book, create_test_user};
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_create_order_with_items(pool: PgPool) {
        let user = create_test_user(&pool, false).await;
        let author = create_test_author(&pool, "Author").await;
        let book = create_test_book(&pool, author.id, "Ordered", 5, Decimal::new(1250, 2)).await;

        let mut tx = pool.begin().await.unwrap();
        let order = Orders::new(&mut tx)
            .create(&OrderCreateDBRequest {
                user_id: user.id,
                total_amount: Decimal::new(2500, 2),
                items: vec![OrderItemDBRequest {
                    book_id: book.id,
                    quantity: 2,
                    price: book.price,
                    book_name: book.name.clone(),
                }],
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(order.status, "completed");
        assert_eq!(order.username.as_deref(), Some(user.username.as_str()));

        let mut conn = pool.acquire().await.unwrap();
        let mut orders = Orders::new(&mut conn);
        let items = orders.items(order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].book_name, "Ordered");

        assert_eq!(orders.list_for_user(user.id).await.unwrap().len(), 1);
        assert_eq!(orders.recent(5).await.unwrap()[0].id, order.id);
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_items_survive_book_deletion(pool: PgPool) {
        let user = create_test_user(&pool, false).await;
        let author = create_test_author(&pool, "Author").await;
        let book = create_test_book(&pool, author.id, "Retired", 5, Decimal::ONE).await;

        let mut conn = pool.acquire().await.unwrap();
        let order = Orders::new(&mut conn)
            .create(&OrderCreateDBRequest {
                user_id: user.id,
                total_amount: Decimal::ONE,
                items: vec![OrderItemDBRequest {
                    book_id: book.id,
                    quantity: 1,
                    price: Decimal::ONE,
                    book_name: "Retired".to_string(),
                }],
            })
            .await
            .unwrap();

        sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book.id)
            .execute(&mut *conn)
            .await
            .unwrap();

        let items = Orders::new(&mut conn).items(order.id).await.unwrap();
        assert_eq!(items[0].book_id, None);
        assert_eq!(items[0].book_name, "Retired");
        assert_eq!(items[0].cover_url, None);
    }
}
