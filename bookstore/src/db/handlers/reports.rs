//! Read-only aggregates for the admin dashboard and sales report.

use crate::db::{
    errors::Result,
    models::reports::{MonthlySalesDBResponse, StoreCountsDBResponse, TopBookDBResponse},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

#[derive(Debug, FromRow)]
struct StoreCounts {
    total_books: i64,
    total_authors: i64,
    total_users: i64,
    total_orders: i64,
    total_revenue: Decimal,
}

#[derive(Debug, FromRow)]
struct MonthlySales {
    month: DateTime<Utc>,
    order_count: i64,
    revenue: Decimal,
}

#[derive(Debug, FromRow)]
struct TopBook {
    book_name: String,
    total_sold: i64,
    revenue: Decimal,
}

pub struct Reports<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Reports<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn store_counts(&mut self) -> Result<StoreCountsDBResponse> {
        let counts = sqlx::query_as::<_, StoreCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM books) AS total_books,
                (SELECT COUNT(*) FROM authors) AS total_authors,
                (SELECT COUNT(*) FROM users WHERE is_admin = FALSE) AS total_users,
                (SELECT COUNT(*) FROM orders) AS total_orders,
                (SELECT COALESCE(SUM(total_amount), 0) FROM orders) AS total_revenue
            "#,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(StoreCountsDBResponse {
            total_books: counts.total_books,
            total_authors: counts.total_authors,
            total_users: counts.total_users,
            total_orders: counts.total_orders,
            total_revenue: counts.total_revenue,
        })
    }

    /// Revenue per calendar month, newest month first
    #[instrument(skip(self), err)]
    pub async fn monthly_sales(&mut self) -> Result<Vec<MonthlySalesDBResponse>> {
        let rows = sqlx::query_as::<_, MonthlySales>(
            r#"
            SELECT DATE_TRUNC('month', order_date) AS month,
                   COUNT(*) AS order_count,
                   SUM(total_amount) AS revenue
            FROM orders
            GROUP BY month
            ORDER BY month DESC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| MonthlySalesDBResponse {
                month: r.month,
                order_count: r.order_count,
                revenue: r.revenue,
            })
            .collect())
    }

    /// Best sellers by copies sold. Grouped on the name recorded at checkout so deleted
    /// books still count.
    #[instrument(skip(self), err)]
    pub async fn top_books(&mut self, limit: i64) -> Result<Vec<TopBookDBResponse>> {
        let rows = sqlx::query_as::<_, TopBook>(
            r#"
            SELECT book_name,
                   SUM(quantity)::BIGINT AS total_sold,
                   SUM(quantity * price) AS revenue
            FROM order_items
            GROUP BY book_name
            ORDER BY total_sold DESC, book_name
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TopBookDBResponse {
                book_name: r.book_name,
                total_sold: r.total_sold,
                revenue: r.revenue,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Orders;
    use crate::db::models::orders::{OrderCreateDBRequest, OrderItemDBRequest};
    use crate::test_utils::{create_test_author, create_test_book, create_test_user};
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_empty_store_has_zero_revenue(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let counts = Reports::new(&mut conn).store_counts().await.unwrap();

        assert_eq!(counts.total_books, 0);
        assert_eq!(counts.total_orders, 0);
        assert_eq!(counts.total_revenue, Decimal::ZERO);
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_counts_and_sales(pool: PgPool) {
        let buyer = create_test_user(&pool, false).await;
        create_test_user(&pool, true).await;
        let author = create_test_author(&pool, "Author").await;
        let popular = create_test_book(&pool, author.id, "Popular", 10, Decimal::new(1000, 2)).await;
        let niche = create_test_book(&pool, author.id, "Niche", 10, Decimal::new(500, 2)).await;

        let mut conn = pool.acquire().await.unwrap();
        for (book, quantity) in [(&popular, 3), (&niche, 1), (&popular, 1)] {
            Orders::new(&mut conn)
                .create(&OrderCreateDBRequest {
                    user_id: buyer.id,
                    total_amount: book.price * Decimal::from(quantity),
                    items: vec![OrderItemDBRequest {
                        book_id: book.id,
                        quantity,
                        price: book.price,
                        book_name: book.name.clone(),
                    }],
                })
                .await
                .unwrap();
        }

        let mut reports = Reports::new(&mut conn);
        let counts = reports.store_counts().await.unwrap();
        assert_eq!(counts.total_books, 2);
        assert_eq!(counts.total_authors, 1);
        assert_eq!(counts.total_users, 1);
        assert_eq!(counts.total_orders, 3);
        assert_eq!(counts.total_revenue, Decimal::new(4500, 2));

        let months = reports.monthly_sales().await.unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].order_count, 3);
        assert_eq!(months[0].revenue, Decimal::new(4500, 2));

        let top = reports.top_books(10).await.unwrap();
        assert_eq!(top[0].book_name, "Popular");
        assert_eq!(top[0].total_sold, 4);
        assert_eq!(top[0].revenue, Decimal::new(4000, 2));
        assert_eq!(top[1].book_name, "Niche");
    }
}
