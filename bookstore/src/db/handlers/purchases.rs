//! Database repository for the bazar order service's purchase rows.

use crate::db::{
    errors::Result,
    models::purchases::{OrderSummaryDBResponse, PurchaseCreateDBRequest, PurchaseDBResponse},
};
use crate::types::BookId;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct Purchase {
    pub id: i32,
    pub order_id: String,
    pub item_id: BookId,
    pub timestamp: NaiveDateTime,
    pub price: Decimal,
    pub title: String,
    pub author: String,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
    pub original_price: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub discount_applied: bool,
}

impl From<Purchase> for PurchaseDBResponse {
    fn from(p: Purchase) -> Self {
        Self {
            id: p.id,
            order_id: p.order_id,
            item_id: p.item_id,
            timestamp: p.timestamp,
            price: p.price,
            title: p.title,
            author: p.author,
            shipping_address: p.shipping_address,
            payment_method: p.payment_method,
            original_price: p.original_price,
            discount_amount: p.discount_amount,
            discount_applied: p.discount_applied,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct OrderSummary {
    pub order_id: String,
    pub order_date: NaiveDateTime,
    pub total_amount: Decimal,
    pub item_count: i64,
}

impl From<OrderSummary> for OrderSummaryDBResponse {
    fn from(s: OrderSummary) -> Self {
        Self {
            order_id: s.order_id,
            order_date: s.order_date,
            total_amount: s.total_amount,
            item_count: s.item_count,
        }
    }
}

pub struct Purchases<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Purchases<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id, item_id = request.item_id), err)]
    pub async fn create(&mut self, request: &PurchaseCreateDBRequest) -> Result<PurchaseDBResponse> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO orders (order_id, item_id, timestamp, price, title, author, shipping_address,
                                payment_method, original_price, discount_amount, discount_applied)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&request.order_id)
        .bind(request.item_id)
        .bind(request.timestamp)
        .bind(request.price)
        .bind(&request.title)
        .bind(&request.author)
        .bind(&request.shipping_address)
        .bind(&request.payment_method)
        .bind(request.original_price)
        .bind(request.discount_amount)
        .bind(request.discount_applied)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(purchase.into())
    }

    /// One summary per `order_id`, latest first
    #[instrument(skip(self), err)]
    pub async fn list_orders(&mut self) -> Result<Vec<OrderSummaryDBResponse>> {
        let orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT order_id,
                   MAX(timestamp) AS order_date,
                   SUM(price) AS total_amount,
                   COUNT(*) AS item_count
            FROM orders
            GROUP BY order_id
            ORDER BY MAX(timestamp) DESC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(orders.into_iter().map(Into::into).collect())
    }

    /// Every purchase row recorded under `order_id`
    #[instrument(skip(self), err)]
    pub async fn items(&mut self, order_id: &str) -> Result<Vec<PurchaseDBResponse>> {
        let items = sqlx::query_as::<_, Purchase>("SELECT * FROM orders WHERE order_id = $1 ORDER BY id")
            .bind(order_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(items.into_iter().map(Into::into).collect())
    }
}
