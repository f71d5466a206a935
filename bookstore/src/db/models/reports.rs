//! Aggregates for the admin dashboard and sales report.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct StoreCountsDBResponse {
    pub total_books: i64,
    pub total_authors: i64,
    /// Non-admin accounts only
    pub total_users: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone)]
pub struct MonthlySalesDBResponse {
    pub month: DateTime<Utc>,
    pub order_count: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone)]
pub struct TopBookDBResponse {
    pub book_name: String,
    pub total_sold: i64,
    pub revenue: Decimal,
}
