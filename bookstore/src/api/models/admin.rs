//! API models for the admin pages.

use super::{catalog::BookResponse, orders::OrderResponse};
use crate::db::models::reports::{MonthlySalesDBResponse, TopBookDBResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_books: i64,
    pub total_authors: i64,
    pub total_users: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub low_stock_books: Vec<BookResponse>,
    pub all_books: Vec<BookResponse>,
    pub recent_orders: Vec<OrderResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySalesResponse {
    pub month: DateTime<Utc>,
    pub order_count: i64,
    pub revenue: Decimal,
}

impl From<MonthlySalesDBResponse> for MonthlySalesResponse {
    fn from(db: MonthlySalesDBResponse) -> Self {
        Self {
            month: db.month,
            order_count: db.order_count,
            revenue: db.revenue,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopBookResponse {
    pub title: String,
    pub total_sold: i64,
    pub total_revenue: Decimal,
}

impl From<TopBookDBResponse> for TopBookResponse {
    fn from(db: TopBookDBResponse) -> Self {
        Self {
            title: db.book_name,
            total_sold: db.total_sold,
            total_revenue: db.revenue,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReportResponse {
    pub monthly_sales: Vec<MonthlySalesResponse>,
    pub top_books: Vec<TopBookResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleDataResponse {
    pub message: String,
    pub authors: usize,
    pub books: usize,
}
