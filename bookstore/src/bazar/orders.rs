//! Order service: records purchases and keeps the catalog's stock in step.
//!
//! A purchase reads the book from the catalog service, writes the purchase row inside a
//! transaction, then asks the catalog to take one copy off the shelf. The row is only committed
//! once the catalog has accepted the new stock count.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    bazar::{
        Envelope, ServiceError, ServiceResult,
        client::{BookLookup, CatalogClient},
        database_health,
        discount::{DiscountError, DiscountInfo, apply_category_discount},
        models::{OrderDetail, OrderDetailEnvelope, OrderItem, OrderSummary, OrdersEnvelope, TIMESTAMP_FORMAT},
    },
    db::{handlers::Purchases, models::purchases::PurchaseCreateDBRequest},
    types::BookId,
};

#[derive(Clone, bon::Builder)]
pub struct OrderState {
    pub db: PgPool,
    pub catalog: Arc<dyn CatalogClient>,
}

pub fn router() -> Router<OrderState> {
    Router::new()
        .route("/purchase/{item_id}", post(purchase))
        .route("/orders", get(list_orders))
        .route("/orders/{order_id}", get(order_details))
        .route("/health", get(health))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseRequest {
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
    pub discount_info: Option<DiscountInfo>,
    /// Sent by the browser client for its own bookkeeping; not used when pricing.
    pub cart_items: Vec<Value>,
}

/// Extra fields on a purchase response when a discount was granted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountDetails {
    pub discount_applied: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub original_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub final_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percentage: Decimal,
    pub discount_type: String,
    pub category: String,
    pub category_count: i64,
    pub discount_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub success: bool,
    pub message: String,
    pub order_id: String,
    /// Title of the purchased book
    pub book: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub discount: Option<DiscountDetails>,
}

/// `ORD-` followed by eight upper-case hex digits
fn new_order_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("ORD-{}", id[..8].to_uppercase())
}

fn processing_error(err: impl std::fmt::Display) -> ServiceError {
    ServiceError::internal(Envelope::FailedMessage, format!("Error processing purchase: {err}"))
}

#[tracing::instrument(skip_all, fields(item_id = %item_id))]
pub async fn purchase(
    State(state): State<OrderState>,
    Path(item_id): Path<String>,
    request: Result<Option<Json<PurchaseRequest>>, JsonRejection>,
) -> ServiceResult<Json<PurchaseResponse>> {
    let request = request
        .map_err(|e| ServiceError::rejected(Envelope::FailedMessage, e))?
        .map(|Json(r)| r)
        .unwrap_or_default();
    let item_id: BookId = item_id
        .parse()
        .map_err(|_| ServiceError::not_found(Envelope::FailedMessage, "Book not found"))?;

    let book = match state.catalog.book_info(item_id).await.map_err(processing_error)? {
        BookLookup::Found(book) => book,
        BookLookup::Missing => return Err(ServiceError::not_found(Envelope::FailedMessage, "Book not found")),
        BookLookup::Unavailable => {
            return Err(ServiceError::not_found(Envelope::FailedMessage, "Book information not available"));
        }
    };

    if book.quantity <= 0 {
        return Err(ServiceError::bad_request(Envelope::FailedMessage, "Book is out of stock"));
    }

    let order_id = new_order_id();
    let timestamp = Utc::now().naive_utc();
    let price = apply_category_discount(book.price, request.discount_info.as_ref()).map_err(|e| match e {
        DiscountError::PercentageOutOfRange(_) => ServiceError::bad_request(Envelope::FailedMessage, e.to_string()),
        DiscountError::Overflow => processing_error(e),
    })?;

    let mut tx = state.db.begin().await.map_err(processing_error)?;
    Purchases::new(&mut tx)
        .create(&PurchaseCreateDBRequest {
            order_id: order_id.clone(),
            item_id,
            timestamp,
            price: price.final_price,
            title: book.title.clone(),
            author: book.author.clone(),
            shipping_address: request.shipping_address,
            payment_method: request.payment_method,
            original_price: Some(price.original_price),
            discount_amount: Some(price.discount_amount),
            discount_applied: price.applied,
        })
        .await
        .map_err(processing_error)?;

    if let Err(e) = state.catalog.set_quantity(item_id, book.quantity - 1).await {
        warn!(%order_id, "Inventory update failed, rolling back purchase: {:#}", e);
        tx.rollback().await.map_err(processing_error)?;
        return Err(ServiceError::internal(Envelope::FailedMessage, "Failed to update inventory"));
    }
    tx.commit().await.map_err(processing_error)?;

    info!(%order_id, item_id, price = %price.final_price, discounted = price.applied, "Purchase recorded");

    let discount = request.discount_info.filter(|_| price.applied).map(|info| DiscountDetails {
        discount_applied: true,
        original_price: price.original_price,
        discount_amount: price.discount_amount,
        final_price: price.final_price,
        discount_percentage: info.discount_percentage,
        discount_type: "category".to_string(),
        discount_message: format!("You saved ${:.2} with our category discount!", price.discount_amount),
        category: info.category,
        category_count: info.category_count,
    });

    Ok(Json(PurchaseResponse {
        success: true,
        message: "Purchase successful".to_string(),
        order_id,
        book: book.title,
        timestamp: timestamp.format(TIMESTAMP_FORMAT).to_string(),
        discount,
    }))
}

#[tracing::instrument(skip_all)]
pub async fn list_orders(State(state): State<OrderState>) -> ServiceResult<Json<OrdersEnvelope>> {
    let mut conn = state.db.acquire().await.map_err(|e| ServiceError::internal(Envelope::Orders, e))?;
    let orders = Purchases::new(&mut conn)
        .list_orders()
        .await
        .map_err(|e| ServiceError::internal(Envelope::Orders, e))?;

    Ok(Json(OrdersEnvelope {
        orders: orders
            .into_iter()
            .map(|order| OrderSummary {
                order_id: order.order_id,
                order_date: order.order_date.format(TIMESTAMP_FORMAT).to_string(),
                total_amount: order.total_amount,
                item_count: order.item_count,
            })
            .collect(),
    }))
}

#[tracing::instrument(skip_all, fields(order_id = %order_id))]
pub async fn order_details(State(state): State<OrderState>, Path(order_id): Path<String>) -> ServiceResult<Json<OrderDetailEnvelope>> {
    let mut conn = state.db.acquire().await.map_err(|e| ServiceError::internal(Envelope::Items, e))?;
    let items = Purchases::new(&mut conn)
        .items(&order_id)
        .await
        .map_err(|e| ServiceError::internal(Envelope::Items, e))?;

    let Some(order_date) = items.iter().map(|item| item.timestamp).max() else {
        return Err(ServiceError::not_found(Envelope::Error, "Order not found"));
    };

    let order = OrderDetail {
        summary: OrderSummary {
            order_id: order_id.clone(),
            order_date: order_date.format(TIMESTAMP_FORMAT).to_string(),
            total_amount: items.iter().map(|item| item.price).sum(),
            item_count: items.len() as i64,
        },
        shipping_address: items.iter().filter_map(|item| item.shipping_address.clone()).max(),
        payment_method: items.iter().filter_map(|item| item.payment_method.clone()).max(),
    };

    Ok(Json(OrderDetailEnvelope {
        order,
        items: items.into_iter().map(OrderItem::from).collect(),
    }))
}

#[tracing::instrument(skip_all)]
pub async fn health(State(state): State<OrderState>) -> ServiceResult<Json<Value>> {
    database_health(&state.db).await
}
