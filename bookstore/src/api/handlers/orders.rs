//! Checkout and order history.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::info;

use crate::{
    AppState,
    api::models::{
        cart::CartResponse,
        orders::{OrderDetailResponse, OrderResponse},
        users::CurrentUser,
    },
    db::{
        handlers::{Books, Carts, Orders},
        models::orders::{OrderCreateDBRequest, OrderDBResponse, OrderItemDBRequest},
    },
    errors::Error,
    types::OrderId,
};

fn order_not_found(id: OrderId) -> Error {
    Error::NotFound {
        resource: "Order".to_string(),
        id: id.to_string(),
    }
}

async fn with_items(conn: &mut PgConnection, order: OrderDBResponse) -> Result<OrderDetailResponse, Error> {
    let items = Orders::new(conn).items(order.id).await?;
    Ok(OrderDetailResponse {
        order: order.into(),
        items: items.into_iter().map(Into::into).collect(),
    })
}

/// What the user is about to pay for
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn checkout_summary(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<CartResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let lines = Carts::new(&mut conn).list_for_user(current_user.id).await?;
    Ok(Json(lines.into()))
}

/// Turn the cart into an order.
///
/// Stock check, order insert, stock decrement and cart clear share one transaction. The
/// books are row-locked first so two buyers cannot both take the last copy.
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn checkout(State(state): State<AppState>, current_user: CurrentUser) -> Result<(StatusCode, Json<OrderDetailResponse>), Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let lines = Carts::new(&mut tx).lock_for_checkout(current_user.id).await?;
    if lines.is_empty() {
        return Err(Error::BadRequest {
            message: "Your cart is empty".to_string(),
        });
    }
    if let Some(short) = lines.iter().find(|line| line.quantity > line.stock) {
        return Err(Error::BadRequest {
            message: format!("Not enough stock for {}. Only {} available.", short.book_name, short.stock),
        });
    }

    let total_amount: Decimal = lines.iter().map(|line| line.line_total()).sum();
    let order = Orders::new(&mut tx)
        .create(&OrderCreateDBRequest {
            user_id: current_user.id,
            total_amount,
            items: lines
                .iter()
                .map(|line| OrderItemDBRequest {
                    book_id: line.book_id,
                    quantity: line.quantity,
                    price: line.price,
                    book_name: line.book_name.clone(),
                })
                .collect(),
        })
        .await?;

    for line in &lines {
        Books::new(&mut tx).decrement_stock(line.book_id, line.quantity).await?;
    }
    Carts::new(&mut tx).clear(current_user.id).await?;

    let detail = with_items(&mut tx, order).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    info!(order_id = detail.order.id, total = %total_amount, "Order placed");
    Ok((StatusCode::CREATED, Json(detail)))
}

/// The user's orders, newest first
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn my_orders(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<OrderResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let orders = Orders::new(&mut conn).list_for_user(current_user.id).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// One order with its lines. Admins may read anyone's order.
#[tracing::instrument(skip_all, fields(user_id = current_user.id, order_id = id))]
pub async fn order_details(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetailResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let order = Orders::new(&mut conn).get_by_id(id).await?.ok_or_else(|| order_not_found(id))?;
    if order.user_id != Some(current_user.id) && !current_user.is_admin {
        return Err(order_not_found(id));
    }

    Ok(Json(with_items(&mut conn, order).await?))
}

/// The receipt shown right after checkout. Owner only.
#[tracing::instrument(skip_all, fields(user_id = current_user.id, order_id = id))]
pub async fn order_confirmation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetailResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let order = Orders::new(&mut conn)
        .get_by_id(id)
        .await?
        .filter(|order| order.user_id == Some(current_user.id))
        .ok_or_else(|| order_not_found(id))?;

    Ok(Json(with_items(&mut conn, order).await?))
}
