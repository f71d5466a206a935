use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::PgConnection;

use crate::{
    AppState,
    api::models::{
        cart::{AddToCartRequest, CartResponse, UpdateCartRequest},
        users::CurrentUser,
    },
    db::{
        handlers::{Books, Carts, Repository},
        models::cart::CartLineDBResponse,
    },
    errors::Error,
    types::{CartItemId, UserId},
};

fn cart_item_not_found(cart_id: CartItemId) -> Error {
    Error::NotFound {
        resource: "Cart item".to_string(),
        id: cart_id.to_string(),
    }
}

/// Load a line and make sure it belongs to `user_id`. Someone else's line looks missing.
async fn owned_line(conn: &mut PgConnection, user_id: UserId, cart_id: CartItemId) -> Result<CartLineDBResponse, Error> {
    match Carts::new(conn).get_line(cart_id).await? {
        Some(line) if line.user_id == user_id => Ok(line),
        _ => Err(cart_item_not_found(cart_id)),
    }
}

async fn cart_for(conn: &mut PgConnection, user_id: UserId) -> Result<CartResponse, Error> {
    Ok(Carts::new(conn).list_for_user(user_id).await?.into())
}

#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn view_cart(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<CartResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Ok(Json(cart_for(&mut conn, current_user.id).await?))
}

#[tracing::instrument(skip_all, fields(user_id = current_user.id, book_id = request.book_id))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartResponse>), Error> {
    if request.quantity < 1 {
        return Err(Error::BadRequest {
            message: "Quantity must be at least 1".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let book = Books::new(&mut tx).get_by_id(request.book_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Book".to_string(),
        id: request.book_id.to_string(),
    })?;
    if book.quantity < request.quantity {
        return Err(Error::BadRequest {
            message: format!("Not enough stock. Only {} available.", book.quantity),
        });
    }

    Carts::new(&mut tx).add(current_user.id, book.id, request.quantity).await?;
    let cart = cart_for(&mut tx, current_user.id).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(cart)))
}

/// Set a line's quantity. Zero or less removes the line.
#[tracing::instrument(skip_all, fields(user_id = current_user.id, cart_id = cart_id))]
pub async fn update_cart(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(cart_id): Path<CartItemId>,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartResponse>, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let line = owned_line(&mut tx, current_user.id, cart_id).await?;

    if request.quantity <= 0 {
        Carts::new(&mut tx).remove(line.id).await?;
    } else if request.quantity > line.stock {
        return Err(Error::BadRequest {
            message: format!("Not enough stock. Only {} available.", line.stock),
        });
    } else {
        Carts::new(&mut tx).set_quantity(line.id, request.quantity).await?;
    }

    let cart = cart_for(&mut tx, current_user.id).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok(Json(cart))
}

#[tracing::instrument(skip_all, fields(user_id = current_user.id, cart_id = cart_id))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(cart_id): Path<CartItemId>,
) -> Result<Json<CartResponse>, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let line = owned_line(&mut tx, current_user.id, cart_id).await?;
    Carts::new(&mut tx).remove(line.id).await?;

    let cart = cart_for(&mut tx, current_user.id).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok(Json(cart))
}
