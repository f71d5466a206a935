use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        favorites::{FavoriteRequest, FavoriteResponse, ToggleFavoriteResponse},
        users::CurrentUser,
    },
    db::handlers::{Books, Favorites, Repository},
    errors::Error,
    types::{BookId, FavoriteId},
};

async fn ensure_book_exists(state: &AppState, book_id: BookId) -> Result<(), Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if Books::new(&mut conn).get_by_id(book_id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Book".to_string(),
            id: book_id.to_string(),
        });
    }
    Ok(())
}

#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn list_favorites(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<FavoriteResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let favorites = Favorites::new(&mut conn).list_for_user(current_user.id).await?;
    Ok(Json(favorites.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip_all, fields(user_id = current_user.id, book_id = request.book_id))]
pub async fn add_favorite(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<FavoriteRequest>,
) -> Result<(StatusCode, Json<FavoriteResponse>), Error> {
    ensure_book_exists(&state, request.book_id).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut favorites = Favorites::new(&mut conn);
    // Duplicates surface as a unique violation, reported as 409 "Book already in favorites"
    let id = favorites.add(current_user.id, request.book_id).await?;
    let favorite = favorites
        .list_for_user(current_user.id)
        .await?
        .into_iter()
        .find(|f| f.id == id)
        .ok_or_else(|| Error::Internal {
            operation: format!("read back favorite {id}"),
        })?;

    Ok((StatusCode::CREATED, Json(favorite.into())))
}

#[tracing::instrument(skip_all, fields(user_id = current_user.id, favorite_id = id))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<FavoriteId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if Favorites::new(&mut conn).remove(current_user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Favorite".to_string(),
            id: id.to_string(),
        })
    }
}

/// Flip the bookmark on a book
#[tracing::instrument(skip_all, fields(user_id = current_user.id, book_id = request.book_id))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<FavoriteRequest>,
) -> Result<Json<ToggleFavoriteResponse>, Error> {
    ensure_book_exists(&state, request.book_id).await?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut favorites = Favorites::new(&mut tx);
    let is_favorite = if favorites.remove_book(current_user.id, request.book_id).await? {
        false
    } else {
        favorites.add(current_user.id, request.book_id).await?;
        true
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ToggleFavoriteResponse {
        book_id: request.book_id,
        is_favorite,
    }))
}
