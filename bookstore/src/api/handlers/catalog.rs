//! Browsing for everyone, catalog maintenance for admins.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

use crate::{
    AppState,
    api::models::{
        catalog::{AuthorCreate, AuthorResponse, BookDetailResponse, BookRequest, BookResponse},
        users::CurrentUser,
    },
    auth::current_user::AdminUser,
    db::{
        handlers::{
            Authors, Books, Favorites, Repository,
            authors::AuthorFilter,
            books::{BookFilter, BookOrder},
        },
        models::{authors::AuthorCreateDBRequest, books::BookDBRequest},
    },
    errors::Error,
    types::{AuthorId, BookId},
};

const HOME_PAGE_BOOKS: i64 = 6;
const MAX_ISBN_LEN: usize = 13;

fn book_not_found(id: BookId) -> Error {
    Error::NotFound {
        resource: "Book".to_string(),
        id: id.to_string(),
    }
}

/// Validate a create/replace body into a full row
fn book_row(request: BookRequest) -> Result<BookDBRequest, Error> {
    let isbn = request.isbn.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let title = request.title.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(isbn), Some(name), Some(author_id)) = (isbn, title, request.author_id) else {
        return Err(Error::BadRequest {
            message: "ISBN, title and author are required".to_string(),
        });
    };

    if isbn.chars().count() > MAX_ISBN_LEN {
        return Err(Error::BadRequest {
            message: format!("ISBN must be at most {MAX_ISBN_LEN} characters"),
        });
    }
    let price = request.price.unwrap_or(Decimal::ZERO);
    if price.is_sign_negative() {
        return Err(Error::BadRequest {
            message: "Price cannot be negative".to_string(),
        });
    }
    let quantity = request.quantity.unwrap_or(0);
    if quantity < 0 {
        return Err(Error::BadRequest {
            message: "Quantity cannot be negative".to_string(),
        });
    }

    Ok(BookDBRequest {
        isbn,
        name,
        cant_pages: request.pages,
        price,
        description: request.description.filter(|s| !s.is_empty()),
        cover_url: request.cover_url.filter(|s| !s.is_empty()),
        quantity,
        author_id,
    })
}

/// The newest additions to the catalog
#[tracing::instrument(skip_all)]
pub async fn home(State(state): State<AppState>) -> Result<Json<Vec<BookResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let books = Books::new(&mut conn)
        .list(&BookFilter::new().order_by(BookOrder::Newest).limit(HOME_PAGE_BOOKS))
        .await?;

    Ok(Json(books.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip_all)]
pub async fn list_authors(State(state): State<AppState>) -> Result<Json<Vec<AuthorResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let authors = Authors::new(&mut conn).list(&AuthorFilter::default()).await?;

    Ok(Json(authors.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip_all)]
pub async fn create_author(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<AuthorCreate>,
) -> Result<(StatusCode, Json<AuthorResponse>), Error> {
    let name = request.name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(name), Some(age)) = (name, request.age) else {
        return Err(Error::BadRequest {
            message: "Author name and age are required".to_string(),
        });
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let author = Authors::new(&mut conn).create(&AuthorCreateDBRequest { name, age }).await?;

    Ok((StatusCode::CREATED, Json(author.into())))
}

/// Books that can currently be bought, alphabetically
#[tracing::instrument(skip_all)]
pub async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<BookResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let books = Books::new(&mut conn).list(&BookFilter::new().in_stock()).await?;

    Ok(Json(books.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip_all, fields(book_id = id))]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    current_user: Option<CurrentUser>,
) -> Result<Json<BookDetailResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let book = Books::new(&mut conn).get_by_id(id).await?.ok_or_else(|| book_not_found(id))?;

    let is_favorite = match current_user {
        Some(user) => Favorites::new(&mut conn).is_favorite(user.id, id).await?,
        None => false,
    };

    Ok(Json(BookDetailResponse {
        book: book.into(),
        is_favorite,
    }))
}

async fn ensure_author_exists(conn: &mut sqlx::PgConnection, author_id: AuthorId) -> Result<(), Error> {
    if Authors::new(conn).get_by_id(author_id).await?.is_none() {
        return Err(Error::BadRequest {
            message: "Selected author does not exist".to_string(),
        });
    }
    Ok(())
}

#[tracing::instrument(skip_all)]
pub async fn create_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), Error> {
    let row = book_row(request)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    ensure_author_exists(&mut tx, row.author_id).await?;
    let book = Books::new(&mut tx).create(&row).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(book.into())))
}

/// Replace every field of a book
#[tracing::instrument(skip_all, fields(book_id = id))]
pub async fn update_book(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<BookId>,
    Json(request): Json<BookRequest>,
) -> Result<Json<BookResponse>, Error> {
    let row = book_row(request)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    if Books::new(&mut tx).get_by_id(id).await?.is_none() {
        return Err(book_not_found(id));
    }
    ensure_author_exists(&mut tx, row.author_id).await?;
    let book = Books::new(&mut tx).update(id, &row).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(book.into()))
}

/// Delete a book. Cart lines and favorites go with it; past order lines keep their title.
#[tracing::instrument(skip_all, fields(book_id = id))]
pub async fn delete_book(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<BookId>) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if Books::new(&mut conn).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(book_not_found(id))
    }
}
