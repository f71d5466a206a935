//! Catalog service: the bazar's book stock.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post, put},
};
use serde_json::Value;
use tracing::info;

use crate::{
    AppState,
    bazar::{
        Envelope, ServiceError, ServiceResult, database_health,
        models::{AddStockRequest, AddStockResponse, BookEnvelope, BooksEnvelope, CatalogUpdateRequest},
    },
    db::{
        errors::DbError,
        handlers::{CatalogBooks, Repository, catalog_books::CatalogBookFilter},
        models::catalog_books::{CatalogBookCreateDBRequest, CatalogBookUpdateDBRequest},
    },
    types::BookId,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search/{topic}", get(search))
        .route("/info/{id}", get(book_info))
        .route("/update/{id}", put(update_book))
        .route("/add-stock", post(add_stock))
        .route("/health", get(health))
}

/// Ids that do not parse are reported like ids that do not exist
fn parse_id(raw: &str) -> ServiceResult<BookId> {
    raw.parse()
        .map_err(|_| ServiceError::not_found(Envelope::Error, "Book not found"))
}

#[tracing::instrument(skip_all, fields(topic = %topic))]
pub async fn search(State(state): State<AppState>, Path(topic): Path<String>) -> ServiceResult<Json<BooksEnvelope>> {
    let mut conn = state.db.acquire().await.map_err(|e| ServiceError::internal(Envelope::Books, e))?;
    let books = CatalogBooks::new(&mut conn)
        .list(&CatalogBookFilter::search(topic))
        .await
        .map_err(|e| ServiceError::internal(Envelope::Books, e))?;

    Ok(Json(BooksEnvelope {
        books: books.into_iter().map(Into::into).collect(),
    }))
}

#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn book_info(State(state): State<AppState>, Path(id): Path<String>) -> ServiceResult<Json<BookEnvelope>> {
    let id = parse_id(&id)?;
    let mut conn = state.db.acquire().await.map_err(|e| ServiceError::internal(Envelope::Book, e))?;
    let book = CatalogBooks::new(&mut conn)
        .get_by_id(id)
        .await
        .map_err(|e| ServiceError::internal(Envelope::Book, e))?
        .ok_or_else(|| ServiceError::not_found(Envelope::Error, "Book not found"))?;

    Ok(Json(BookEnvelope { book: Some(book.into()) }))
}

/// Overwrite price and/or quantity
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<CatalogUpdateRequest>, JsonRejection>,
) -> ServiceResult<Json<BookEnvelope>> {
    let id = parse_id(&id)?;
    let Json(request) = request.map_err(|e| ServiceError::rejected(Envelope::Error, e))?;
    let mut conn = state.db.acquire().await.map_err(|e| ServiceError::internal(Envelope::Error, e))?;
    let book = CatalogBooks::new(&mut conn)
        .update(
            id,
            &CatalogBookUpdateDBRequest {
                price: request.price,
                quantity: request.quantity,
            },
        )
        .await
        .map_err(|e| match e {
            DbError::NotFound => ServiceError::not_found(Envelope::Error, "Book not found"),
            other => ServiceError::internal(Envelope::Error, other),
        })?;

    info!(id, quantity = book.quantity, "Catalog book updated");
    Ok(Json(BookEnvelope { book: Some(book.into()) }))
}

fn required<T>(value: Option<T>, field: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::bad_request(Envelope::Error, format!("Missing required field: {field}")))
}

/// Add a new title, or put more copies of an existing one on the shelf
#[tracing::instrument(skip_all)]
pub async fn add_stock(
    State(state): State<AppState>,
    request: Result<Option<Json<AddStockRequest>>, JsonRejection>,
) -> ServiceResult<Json<AddStockResponse>> {
    let Some(Json(request)) = request.map_err(|e| ServiceError::rejected(Envelope::Error, e))? else {
        return Err(ServiceError::bad_request(Envelope::Error, "Invalid request parameters"));
    };
    let mut conn = state.db.acquire().await.map_err(|e| ServiceError::internal(Envelope::Error, e))?;
    let mut books = CatalogBooks::new(&mut conn);

    if request.is_new {
        let create = CatalogBookCreateDBRequest {
            title: required(request.title, "title")?,
            author: required(request.author, "author")?,
            price: required(request.price, "price")?,
            quantity: required(request.quantity, "quantity")?,
            topic: required(request.topic, "topic")?,
            description: required(request.description, "description")?,
        };
        let book = books.create(&create).await.map_err(|e| ServiceError::internal(Envelope::Error, e))?;

        info!(id = book.id, title = %book.title, "New catalog book added");
        return Ok(Json(AddStockResponse {
            success: true,
            message: "New book added successfully".to_string(),
            book: book.into(),
        }));
    }

    match (request.item_id, request.quantity) {
        (Some(item_id), Some(quantity)) => {
            let book = books
                .add_quantity(item_id, quantity)
                .await
                .map_err(|e| ServiceError::internal(Envelope::Error, e))?
                .ok_or_else(|| ServiceError::not_found(Envelope::Error, "Book not found"))?;

            info!(id = item_id, added = quantity, quantity = book.quantity, "Catalog book restocked");
            Ok(Json(AddStockResponse {
                success: true,
                message: "Book quantity updated successfully".to_string(),
                book: book.into(),
            }))
        }
        _ => Err(ServiceError::bad_request(Envelope::Error, "Invalid request parameters")),
    }
}

#[tracing::instrument(skip_all)]
pub async fn health(State(state): State<AppState>) -> ServiceResult<Json<Value>> {
    database_health(&state.db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bazar::models::CatalogBook;
    use crate::seed;
    use crate::test_utils::create_test_state;
    use axum::{body::Bytes, http::StatusCode};
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    async fn server(pool: PgPool) -> TestServer {
        let mut conn = pool.acquire().await.unwrap();
        seed::seed_catalog_if_empty(&mut conn).await.unwrap();
        drop(conn);

        TestServer::new(router().with_state(create_test_state(pool))).unwrap()
    }

    async fn first_book(server: &TestServer, topic: &str) -> CatalogBook {
        let found: BooksEnvelope = server.get(&format!("/search/{topic}")).await.json();
        found.books.into_iter().next().unwrap()
    }

    #[sqlx::test(migrations = "./migrations/bazar")]
    #[test_log::test]
    async fn test_search(pool: PgPool) {
        let server = server(pool).await;

        let found: BooksEnvelope = server.get("/search/Distributed%20Systems").await.json();
        assert_eq!(found.books.len(), 2);

        let found: BooksEnvelope = server.get("/search/tanenbaum").await.json();
        assert_eq!(found.books.len(), 3);

        let found: BooksEnvelope = server.get("/search/cooking").await.json();
        assert!(found.books.is_empty());
    }

    #[sqlx::test(migrations = "./migrations/bazar")]
    async fn test_info(pool: PgPool) {
        let server = server(pool).await;
        let book = first_book(&server, "kleppmann").await;

        let response = server.get(&format!("/info/{}", book.id)).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["book"]["title"], "Designing Data-Intensive Applications");
        assert_eq!(body["book"]["price"], json!(59.99));

        let response = server.get("/info/999999").await;
        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({ "error": "Book not found" }));

        server.get("/info/abc").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations/bazar")]
    async fn test_update(pool: PgPool) {
        let server = server(pool).await;
        let book = first_book(&server, "kleppmann").await;

        let updated: BookEnvelope = server
            .put(&format!("/update/{}", book.id))
            .json(&json!({ "quantity": 19 }))
            .await
            .json();
        let updated = updated.book.unwrap();
        assert_eq!(updated.quantity, 19);
        assert_eq!(updated.price, book.price);

        let updated: BookEnvelope = server
            .put(&format!("/update/{}", book.id))
            .json(&json!({ "price": 49.5 }))
            .await
            .json();
        assert_eq!(updated.book.unwrap().price, Decimal::new(4950, 2));

        server
            .put("/update/999999")
            .json(&json!({ "quantity": 1 }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations/bazar")]
    #[test_log::test]
    async fn test_add_new_book(pool: PgPool) {
        let server = server(pool).await;

        let response = server
            .post("/add-stock")
            .json(&json!({ "is_new": true, "title": "Rust in Action", "author": "Tim McNamara" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Missing required field: price" }));

        let response: AddStockResponse = server
            .post("/add-stock")
            .json(&json!({
                "is_new": true,
                "title": "Rust in Action",
                "author": "Tim McNamara",
                "price": 39.99,
                "quantity": 7,
                "topic": "systems programming",
                "description": "Systems programming concepts with Rust"
            }))
            .await
            .json();
        assert!(response.success);
        assert_eq!(response.message, "New book added successfully");
        assert_eq!(response.book.quantity, 7);

        let found: BooksEnvelope = server.get("/search/systems%20programming").await.json();
        assert_eq!(found.books.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations/bazar")]
    async fn test_restock(pool: PgPool) {
        let server = server(pool).await;
        let book = first_book(&server, "kleppmann").await;

        let response: AddStockResponse = server
            .post("/add-stock")
            .json(&json!({ "item_id": book.id, "quantity": 5 }))
            .await
            .json();
        assert_eq!(response.message, "Book quantity updated successfully");
        assert_eq!(response.book.quantity, book.quantity + 5);

        server
            .post("/add-stock")
            .json(&json!({ "item_id": 999999, "quantity": 5 }))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let response = server.post("/add-stock").json(&json!({ "item_id": book.id })).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Invalid request parameters" }));
    }

    #[sqlx::test(migrations = "./migrations/bazar")]
    async fn test_unreadable_bodies_keep_error_shape(pool: PgPool) {
        let server = server(pool).await;
        let book = first_book(&server, "kleppmann").await;

        let response = server
            .post("/add-stock")
            .bytes(Bytes::from_static(b"{\"item_id\": 1,"))
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].is_string(), "{body}");

        let response = server
            .put(&format!("/update/{}", book.id))
            .json(&json!({ "quantity": "plenty" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert!(body["error"].is_string(), "{body}");

        let unchanged = first_book(&server, "kleppmann").await;
        assert_eq!(unchanged.quantity, book.quantity);
    }

    #[sqlx::test(migrations = "./migrations/bazar")]
    async fn test_health(pool: PgPool) {
        let server = server(pool).await;
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }
}
