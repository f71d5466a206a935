//! Admin pages: dashboard, sales report, user management and sample data.
//!
//! Every handler takes [`AdminUser`], so anonymous callers get 401 and customers get 403.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

use crate::{
    AppState,
    api::models::{
        admin::{DashboardResponse, SalesReportResponse, SampleDataResponse},
        users::UserResponse,
    },
    auth::current_user::AdminUser,
    db::{
        errors::DbError,
        handlers::{
            Books, Orders, Reports, Repository, Users,
            books::{BookFilter, BookOrder},
            users::UserFilter,
        },
        models::users::UserUpdateDBRequest,
    },
    errors::Error,
    seed,
    types::UserId,
};

const LOW_STOCK_BELOW: i32 = 5;
const RECENT_ORDERS: i64 = 5;
const TOP_BOOKS: i64 = 10;

#[tracing::instrument(skip_all)]
pub async fn dashboard(State(state): State<AppState>, _admin: AdminUser) -> Result<Json<DashboardResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let counts = Reports::new(&mut conn).store_counts().await?;
    let low_stock_books = Books::new(&mut conn)
        .list(&BookFilter::new().quantity_below(LOW_STOCK_BELOW).order_by(BookOrder::Quantity))
        .await?;
    let all_books = Books::new(&mut conn).list(&BookFilter::new().order_by(BookOrder::Id)).await?;
    let recent_orders = Orders::new(&mut conn).recent(RECENT_ORDERS).await?;

    Ok(Json(DashboardResponse {
        total_books: counts.total_books,
        total_authors: counts.total_authors,
        total_users: counts.total_users,
        total_orders: counts.total_orders,
        total_revenue: counts.total_revenue,
        low_stock_books: low_stock_books.into_iter().map(Into::into).collect(),
        all_books: all_books.into_iter().map(Into::into).collect(),
        recent_orders: recent_orders.into_iter().map(Into::into).collect(),
    }))
}

#[tracing::instrument(skip_all)]
pub async fn sales_report(State(state): State<AppState>, _admin: AdminUser) -> Result<Json<SalesReportResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut reports = Reports::new(&mut conn);

    let monthly_sales = reports.monthly_sales().await?;
    let top_books = reports.top_books(TOP_BOOKS).await?;

    Ok(Json(SalesReportResponse {
        monthly_sales: monthly_sales.into_iter().map(Into::into).collect(),
        top_books: top_books.into_iter().map(Into::into).collect(),
    }))
}

#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>, _admin: AdminUser) -> Result<Json<Vec<UserResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let users = Users::new(&mut conn).list(&UserFilter::default()).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip_all, fields(user_id = id))]
pub async fn make_admin(State(state): State<AppState>, AdminUser(admin): AdminUser, Path(id): Path<UserId>) -> Result<Json<UserResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .update(
            id,
            &UserUpdateDBRequest {
                is_admin: Some(true),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| match e {
            DbError::NotFound => Error::NotFound {
                resource: "User".to_string(),
                id: id.to_string(),
            },
            other => other.into(),
        })?;

    info!(promoted_by = admin.id, "Granted admin rights to {}", user.username);
    Ok(Json(user.into()))
}

/// Wipe the catalog and orders and load the sample data
#[tracing::instrument(skip_all)]
pub async fn populate_sample_data(State(state): State<AppState>, AdminUser(admin): AdminUser) -> Result<Json<SampleDataResponse>, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let summary = seed::populate_sample_data(&mut tx).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    info!(requested_by = admin.id, authors = summary.authors, books = summary.books, "Sample data populated");
    Ok(Json(SampleDataResponse {
        message: "Sample data populated successfully".to_string(),
        authors: summary.authors,
        books: summary.books,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::orders::{OrderCreateDBRequest, OrderItemDBRequest};
    use crate::test_utils::{create_test_author, create_test_book, create_test_state, create_test_user, session_cookie_header};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    fn server(state: AppState) -> TestServer {
        let app = axum::Router::new()
            .route("/api/v1/admin/dashboard", get(dashboard))
            .route("/api/v1/admin/sales-report", get(sales_report))
            .route("/api/v1/admin/users", get(list_users))
            .route("/api/v1/admin/users/{id}/promote", post(make_admin))
            .route("/api/v1/admin/sample-data", post(populate_sample_data))
            .with_state(state);
        TestServer::new(app).unwrap()
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    async fn test_customers_are_forbidden(pool: PgPool) {
        let state = create_test_state(pool.clone());
        let customer = create_test_user(&pool, false).await;
        let cookie = session_cookie_header(&customer, &state.config);
        let server = server(state);

        for path in ["/api/v1/admin/dashboard", "/api/v1/admin/sales-report", "/api/v1/admin/users"] {
            server.get(path).add_header("cookie", cookie.clone()).await.assert_status(StatusCode::FORBIDDEN);
            server.get(path).await.assert_status(StatusCode::UNAUTHORIZED);
        }
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_dashboard_and_report(pool: PgPool) {
        let state = create_test_state(pool.clone());
        let admin = create_test_user(&pool, true).await;
        let buyer = create_test_user(&pool, false).await;
        let author = create_test_author(&pool, "Author").await;
        let scarce = create_test_book(&pool, author.id, "Scarce", 2, Decimal::new(1000, 2)).await;
        create_test_book(&pool, author.id, "Stocked", 50, Decimal::new(500, 2)).await;

        let mut conn = pool.acquire().await.unwrap();
        Orders::new(&mut conn)
            .create(&OrderCreateDBRequest {
                user_id: buyer.id,
                total_amount: Decimal::new(2000, 2),
                items: vec![OrderItemDBRequest {
                    book_id: scarce.id,
                    quantity: 2,
                    price: scarce.price,
                    book_name: scarce.name.clone(),
                }],
            })
            .await
            .unwrap();
        drop(conn);

        let cookie = session_cookie_header(&admin, &state.config);
        let server = server(state);

        let dashboard: DashboardResponse = server.get("/api/v1/admin/dashboard").add_header("cookie", cookie.clone()).await.json();
        assert_eq!(dashboard.total_books, 2);
        assert_eq!(dashboard.total_users, 1);
        assert_eq!(dashboard.total_orders, 1);
        assert_eq!(dashboard.total_revenue, Decimal::new(2000, 2));
        assert_eq!(dashboard.low_stock_books.len(), 1);
        assert_eq!(dashboard.low_stock_books[0].title, "Scarce");
        assert_eq!(dashboard.all_books.len(), 2);
        assert_eq!(dashboard.recent_orders[0].username.as_deref(), Some(buyer.username.as_str()));

        let report: SalesReportResponse = server.get("/api/v1/admin/sales-report").add_header("cookie", cookie).await.json();
        assert_eq!(report.monthly_sales.len(), 1);
        assert_eq!(report.top_books[0].title, "Scarce");
        assert_eq!(report.top_books[0].total_sold, 2);
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    async fn test_promote_user(pool: PgPool) {
        let state = create_test_state(pool.clone());
        let admin = create_test_user(&pool, true).await;
        let customer = create_test_user(&pool, false).await;
        let cookie = session_cookie_header(&admin, &state.config);
        let server = server(state);

        let promoted: UserResponse = server
            .post(&format!("/api/v1/admin/users/{}/promote", customer.id))
            .add_header("cookie", cookie.clone())
            .await
            .json();
        assert!(promoted.is_admin);

        server
            .post("/api/v1/admin/users/999999/promote")
            .add_header("cookie", cookie.clone())
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let users: Vec<UserResponse> = server.get("/api/v1/admin/users").add_header("cookie", cookie).await.json();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.is_admin));
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    async fn test_populate_sample_data_replaces_catalog(pool: PgPool) {
        let state = create_test_state(pool.clone());
        let admin = create_test_user(&pool, true).await;
        let author = create_test_author(&pool, "Stale Author").await;
        create_test_book(&pool, author.id, "Stale Book", 1, Decimal::ONE).await;
        let cookie = session_cookie_header(&admin, &state.config);
        let server = server(state);

        let response: SampleDataResponse = server.post("/api/v1/admin/sample-data").add_header("cookie", cookie).await.json();
        assert_eq!(response.authors, seed::SAMPLE_AUTHORS.len());
        assert_eq!(response.books, seed::SAMPLE_BOOKS.len());

        let stale: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE name = 'Stale Book'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stale, 0);
    }
}
