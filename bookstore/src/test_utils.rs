//! Shared constructors for tests.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    config::{Config, PoolSettings, ServiceRole},
    db::{
        handlers::{Authors, Books, Repository, Users},
        models::{
            authors::{AuthorCreateDBRequest, AuthorDBResponse},
            books::{BookDBRequest, BookDBResponse},
            users::{UserCreateDBRequest, UserDBResponse},
        },
    },
    types::AuthorId,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub fn create_test_config() -> Config {
    let mut config = Config {
        role: ServiceRole::Storefront,
        host: "127.0.0.1".to_string(),
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    };
    config.database.pool = PoolSettings {
        max_connections: 1,
        min_connections: 0,
        ..Default::default()
    };
    config.auth.session.secure = false;
    // Tests seed exactly what they need
    config.sample_data.seed_on_startup = false;
    config.sample_data.populate_on_login_below = 0;
    config
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::builder().db(pool).config(create_test_config()).build()
}

pub async fn create_test_user(pool: &PgPool, is_admin: bool) -> UserDBResponse {
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");

    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            username: format!("user_{suffix}"),
            email: format!("user_{suffix}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            is_admin,
        })
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_author(pool: &PgPool, name: &str) -> AuthorDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");

    Authors::new(&mut conn)
        .create(&AuthorCreateDBRequest {
            name: name.to_string(),
            age: 50,
        })
        .await
        .expect("Failed to create test author")
}

pub async fn create_test_book(pool: &PgPool, author_id: AuthorId, name: &str, quantity: i32, price: Decimal) -> BookDBResponse {
    let isbn = Uuid::new_v4().simple().to_string()[..13].to_string();
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");

    Books::new(&mut conn)
        .create(&BookDBRequest {
            isbn,
            name: name.to_string(),
            cant_pages: Some(200),
            price,
            description: None,
            cover_url: None,
            quantity,
            author_id,
        })
        .await
        .expect("Failed to create test book")
}

/// `Cookie` header value carrying a session for `user`
pub fn session_cookie_header(user: &UserDBResponse, config: &Config) -> String {
    let token = session::create_session_token(&CurrentUser::from(user.clone()), config).expect("Failed to create session token");
    format!("{}={}", config.auth.session.cookie_name, token)
}
