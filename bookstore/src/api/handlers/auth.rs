use axum::{Json, extract::State, http::StatusCode};
use tracing::info;

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, AuthSuccessResponse, LoginRequest, LogoutResponse, SessionResponse, SignupRequest},
        users::{CurrentUser, UserResponse},
    },
    auth::{password, session},
    db::{
        handlers::{Books, Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::Error,
    seed,
};

/// Create a customer account and sign it in
#[tracing::instrument(skip_all)]
pub async fn signup(State(state): State<AppState>, Json(request): Json<SignupRequest>) -> Result<SessionResponse, Error> {
    let username = request.username.trim();
    let email = request.email.trim();
    if username.is_empty() || email.is_empty() || request.password.is_empty() || request.confirm_password.is_empty() {
        return Err(Error::BadRequest {
            message: "All fields are required".to_string(),
        });
    }
    if request.password != request.confirm_password {
        return Err(Error::BadRequest {
            message: "Passwords do not match".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut tx);
    if user_repo.username_or_email_taken(username, email).await? {
        return Err(Error::Conflict {
            message: "Username or email already exists".to_string(),
        });
    }

    let password_hash = password::hash_password_blocking(request.password).await?;
    let created_user = user_repo
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            is_admin: false,
        })
        .await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    info!(user_id = created_user.id, "New account registered");
    let current_user = CurrentUser::from(created_user.clone());
    let token = session::create_session_token(&current_user, &state.config)?;

    Ok(SessionResponse {
        status: StatusCode::CREATED,
        auth_response: AuthResponse {
            user: UserResponse::from(created_user),
            message: "Registration successful".to_string(),
        },
        cookie: session::session_cookie(&token, &state.config),
    })
}

/// Sign in with username and password
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<SessionResponse, Error> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(Error::BadRequest {
            message: "Username and password are required".to_string(),
        });
    }
    let invalid = || Error::Unauthenticated {
        message: Some("Invalid username or password".to_string()),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .get_user_by_username(request.username.trim())
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password_blocking(request.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    // An almost empty shop gets its sample catalog back
    let threshold = state.config.sample_data.populate_on_login_below;
    if threshold > 0 && Books::new(&mut conn).count().await? < threshold {
        let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
        let summary = seed::populate_sample_data(&mut tx).await?;
        tx.commit().await.map_err(|e| Error::Database(e.into()))?;
        info!(authors = summary.authors, books = summary.books, "Repopulated sample catalog on login");
    }

    let current_user = CurrentUser::from(user.clone());
    let token = session::create_session_token(&current_user, &state.config)?;

    Ok(SessionResponse {
        status: StatusCode::OK,
        auth_response: AuthResponse {
            user: UserResponse::from(user),
            message: "Login successful".to_string(),
        },
        cookie: session::session_cookie(&token, &state.config),
    })
}

/// Clear the session cookie
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    Ok(LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "You have been logged out".to_string(),
        },
        cookie: session::expired_session_cookie(&state.config),
    })
}

/// The signed-in user
#[tracing::instrument(skip_all)]
pub async fn me(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn).get_by_id(current_user.id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: current_user.id.to_string(),
    })?;
    Ok(Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_config, create_test_user};
    use axum::routing::{get, post};
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use sqlx::PgPool;

    fn server(pool: PgPool, populate_below: i64) -> TestServer {
        let mut config = create_test_config();
        config.sample_data.populate_on_login_below = populate_below;
        let state = AppState::builder().db(pool).config(config).build();

        let app = axum::Router::new()
            .route("/authentication/signup", post(signup))
            .route("/authentication/login", post(login))
            .route("/authentication/logout", post(logout))
            .route("/authentication/me", get(me))
            .with_state(state);

        TestServer::new(app).unwrap()
    }

    fn signup_body(username: &str, email: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter22".to_string(),
        }
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_signup_sets_session(pool: PgPool) {
        let server = server(pool, 0);

        let response = server.post("/authentication/signup").json(&signup_body("reader", "reader@example.com")).await;
        response.assert_status(StatusCode::CREATED);
        let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap().to_string();
        assert!(cookie.starts_with("bookstore_session="));
        assert!(cookie.contains("HttpOnly"));

        let body: AuthResponse = response.json();
        assert_eq!(body.user.username, "reader");
        assert!(!body.user.is_admin);

        let session = cookie.split(';').next().unwrap().to_string();
        let me = server.get("/authentication/me").add_header("cookie", session).await;
        me.assert_status_ok();
        let me: UserResponse = me.json();
        assert_eq!(me.email, "reader@example.com");
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    async fn test_signup_validation(pool: PgPool) {
        let server = server(pool, 0);

        let response = server
            .post("/authentication/signup")
            .json(&json!({"username": "reader", "email": "reader@example.com", "password": "x"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "All fields are required");

        let mut mismatch = signup_body("reader", "reader@example.com");
        mismatch.confirm_password = "different".to_string();
        let response = server.post("/authentication/signup").json(&mismatch).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "Passwords do not match");
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    async fn test_signup_duplicate(pool: PgPool) {
        let server = server(pool, 0);

        server
            .post("/authentication/signup")
            .json(&signup_body("reader", "reader@example.com"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.post("/authentication/signup").json(&signup_body("other", "reader@example.com")).await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["message"], "Username or email already exists");
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    async fn test_login(pool: PgPool) {
        let server = server(pool, 0);
        server
            .post("/authentication/signup")
            .json(&signup_body("reader", "reader@example.com"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/authentication/login")
            .json(&json!({"username": "reader", "password": "hunter22"}))
            .await;
        response.assert_status_ok();
        assert!(response.headers().get("set-cookie").is_some());
        assert_eq!(response.json::<AuthResponse>().message, "Login successful");

        let response = server
            .post("/authentication/login")
            .json(&json!({"username": "reader", "password": "wrong"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["message"], "Invalid username or password");

        let response = server
            .post("/authentication/login")
            .json(&json!({"username": "nobody", "password": "hunter22"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server.post("/authentication/login").json(&json!({"username": "reader"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "Username and password are required");
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    async fn test_login_populates_empty_catalog(pool: PgPool) {
        let server = server(pool.clone(), 10);
        server
            .post("/authentication/signup")
            .json(&signup_body("reader", "reader@example.com"))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/authentication/login")
            .json(&json!({"username": "reader", "password": "hunter22"}))
            .await
            .assert_status_ok();

        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books").fetch_one(&pool).await.unwrap();
        assert_eq!(books, seed::SAMPLE_BOOKS.len() as i64);
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    async fn test_logout_expires_cookie(pool: PgPool) {
        let server = server(pool, 0);

        let response = server.post("/authentication/logout").await;
        response.assert_status_ok();
        let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    async fn test_me_requires_session(pool: PgPool) {
        create_test_user(&pool, false).await;
        let server = server(pool, 0);

        server.get("/authentication/me").await.assert_status(StatusCode::UNAUTHORIZED);
    }
}
