//! The bazar split: a catalog service, an order service and a gateway in front of both.
//!
//! Each service is a small axum router mounted by [`crate::build_router`] according to the
//! configured [`crate::config::ServiceRole`]:
//!
//! - [`catalog`]: owns the `books` stock table (search, info, update, add-stock)
//! - [`orders`]: records purchases, calling back into the catalog through [`client`]
//! - [`gateway`]: serves the index page and forwards `/api/*` to the two services
//!
//! The services keep the JSON shapes their browser client expects. Errors are
//! [`ServiceError`]s, which render the error body each route has always used instead of the
//! storefront's `{"message": ...}`.

pub mod catalog;
pub mod client;
pub mod discount;
pub mod gateway;
pub mod models;
pub mod orders;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use sqlx::PgPool;
use tracing::{error, warn};

/// The JSON body an error is wrapped in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{"error": ...}`
    Error,
    /// `{"error": ..., "books": []}`
    Books,
    /// `{"error": ..., "book": null}`
    Book,
    /// `{"error": ..., "items": []}`
    Items,
    /// `{"error": ..., "orders": []}`
    Orders,
    /// `{"success": false, "message": ...}`
    FailedMessage,
    /// `{"success": false, "error": ...}`
    FailedError,
    /// `{"status": "error", "message": ...}`
    Status,
}

impl Envelope {
    fn body(self, message: &str) -> Value {
        match self {
            Envelope::Error => json!({ "error": message }),
            Envelope::Books => json!({ "error": message, "books": [] }),
            Envelope::Book => json!({ "error": message, "book": null }),
            Envelope::Items => json!({ "error": message, "items": [] }),
            Envelope::Orders => json!({ "error": message, "orders": [] }),
            Envelope::FailedMessage => json!({ "success": false, "message": message }),
            Envelope::FailedError => json!({ "success": false, "error": message }),
            Envelope::Status => json!({ "status": "error", "message": message }),
        }
    }
}

/// Error returned by the bazar services
#[derive(Debug, Clone)]
pub struct ServiceError {
    pub status: StatusCode,
    pub envelope: Envelope,
    pub message: String,
}

impl ServiceError {
    pub fn new(status: StatusCode, envelope: Envelope, message: impl Into<String>) -> Self {
        Self {
            status,
            envelope,
            message: message.into(),
        }
    }

    pub fn not_found(envelope: Envelope, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, envelope, message)
    }

    pub fn bad_request(envelope: Envelope, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, envelope, message)
    }

    /// A request body axum could not read as JSON, keeping the route's envelope
    pub fn rejected(envelope: Envelope, rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), envelope, rejection.body_text())
    }

    /// A 500 carrying the underlying error text
    pub fn internal(envelope: Envelope, err: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, envelope, err.to_string())
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

impl std::error::Error for ServiceError {}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Service error: {}", self.message);
        } else {
            warn!("Client error: {}", self.message);
        }
        (self.status, Json(self.envelope.body(&self.message))).into_response()
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Shared `/health` body for the services that own a database
pub(crate) async fn database_health(db: &PgPool) -> ServiceResult<Json<Value>> {
    sqlx::query("SELECT 1")
        .execute(db)
        .await
        .map_err(|e| ServiceError::internal(Envelope::Status, e))?;
    Ok(Json(json!({ "status": "ok" })))
}
