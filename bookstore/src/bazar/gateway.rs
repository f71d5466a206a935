//! Gateway: the bazar's front door.
//!
//! Serves the index page and forwards the browser's `/api/*` calls to the catalog and order
//! services. Upstream answers pass through untouched; only a failed call (connection error,
//! timeout, a body that is not JSON) is turned into a 500 carrying the route's usual empty
//! payload so the page can keep rendering.

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use minijinja::{Environment, context};
use reqwest::{Client, Method};
use serde_json::{Value, json};
use tracing::{debug, error, instrument};
use url::Url;

use crate::{
    bazar::{Envelope, ServiceError, ServiceResult, client::ensure_slash},
    config::ServicesConfig,
};

const INDEX_TEMPLATE: &str = "index.html";

/// Topic the recommended shelf searches for
const RECOMMENDED_TOPIC: &str = "programming";

#[derive(Clone)]
pub struct GatewayState {
    pub http: Client,
    pub catalog_url: Url,
    pub order_url: Url,
    pub templates: Arc<Environment<'static>>,
}

impl GatewayState {
    pub fn new(services: &ServicesConfig, http: Client) -> anyhow::Result<Self> {
        let mut templates = Environment::new();
        templates.add_template(INDEX_TEMPLATE, include_str!("../../templates/gateway_index.html"))?;

        Ok(Self {
            http,
            catalog_url: services.catalog_url.clone(),
            order_url: services.order_url.clone(),
            templates: Arc::new(templates),
        })
    }
}

pub fn router() -> Router<GatewayState> {
    Router::new()
        .route("/", get(index))
        .route("/api/search/recommended", get(recommended))
        .route("/api/search/{topic}", get(search))
        .route("/api/info/{id}", get(book_info))
        .route("/api/purchase/{id}", post(purchase))
        .route("/api/catalog/add-stock", post(add_stock))
        .route("/api/orders", get(orders))
        .route("/api/orders/{order_id}", get(order_details))
        .route("/api/history", get(orders))
        .route("/health", get(health))
}

/// Append path segments to a service base URL, percent-encoding each one
fn upstream(base: &Url, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = ensure_slash(base);
    url.path_segments_mut()
        .map_err(|_| anyhow!("{base} cannot be used as a base URL"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

type Forwarded = (StatusCode, Json<Value>);

impl GatewayState {
    async fn forward(&self, method: Method, url: Url, body: Option<Value>) -> anyhow::Result<Forwarded> {
        debug!("Forwarding {} {}", method, url);
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        Ok((status, Json(body)))
    }

    async fn proxy(&self, method: Method, base: &Url, segments: &[&str], body: Option<Value>, envelope: Envelope) -> ServiceResult<Forwarded> {
        let url = upstream(base, segments).map_err(|e| ServiceError::internal(envelope, e))?;
        self.forward(method, url.clone(), body).await.map_err(|e| {
            error!("Upstream call to {} failed: {:#}", url, e);
            ServiceError::internal(envelope, e)
        })
    }
}

#[instrument(skip_all)]
pub async fn index(State(state): State<GatewayState>) -> ServiceResult<Html<String>> {
    let page = state
        .templates
        .get_template(INDEX_TEMPLATE)
        .and_then(|template| {
            template.render(context! {
                catalog_url => state.catalog_url.as_str(),
                order_url => state.order_url.as_str(),
            })
        })
        .map_err(|e| ServiceError::internal(Envelope::Error, e))?;
    Ok(Html(page))
}

#[instrument(skip_all, fields(topic = %topic))]
pub async fn search(State(state): State<GatewayState>, Path(topic): Path<String>) -> ServiceResult<Forwarded> {
    state
        .proxy(Method::GET, &state.catalog_url, &["search", &topic], None, Envelope::Books)
        .await
}

#[instrument(skip_all)]
pub async fn recommended(State(state): State<GatewayState>) -> ServiceResult<Forwarded> {
    state
        .proxy(Method::GET, &state.catalog_url, &["search", RECOMMENDED_TOPIC], None, Envelope::Books)
        .await
}

#[instrument(skip_all, fields(id = %id))]
pub async fn book_info(State(state): State<GatewayState>, Path(id): Path<String>) -> ServiceResult<Forwarded> {
    state.proxy(Method::GET, &state.catalog_url, &["info", &id], None, Envelope::Book).await
}

#[instrument(skip_all, fields(id = %id))]
pub async fn purchase(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: Result<Option<Json<Value>>, JsonRejection>,
) -> ServiceResult<Forwarded> {
    let body = body.map_err(|e| ServiceError::rejected(Envelope::FailedError, e))?;
    state
        .proxy(Method::POST, &state.order_url, &["purchase", &id], body.map(|Json(b)| b), Envelope::FailedError)
        .await
}

#[instrument(skip_all)]
pub async fn add_stock(State(state): State<GatewayState>, body: Result<Option<Json<Value>>, JsonRejection>) -> ServiceResult<Forwarded> {
    let body = body.map_err(|e| ServiceError::rejected(Envelope::FailedError, e))?;
    state
        .proxy(Method::POST, &state.catalog_url, &["add-stock"], body.map(|Json(b)| b), Envelope::FailedError)
        .await
}

#[instrument(skip_all)]
pub async fn orders(State(state): State<GatewayState>) -> ServiceResult<Forwarded> {
    state.proxy(Method::GET, &state.order_url, &["orders"], None, Envelope::Orders).await
}

#[instrument(skip_all, fields(order_id = %order_id))]
pub async fn order_details(State(state): State<GatewayState>, Path(order_id): Path<String>) -> ServiceResult<Forwarded> {
    state
        .proxy(Method::GET, &state.order_url, &["orders", &order_id], None, Envelope::Items)
        .await
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
