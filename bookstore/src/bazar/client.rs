//! HTTP client the order service uses to talk to the catalog service.

use crate::bazar::models::{BookEnvelope, CatalogBook, CatalogUpdateRequest};
use crate::types::BookId;
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, instrument};
use url::Url;

/// Result of asking the catalog about one book
#[derive(Debug, Clone, PartialEq)]
pub enum BookLookup {
    Found(CatalogBook),
    /// The catalog answered with a non-200 status
    Missing,
    /// The catalog answered 200 but without a book
    Unavailable,
}

/// Operations the order service needs from the catalog.
///
/// Implemented over HTTP by [`CatalogReqwest`]; tests swap in an in-memory fake.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn book_info(&self, id: BookId) -> anyhow::Result<BookLookup>;

    /// Overwrite the stock count of a book
    async fn set_quantity(&self, id: BookId, quantity: i32) -> anyhow::Result<()>;
}

pub struct CatalogReqwest {
    client: Client,
    base_url: Url,
}

impl CatalogReqwest {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        ensure_slash(&self.base_url)
            .join(path)
            .map_err(|e| anyhow!("Failed to construct catalog URL: {}", e))
    }
}

/// Makes sure a url has a trailing slash, so that `join` appends instead of replacing the last
/// path segment.
pub(crate) fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let mut path = new_url.path().to_string();
        path.push('/');
        new_url.set_path(&path);
        new_url
    }
}

#[async_trait]
impl CatalogClient for CatalogReqwest {
    #[instrument(skip(self), err)]
    async fn book_info(&self, id: BookId) -> anyhow::Result<BookLookup> {
        let url = self.url(&format!("info/{id}"))?;
        debug!("Fetching book info from {}", url);

        let response = self.client.get(url).send().await?;
        if response.status() != reqwest::StatusCode::OK {
            debug!("Catalog answered {} for book {}", response.status(), id);
            return Ok(BookLookup::Missing);
        }

        let body: BookEnvelope = response.json().await?;
        Ok(match body.book {
            Some(book) => BookLookup::Found(book),
            None => BookLookup::Unavailable,
        })
    }

    #[instrument(skip(self), err)]
    async fn set_quantity(&self, id: BookId, quantity: i32) -> anyhow::Result<()> {
        let url = self.url(&format!("update/{id}"))?;
        let request = CatalogUpdateRequest {
            price: None,
            quantity: Some(quantity),
        };

        let response = self.client.put(url.clone()).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Catalog rejected stock update. Url was: {}", url);
            return Err(anyhow!("Catalog service error: {} - {}", status, body));
        }
        Ok(())
    }
}
