//! Database repository for storefront books.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::books::{BookDBRequest, BookDBResponse},
};
use crate::types::{AuthorId, BookId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Sort orders used by the catalog pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookOrder {
    /// Alphabetical, for browsing
    #[default]
    Name,
    /// Most recently added first, for the home page
    Newest,
    /// Insertion order, for the admin table
    Id,
    /// Lowest stock first, for restocking
    Quantity,
}

impl BookOrder {
    fn sql(self) -> &'static str {
        match self {
            BookOrder::Name => "b.name, b.book_id",
            BookOrder::Newest => "b.created_at DESC, b.book_id DESC",
            BookOrder::Id => "b.book_id",
            BookOrder::Quantity => "b.quantity, b.book_id",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Hide books with nothing on the shelf
    pub in_stock_only: bool,
    /// Only books with `quantity` strictly below this value
    pub quantity_below: Option<i32>,
    pub order: BookOrder,
    pub limit: Option<i64>,
}

impl BookFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_stock(mut self) -> Self {
        self.in_stock_only = true;
        self
    }

    pub fn quantity_below(mut self, threshold: i32) -> Self {
        self.quantity_below = Some(threshold);
        self
    }

    pub fn order_by(mut self, order: BookOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

const SELECT_BOOKS: &str = r#"
    SELECT b.book_id, b.isbn, b.name, b.cant_pages, b.price, b.description, b.cover_url,
           b.quantity, b.author_id, a.name AS author_name, b.created_at
    FROM books b
    JOIN authors a ON a.author_id = b.author_id
"#;

#[derive(Debug, Clone, FromRow)]
struct Book {
    pub book_id: BookId,
    pub isbn: String,
    pub name: String,
    pub cant_pages: Option<i32>,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub quantity: i32,
    pub author_id: AuthorId,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Book> for BookDBResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.book_id,
            isbn: book.isbn,
            name: book.name,
            cant_pages: book.cant_pages,
            price: book.price,
            description: book.description,
            cover_url: book.cover_url,
            quantity: book.quantity,
            author_id: book.author_id,
            author_name: book.author_name,
            created_at: book.created_at,
        }
    }
}

pub struct Books<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Books<'c> {
    type CreateRequest = BookDBRequest;
    type UpdateRequest = BookDBRequest;
    type Response = BookDBResponse;
    type Id = BookId;
    type Filter = BookFilter;

    #[instrument(skip(self, request), fields(isbn = %request.isbn), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let book_id: BookId = sqlx::query_scalar(
            r#"
            INSERT INTO books (isbn, name, cant_pages, price, description, cover_url, quantity, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING book_id
            "#,
        )
        .bind(&request.isbn)
        .bind(&request.name)
        .bind(request.cant_pages)
        .bind(request.price)
        .bind(&request.description)
        .bind(&request.cover_url)
        .bind(request.quantity)
        .bind(request.author_id)
        .fetch_one(&mut *self.db)
        .await?;

        self.get_by_id(book_id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let book = sqlx::query_as::<_, Book>(&format!("{SELECT_BOOKS} WHERE b.book_id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(book.map(Into::into))
    }

    #[instrument(skip(self, filter), fields(order = ?filter.order), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let query = format!(
            "{SELECT_BOOKS} WHERE ($1 = FALSE OR b.quantity > 0) AND ($2::INTEGER IS NULL OR b.quantity < $2) ORDER BY {} LIMIT $3",
            filter.order.sql()
        );

        let books = sqlx::query_as::<_, Book>(&query)
            .bind(filter.in_stock_only)
            .bind(filter.quantity_below)
            .bind(filter.limit)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(books.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        sqlx::query_scalar::<_, BookId>(
            r#"
            UPDATE books SET
                isbn = $2, name = $3, cant_pages = $4, price = $5,
                description = $6, cover_url = $7, quantity = $8, author_id = $9
            WHERE book_id = $1
            RETURNING book_id
            "#,
        )
        .bind(id)
        .bind(&request.isbn)
        .bind(&request.name)
        .bind(request.cant_pages)
        .bind(request.price)
        .bind(&request.description)
        .bind(&request.cover_url)
        .bind(request.quantity)
        .bind(request.author_id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }
}

impl<'c> Books<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books").fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    /// Take `quantity` copies off the shelf.
    ///
    /// Only applies when enough copies are left; a shortfall is reported as a violation of
    /// `books_quantity_non_negative` and leaves the row untouched.
    #[instrument(skip(self), err)]
    pub async fn decrement_stock(&mut self, id: BookId, quantity: i32) -> Result<()> {
        let result = sqlx::query("UPDATE books SET quantity = quantity - $2 WHERE book_id = $1 AND quantity >= $2")
            .bind(id)
            .bind(quantity)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE book_id = $1)")
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?;
        if !exists {
            return Err(DbError::NotFound);
        }
        Err(DbError::CheckViolation {
            constraint: Some("books_quantity_non_negative".to_string()),
            table: Some("books".to_string()),
            message: format!("Not enough stock to take {quantity} copies of book {id}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_author, create_test_book};
    use sqlx::PgPool;

    fn book_request(isbn: &str, name: &str, author_id: AuthorId, quantity: i32) -> BookDBRequest {
        BookDBRequest {
            isbn: isbn.to_string(),
            name: name.to_string(),
            cant_pages: Some(320),
            price: Decimal::new(1999, 2),
            description: None,
            cover_url: None,
            quantity,
            author_id,
        }
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_create_book_joins_author(pool: PgPool) {
        let author = create_test_author(&pool, "Ursula K. Le Guin").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Books::new(&mut conn);
        let book = repo.create(&book_request("9780441478125", "The Left Hand of Darkness", author.id, 3)).await.unwrap();

        assert_eq!(book.author_name, "Ursula K. Le Guin");
        assert_eq!(book.price, Decimal::new(1999, 2));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_duplicate_isbn_and_unknown_author(pool: PgPool) {
        let author = create_test_author(&pool, "Author").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Books::new(&mut conn);
        repo.create(&book_request("1111111111111", "One", author.id, 1)).await.unwrap();

        let dup = repo.create(&book_request("1111111111111", "Two", author.id, 1)).await.unwrap_err();
        assert!(matches!(dup, DbError::UniqueViolation { .. }));

        let orphan = repo.create(&book_request("2222222222222", "Three", author.id + 99, 1)).await.unwrap_err();
        assert!(matches!(orphan, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_list_filters_and_orders(pool: PgPool) {
        let author = create_test_author(&pool, "Author").await;
        create_test_book(&pool, author.id, "Zebra Tales", 0, Decimal::ONE).await;
        create_test_book(&pool, author.id, "Apple Stories", 2, Decimal::ONE).await;
        create_test_book(&pool, author.id, "Middle Book", 9, Decimal::ONE).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Books::new(&mut conn);

        let in_stock = repo.list(&BookFilter::new().in_stock()).await.unwrap();
        let names: Vec<_> = in_stock.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Apple Stories", "Middle Book"]);

        let low = repo.list(&BookFilter::new().quantity_below(5).order_by(BookOrder::Quantity)).await.unwrap();
        let quantities: Vec<_> = low.iter().map(|b| b.quantity).collect();
        assert_eq!(quantities, vec![0, 2]);

        let newest = repo.list(&BookFilter::new().order_by(BookOrder::Newest).limit(1)).await.unwrap();
        assert_eq!(newest.len(), 1);
        assert_eq!(newest[0].name, "Middle Book");
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_update_replaces_row(pool: PgPool) {
        let author = create_test_author(&pool, "Author").await;
        let book = create_test_book(&pool, author.id, "Draft", 1, Decimal::ONE).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Books::new(&mut conn);

        let mut request = book_request("9999999999999", "Final", author.id, 7);
        request.description = Some("Revised".to_string());
        let updated = repo.update(book.id, &request).await.unwrap();

        assert_eq!(updated.name, "Final");
        assert_eq!(updated.quantity, 7);
        assert_eq!(updated.description.as_deref(), Some("Revised"));

        let missing = repo.update(book.id + 100, &request).await;
        assert!(matches!(missing, Err(DbError::NotFound)));
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_decrement_stock_cannot_go_negative(pool: PgPool) {
        let author = create_test_author(&pool, "Author").await;
        let book = create_test_book(&pool, author.id, "Scarce", 2, Decimal::ONE).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Books::new(&mut conn);

        repo.decrement_stock(book.id, 2).await.unwrap();
        assert_eq!(repo.get_by_id(book.id).await.unwrap().unwrap().quantity, 0);

        let err = repo.decrement_stock(book.id, 1).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));

        let restocked = create_test_book(&pool, author.id, "Restocked", 1, Decimal::ONE).await;
        let mut repo = Books::new(&mut conn);
        let err = repo.decrement_stock(restocked.id, 2).await.unwrap_err();
        match err {
            DbError::CheckViolation { constraint, message, .. } => {
                assert_eq!(constraint.as_deref(), Some("books_quantity_non_negative"));
                assert!(message.contains("2 copies"), "{message}");
            }
            other => panic!("expected a stock shortfall, got {other:?}"),
        }
        assert_eq!(repo.get_by_id(restocked.id).await.unwrap().unwrap().quantity, 1);

        assert!(matches!(repo.decrement_stock(book.id + 100, 1).await, Err(DbError::NotFound)));
    }
}
