//! Database repository for authors.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::authors::{AuthorCreateDBRequest, AuthorDBResponse, AuthorUpdateDBRequest},
};
use crate::types::AuthorId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Authors are always listed alphabetically; the filter only bounds the page.
#[derive(Debug, Clone, Default)]
pub struct AuthorFilter {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
struct Author {
    pub author_id: AuthorId,
    pub name: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Author> for AuthorDBResponse {
    fn from(author: Author) -> Self {
        Self {
            id: author.author_id,
            name: author.name,
            age: author.age,
            created_at: author.created_at,
        }
    }
}

pub struct Authors<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Authors<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Authors<'c> {
    type CreateRequest = AuthorCreateDBRequest;
    type UpdateRequest = AuthorUpdateDBRequest;
    type Response = AuthorDBResponse;
    type Id = AuthorId;
    type Filter = AuthorFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let author = sqlx::query_as::<_, Author>("INSERT INTO authors (name, age) VALUES ($1, $2) RETURNING *")
            .bind(&request.name)
            .bind(request.age)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(author.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE author_id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(author.map(Into::into))
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        // LIMIT NULL means no limit
        let authors = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY name, author_id LIMIT $1")
            .bind(filter.limit)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(authors.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE author_id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let author = sqlx::query_as::<_, Author>(
            "UPDATE authors SET name = COALESCE($2, name), age = COALESCE($3, age) WHERE author_id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.age)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(author.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_authors_listed_by_name(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Authors::new(&mut conn);

        for (name, age) in [("Jane Austen", 41), ("George Orwell", 46), ("Agatha Christie", 85)] {
            repo.create(&AuthorCreateDBRequest {
                name: name.to_string(),
                age,
            })
            .await
            .unwrap();
        }

        let authors = repo.list(&AuthorFilter::default()).await.unwrap();
        let names: Vec<_> = authors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Agatha Christie", "George Orwell", "Jane Austen"]);

        let first = repo.list(&AuthorFilter { limit: Some(1) }).await.unwrap();
        assert_eq!(first.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_negative_age_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Authors::new(&mut conn);

        let err = repo
            .create(&AuthorCreateDBRequest {
                name: "Nobody".to_string(),
                age: -1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_update_and_delete_author(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Authors::new(&mut conn);

        let author = repo
            .create(&AuthorCreateDBRequest {
                name: "Mark Twain".to_string(),
                age: 74,
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                author.id,
                &AuthorUpdateDBRequest {
                    age: Some(75),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Mark Twain");
        assert_eq!(updated.age, 75);

        assert!(repo.delete(author.id).await.unwrap());
        assert!(repo.get_by_id(author.id).await.unwrap().is_none());
    }
}
