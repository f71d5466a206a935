//! Sample catalogs for a fresh install.
//!
//! The storefront gets 15 authors and 26 books; the bazar catalog service gets 5 textbooks.
//! Both are written through the regular repositories so they pick up the same constraints as
//! rows created over the API.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::{info, instrument};

use crate::db::{
    errors::{DbError, Result},
    handlers::{Authors, Books, CatalogBooks, Repository},
    models::{authors::AuthorCreateDBRequest, books::BookDBRequest, catalog_books::CatalogBookCreateDBRequest},
};

pub struct SampleAuthor {
    pub name: &'static str,
    pub age: i32,
}

pub struct SampleBook {
    pub isbn: &'static str,
    pub title: &'static str,
    pub pages: i32,
    pub price_cents: i64,
    pub author: &'static str,
    pub cover_url: &'static str,
    pub description: &'static str,
    pub quantity: i32,
}

pub struct SampleCatalogBook {
    pub title: &'static str,
    pub author: &'static str,
    pub price_cents: i64,
    pub quantity: i32,
    pub topic: &'static str,
    pub description: &'static str,
}

/// What a populate run inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleDataSummary {
    pub authors: usize,
    pub books: usize,
}

pub const SAMPLE_AUTHORS: &[SampleAuthor] = &[
    SampleAuthor { name: "J.K. Rowling", age: 56 },
    SampleAuthor { name: "George Orwell", age: 46 },
    SampleAuthor { name: "Jane Austen", age: 41 },
    SampleAuthor { name: "Stephen King", age: 74 },
    SampleAuthor { name: "Agatha Christie", age: 85 },
    SampleAuthor { name: "J.R.R. Tolkien", age: 81 },
    SampleAuthor { name: "Dan Brown", age: 57 },
    SampleAuthor { name: "Harper Lee", age: 89 },
    SampleAuthor { name: "F. Scott Fitzgerald", age: 44 },
    SampleAuthor { name: "Ernest Hemingway", age: 61 },
    SampleAuthor { name: "Mark Twain", age: 74 },
    SampleAuthor { name: "Charles Dickens", age: 58 },
    SampleAuthor { name: "Leo Tolstoy", age: 82 },
    SampleAuthor { name: "Gabriel García Márquez", age: 87 },
    SampleAuthor { name: "Virginia Woolf", age: 59 },
];

macro_rules! book {
    ($isbn:literal, $title:literal, $pages:literal, $cents:literal, $author:literal, $cover:literal, $desc:literal, $qty:literal) => {
        SampleBook {
            isbn: $isbn,
            title: $title,
            pages: $pages,
            price_cents: $cents,
            author: $author,
            cover_url: $cover,
            description: $desc,
            quantity: $qty,
        }
    };
}

pub const SAMPLE_BOOKS: &[SampleBook] = &[
    book!("9780747532743", "Harry Potter and the Philosopher's Stone", 223, 1999, "J.K. Rowling",
        "https://m.media-amazon.com/images/I/81m1s4wIPML._AC_UF1000,1000_QL80_.jpg", "The first book in the Harry Potter series", 50),
    book!("9780747538486", "Harry Potter and the Chamber of Secrets", 251, 1999, "J.K. Rowling",
        "https://m.media-amazon.com/images/I/91OINeHnJGL._AC_UF1000,1000_QL80_.jpg", "The second book in the Harry Potter series", 45),
    book!("9780747546290", "Harry Potter and the Prisoner of Azkaban", 317, 1999, "J.K. Rowling",
        "https://m.media-amazon.com/images/I/81lAPl9Fl0L._AC_UF1000,1000_QL80_.jpg", "The third book in the Harry Potter series", 40),
    book!("9780747551003", "Harry Potter and the Goblet of Fire", 636, 2499, "J.K. Rowling",
        "https://m.media-amazon.com/images/I/81t2CVWEsUL._AC_UF1000,1000_QL80_.jpg", "The fourth book in the Harry Potter series", 35),
    book!("9780747570738", "Harry Potter and the Order of Phoenix", 766, 2499, "J.K. Rowling",
        "https://m.media-amazon.com/images/I/71xcuT33RpL._AC_UF1000,1000_QL80_.jpg", "The fifth book in the Harry Potter series", 30),
    book!("9780747581086", "Harry Potter and the Half-Blood Prince", 607, 2499, "J.K. Rowling",
        "https://m.media-amazon.com/images/I/61sXBXmAWML._AC_UF1000,1000_QL80_.jpg", "The sixth book in the Harry Potter series", 25),
    book!("9780545010221", "Harry Potter and the Deathly Hallows", 607, 2499, "J.K. Rowling",
        "https://m.media-amazon.com/images/I/71sH3vxziLL._AC_UF1000,1000_QL80_.jpg", "The seventh book in the Harry Potter series", 20),
    book!("9780451524935", "1984", 328, 1299, "George Orwell",
        "https://m.media-amazon.com/images/I/71kxa1-0mfL._AC_UF1000,1000_QL80_.jpg", "A dystopian novel by George Orwell", 30),
    book!("9780452284241", "Animal Farm", 140, 999, "George Orwell",
        "https://m.media-amazon.com/images/I/71KV-OBJVsL._AC_UF1000,1000_QL80_.jpg", "An allegorical novella by George Orwell", 25),
    book!("9780141439518", "Pride and Prejudice", 432, 999, "Jane Austen",
        "https://m.media-amazon.com/images/I/71Q1tPupKjL._AC_UF1000,1000_QL80_.jpg", "A romantic novel by Jane Austen", 25),
    book!("9780141439662", "Sense and Sensibility", 409, 999, "Jane Austen",
        "https://m.media-amazon.com/images/I/71HTLQ-dJJL._AC_UF1000,1000_QL80_.jpg", "A novel by Jane Austen", 20),
    book!("9781501142970", "It", 1138, 2499, "Stephen King",
        "https://m.media-amazon.com/images/I/71tFhdcC0XL._AC_UF1000,1000_QL80_.jpg", "A horror novel about a shape-shifting entity", 20),
    book!("9781501156700", "The Shining", 447, 1799, "Stephen King",
        "https://m.media-amazon.com/images/I/81w6RyQT-TL._AC_UF1000,1000_QL80_.jpg", "A horror novel set in an isolated hotel", 15),
    book!("9780062073488", "Murder on the Orient Express", 256, 1499, "Agatha Christie",
        "https://m.media-amazon.com/images/I/81yY5OwUQOL._AC_UF1000,1000_QL80_.jpg", "A detective novel featuring Hercule Poirot", 15),
    book!("9780062073563", "And Then There Were None", 272, 1499, "Agatha Christie",
        "https://m.media-amazon.com/images/I/81B9LhCS2AL._AC_UF1000,1000_QL80_.jpg", "A mystery novel by Agatha Christie", 10),
    book!("9780618640157", "The Lord of the Rings", 1178, 2999, "J.R.R. Tolkien",
        "https://m.media-amazon.com/images/I/71jLBXtWJWL._AC_UF1000,1000_QL80_.jpg", "An epic high-fantasy novel", 20),
    book!("9780547928227", "The Hobbit", 300, 1499, "J.R.R. Tolkien",
        "https://m.media-amazon.com/images/I/710+HcoP38L._AC_UF1000,1000_QL80_.jpg", "A fantasy novel and prequel to The Lord of the Rings", 25),
    book!("9780307474278", "The Da Vinci Code", 597, 1699, "Dan Brown",
        "https://m.media-amazon.com/images/I/81c5QZzP8aL._AC_UF1000,1000_QL80_.jpg", "A mystery thriller novel", 30),
    book!("9780060935467", "To Kill a Mockingbird", 336, 1499, "Harper Lee",
        "https://m.media-amazon.com/images/I/71FxgtFKcQL._AC_UF1000,1000_QL80_.jpg", "A novel about racial inequality in the American South", 35),
    book!("9780743273565", "The Great Gatsby", 180, 1299, "F. Scott Fitzgerald",
        "https://m.media-amazon.com/images/I/71FTb9X6wsL._AC_UF1000,1000_QL80_.jpg", "A novel about the American Dream in the 1920s", 25),
    book!("9780684801223", "The Old Man and the Sea", 128, 1199, "Ernest Hemingway",
        "https://m.media-amazon.com/images/I/61Ui-IgfvdL._AC_UF1000,1000_QL80_.jpg", "A short novel about an aging Cuban fisherman", 20),
    book!("9780486280615", "The Adventures of Huckleberry Finn", 224, 599, "Mark Twain",
        "https://m.media-amazon.com/images/I/81wdR+2vBwL._AC_UF1000,1000_QL80_.jpg", "A novel about a boy's journey down the Mississippi River", 15),
    book!("9780141439563", "A Tale of Two Cities", 489, 899, "Charles Dickens",
        "https://m.media-amazon.com/images/I/51rVPckPtuL._AC_UF1000,1000_QL80_.jpg", "A historical novel set during the French Revolution", 10),
    book!("9780143035008", "Anna Karenina", 864, 1699, "Leo Tolstoy",
        "https://m.media-amazon.com/images/I/91F9WKW99NL._AC_UF1000,1000_QL80_.jpg", "A novel about an extramarital affair in Russian society", 15),
    book!("9780060883287", "One Hundred Years of Solitude", 417, 1599, "Gabriel García Márquez",
        "https://m.media-amazon.com/images/I/81MI6+TpYkL._AC_UF1000,1000_QL80_.jpg", "A landmark of magical realism", 20),
    book!("9780156030359", "To the Lighthouse", 209, 1399, "Virginia Woolf",
        "https://m.media-amazon.com/images/I/71c1ltgBXdL._AC_UF1000,1000_QL80_.jpg", "A modernist novel about the Ramsay family", 10),
];

pub const SAMPLE_CATALOG_BOOKS: &[SampleCatalogBook] = &[
    SampleCatalogBook {
        title: "Distributed Systems: Principles and Paradigms",
        author: "Andrew S. Tanenbaum",
        price_cents: 7999,
        quantity: 10,
        topic: "distributed systems",
        description: "This book covers the principles, advanced concepts, and technologies of distributed systems in detail, \
                      including communication, replication, fault tolerance, and security.",
    },
    SampleCatalogBook {
        title: "Database System Concepts",
        author: "Abraham Silberschatz",
        price_cents: 8999,
        quantity: 15,
        topic: "undergraduate school",
        description: "Database System Concepts provides a comprehensive introduction to database systems, covering database \
                      design, query languages, transaction processing, and more.",
    },
    SampleCatalogBook {
        title: "Computer Networks",
        author: "Andrew S. Tanenbaum",
        price_cents: 6999,
        quantity: 8,
        topic: "undergraduate school",
        description: "This classic textbook provides a comprehensive look at the architecture, principles, and technologies \
                      of computer networks, from the physical layer to the application layer.",
    },
    SampleCatalogBook {
        title: "Modern Operating Systems",
        author: "Andrew S. Tanenbaum",
        price_cents: 7499,
        quantity: 12,
        topic: "undergraduate school",
        description: "A comprehensive guide to operating systems, covering processes, memory management, file systems, and \
                      distributed systems.",
    },
    SampleCatalogBook {
        title: "Designing Data-Intensive Applications",
        author: "Martin Kleppmann",
        price_cents: 5999,
        quantity: 20,
        topic: "distributed systems",
        description: "This book examines the key principles, algorithms, and trade-offs of data systems, with a focus on the \
                      challenges of scalability, consistency, reliability, and maintainability.",
    },
];

/// Replace the storefront catalog with the sample one.
///
/// Orders, favorites and carts are cleared too, since they reference books that are about to
/// disappear. Call this on a transaction so a failure leaves the old data in place.
#[instrument(skip(conn), err)]
pub async fn populate_sample_data(conn: &mut PgConnection) -> Result<SampleDataSummary> {
    for table in ["order_items", "orders", "favorites", "cart_items", "books", "authors"] {
        sqlx::query(&format!("DELETE FROM {table}")).execute(&mut *conn).await?;
    }

    let mut author_ids = HashMap::with_capacity(SAMPLE_AUTHORS.len());
    for author in SAMPLE_AUTHORS {
        let created = Authors::new(&mut *conn)
            .create(&AuthorCreateDBRequest {
                name: author.name.to_string(),
                age: author.age,
            })
            .await?;
        author_ids.insert(author.name, created.id);
    }

    for book in SAMPLE_BOOKS {
        let author_id = *author_ids.get(book.author).ok_or(DbError::NotFound)?;
        Books::new(&mut *conn)
            .create(&BookDBRequest {
                isbn: book.isbn.to_string(),
                name: book.title.to_string(),
                cant_pages: Some(book.pages),
                price: Decimal::new(book.price_cents, 2),
                description: Some(book.description.to_string()),
                cover_url: Some(book.cover_url.to_string()),
                quantity: book.quantity,
                author_id,
            })
            .await?;
    }

    Ok(SampleDataSummary {
        authors: SAMPLE_AUTHORS.len(),
        books: SAMPLE_BOOKS.len(),
    })
}

/// Populate the storefront only when it has no books at all
#[instrument(skip(conn), err)]
pub async fn seed_storefront_if_empty(conn: &mut PgConnection) -> Result<Option<SampleDataSummary>> {
    if Books::new(&mut *conn).count().await? > 0 {
        return Ok(None);
    }
    let summary = populate_sample_data(conn).await?;
    info!(authors = summary.authors, books = summary.books, "Seeded storefront sample catalog");
    Ok(Some(summary))
}

/// Stock the bazar catalog with the sample textbooks when its table is empty.
///
/// Ids come from the sequence, so books added later over `/add-stock` never collide.
#[instrument(skip(conn), err)]
pub async fn seed_catalog_if_empty(conn: &mut PgConnection) -> Result<usize> {
    let mut books = CatalogBooks::new(conn);
    if books.count().await? > 0 {
        return Ok(0);
    }

    for book in SAMPLE_CATALOG_BOOKS {
        books
            .create(&CatalogBookCreateDBRequest {
                title: book.title.to_string(),
                author: book.author.to_string(),
                price: Decimal::new(book.price_cents, 2),
                quantity: book.quantity,
                topic: book.topic.to_string(),
                description: book.description.to_string(),
            })
            .await?;
    }
    info!(books = SAMPLE_CATALOG_BOOKS.len(), "Seeded catalog service sample books");
    Ok(SAMPLE_CATALOG_BOOKS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::catalog_books::CatalogBookFilter;
    use crate::test_utils::{create_test_author, create_test_book};
    use sqlx::PgPool;

    #[test]
    fn test_every_sample_book_has_a_known_author() {
        for book in SAMPLE_BOOKS {
            assert!(
                SAMPLE_AUTHORS.iter().any(|a| a.name == book.author),
                "{} has no sample author",
                book.title
            );
            assert!(book.isbn.len() <= 13);
        }
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_populate_is_repeatable(pool: PgPool) {
        let mut tx = pool.begin().await.unwrap();
        let first = populate_sample_data(&mut tx).await.unwrap();
        let second = populate_sample_data(&mut tx).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(first, second);

        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books").fetch_one(&pool).await.unwrap();
        let authors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors").fetch_one(&pool).await.unwrap();
        assert_eq!(books, 26);
        assert_eq!(authors, 15);

        let hobbit_price: Decimal = sqlx::query_scalar("SELECT price FROM books WHERE name = 'The Hobbit'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(hobbit_price, Decimal::new(1499, 2));
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    async fn test_seed_skips_populated_store(pool: PgPool) {
        let author = create_test_author(&pool, "Existing").await;
        create_test_book(&pool, author.id, "Existing Book", 1, Decimal::ONE).await;

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(seed_storefront_if_empty(&mut conn).await.unwrap(), None);
        assert_eq!(Books::new(&mut conn).count().await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "./migrations/bazar")]
    async fn test_catalog_seed_once(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(seed_catalog_if_empty(&mut conn).await.unwrap(), 5);
        assert_eq!(seed_catalog_if_empty(&mut conn).await.unwrap(), 0);

        let distributed = CatalogBooks::new(&mut conn)
            .list(&CatalogBookFilter::search("distributed systems"))
            .await
            .unwrap();
        assert_eq!(distributed.len(), 2);
    }
}
