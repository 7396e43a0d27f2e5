//! 도서 저장소.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bookshelf_core::{Book, NewBook};
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::RepositoryResult;

/// 도서 레코드 저장소.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// 전체 목록 (id 오름차순).
    async fn list(&self) -> RepositoryResult<Vec<Book>>;

    /// id로 조회.
    async fn get(&self, id: i64) -> RepositoryResult<Option<Book>>;

    /// 도서 생성.
    async fn create(&self, new_book: NewBook) -> RepositoryResult<Book>;
}

/// PostgreSQL 도서 저장소.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn list(&self) -> RepositoryResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, author, title, publisher FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, author, title, publisher FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    async fn create(&self, new_book: NewBook) -> RepositoryResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (author, title, publisher)
            VALUES ($1, $2, $3)
            RETURNING id, author, title, publisher
            "#,
        )
        .bind(new_book.author)
        .bind(new_book.title)
        .bind(new_book.publisher)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }
}

/// 인메모리 도서 저장소.
#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<BTreeMap<i64, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn list(&self) -> RepositoryResult<Vec<Book>> {
        Ok(self.books.read().await.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Book>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn create(&self, new_book: NewBook) -> RepositoryResult<Book> {
        let mut books = self.books.write().await;
        let id = books.keys().next_back().copied().unwrap_or(0) + 1;

        let book = Book {
            id,
            author: new_book.author,
            title: new_book.title,
            publisher: new_book.publisher,
        };
        books.insert(id, book.clone());

        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_list_get() {
        let store = MemoryBookStore::new();
        let dune = store
            .create(NewBook {
                title: Some("Dune".to_string()),
                author: Some("Frank Herbert".to_string()),
                publisher: None,
            })
            .await
            .unwrap();
        let second = store.create(NewBook::default()).await.unwrap();

        assert_eq!(dune.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.list().await.unwrap(), vec![dune.clone(), second]);
        assert_eq!(store.get(1).await.unwrap(), Some(dune));
        assert_eq!(store.get(99).await.unwrap(), None);
    }
}
