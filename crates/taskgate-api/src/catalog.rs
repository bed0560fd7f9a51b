//! In-memory book catalog

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i32,
}

/// Process-local book list; contents are lost on restart
#[derive(Debug, Default)]
pub struct BookCatalog {
    books: RwLock<Vec<Book>>,
}

impl BookCatalog {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books: RwLock::new(books),
        }
    }

    /// Catalog with the two starter entries
    pub fn seeded() -> Self {
        Self::new(vec![
            Book {
                id: 1,
                title: "GITA".to_string(),
                author: "MAHADEV".to_string(),
                year: 0,
            },
            Book {
                id: 2,
                title: "RAMAYANA".to_string(),
                author: "KRISHNA".to_string(),
                year: 0,
            },
        ])
    }

    pub fn list(&self) -> Vec<Book> {
        self.books.read().clone()
    }

    pub fn get(&self, id: i64) -> Option<Book> {
        self.books.read().iter().find(|b| b.id == id).cloned()
    }

    /// Append a book; returns false if the id is already taken
    pub fn insert(&self, book: Book) -> bool {
        let mut books = self.books.write();
        if books.iter().any(|b| b.id == book.id) {
            return false;
        }
        books.push(book);
        true
    }

    /// Replace the book stored under `id`; the id itself never changes
    pub fn update(&self, id: i64, mut book: Book) -> Option<Book> {
        let mut books = self.books.write();
        let slot = books.iter_mut().find(|b| b.id == id)?;
        book.id = id;
        *slot = book.clone();
        Some(book)
    }

    pub fn remove(&self, id: i64) -> Option<Book> {
        let mut books = self.books.write();
        let index = books.iter().position(|b| b.id == id)?;
        Some(books.remove(index))
    }
}
