//! In-process library and catalog fakes
//!
//! The catalog answers every search with `per_query` generated books unless
//! a query has an explicit response or is marked as failing. Generated ids
//! are `<query>#<n>`, so merged results show which branch they came from.

#![allow(dead_code)]

use async_trait::async_trait;
use shelf_common::{Book, Error, Result, SearchQuery};
use shelf_ds::sources::{CatalogSource, LibrarySource};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn book(id: &str, title: &str) -> Book {
    let mut book = Book::titled(title);
    book.catalog_id = Some(id.to_string());
    book
}

pub fn owned(id: &str, author: &str, genre: &str) -> Book {
    let mut book = book(id, &format!("{} by {}", id, author));
    book.author = Some(author.to_string());
    book.genre_label = Some(genre.to_string());
    book
}

pub fn dated(id: &str, year: &str) -> Book {
    let mut book = book(id, id);
    book.year = Some(year.to_string());
    book
}

#[derive(Default)]
pub struct FakeLibrary {
    pub libraries: Mutex<HashMap<String, Vec<Book>>>,
    pub failing: bool,
    pub calls: AtomicUsize,
}

impl FakeLibrary {
    pub fn with(user_id: &str, books: Vec<Book>) -> Self {
        let library = Self::default();
        library
            .libraries
            .lock()
            .unwrap()
            .insert(user_id.to_string(), books);
        library
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LibrarySource for FakeLibrary {
    async fn load_library(&self, user_id: &str) -> Result<Vec<Book>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(Error::Upstream {
                source_name: "library".to_string(),
                status: Some(502),
                message: "library store down".to_string(),
            });
        }
        Ok(self
            .libraries
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

pub struct FakeCatalog {
    pub per_query: usize,
    /// Year given to generated books
    pub year: String,
    pub responses: Mutex<HashMap<String, Vec<Book>>>,
    pub failing: HashSet<String>,
    pub searches: Mutex<Vec<SearchQuery>>,
    pub lists: Mutex<Vec<String>>,
}

impl Default for FakeCatalog {
    fn default() -> Self {
        Self {
            per_query: 20,
            year: "2024".to_string(),
            responses: Mutex::new(HashMap::new()),
            failing: HashSet::new(),
            searches: Mutex::new(Vec::new()),
            lists: Mutex::new(Vec::new()),
        }
    }
}

impl FakeCatalog {
    pub fn respond(self, query: &str, books: Vec<Book>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(query.to_string(), books);
        self
    }

    pub fn fail(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    pub fn list_names(&self) -> Vec<String> {
        self.lists.lock().unwrap().clone()
    }

    fn generate(&self, key: &str) -> Vec<Book> {
        (0..self.per_query)
            .map(|n| dated(&format!("{}#{}", key, n), &self.year))
            .collect()
    }

    fn answer(&self, key: &str) -> Result<Vec<Book>> {
        if self.failing.contains(key) {
            return Err(Error::upstream("catalog", format!("{} failed", key)));
        }
        if let Some(books) = self.responses.lock().unwrap().get(key) {
            return Ok(books.clone());
        }
        Ok(self.generate(key))
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>> {
        self.searches.lock().unwrap().push(query.clone());
        self.answer(&query.q)
    }

    async fn curated_list(&self, list_name: &str) -> Result<Vec<Book>> {
        self.lists.lock().unwrap().push(list_name.to_string());
        self.answer(list_name)
    }
}
