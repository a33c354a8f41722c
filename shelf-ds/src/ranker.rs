//! Frequency ranker
//!
//! Orders the distinct values of one book attribute by how often they occur
//! in a library. Equal counts keep first-occurrence order.

use indexmap::IndexMap;
use shelf_common::Book;

/// Attribute a library is ranked by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Genre,
    Author,
}

impl Attribute {
    fn value<'a>(&self, book: &'a Book) -> Option<&'a str> {
        let raw = match self {
            Attribute::Genre => book.genre_label.as_deref(),
            Attribute::Author => book.author.as_deref(),
        };
        raw.map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Distinct attribute values, most frequent first
pub fn rank(records: &[Book], attribute: Attribute) -> Vec<String> {
    // Iterates in first-occurrence order
    let mut counts: IndexMap<&str, usize> = IndexMap::new();

    for value in records.iter().filter_map(|book| attribute.value(book)) {
        *counts.entry(value).or_insert(0) += 1;
    }

    // sort_by is stable: ties stay in first-occurrence order
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts.into_keys().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_genre(genre: Option<&str>) -> Book {
        let mut book = Book::titled("t");
        book.genre_label = genre.map(String::from);
        book
    }

    fn with_author(author: &str) -> Book {
        let mut book = Book::titled("t");
        book.author = Some(author.to_string());
        book
    }

    #[test]
    fn test_rank_by_count() {
        let records = vec![with_genre(Some("A")), with_genre(Some("B")), with_genre(Some("A"))];
        assert_eq!(rank(&records, Attribute::Genre), vec!["A", "B"]);
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let records = vec![
            with_genre(Some("C")),
            with_genre(Some("B")),
            with_genre(Some("A")),
            with_genre(Some("B")),
            with_genre(Some("A")),
        ];
        assert_eq!(rank(&records, Attribute::Genre), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_ignores_missing_and_blank() {
        let records = vec![
            with_genre(None),
            with_genre(Some("")),
            with_genre(Some("  ")),
            with_genre(Some("Horror")),
        ];
        assert_eq!(rank(&records, Attribute::Genre), vec!["Horror"]);
        assert!(rank(&[], Attribute::Genre).is_empty());
    }

    #[test]
    fn test_large_library_with_many_distinct_values() {
        // 5000 singleton authors, then one repeated author at the very end
        let mut records: Vec<Book> = (0..5000).map(|i| with_author(&format!("author-{}", i))).collect();
        records.push(with_author("author-4999"));

        let ranked = rank(&records, Attribute::Author);

        assert_eq!(ranked.len(), 5000);
        assert_eq!(ranked[0], "author-4999");
        assert_eq!(ranked[1], "author-0");
        assert_eq!(ranked[4999], "author-4998");
    }

    #[test]
    fn test_rank_authors() {
        let records = vec![
            with_author("Le Guin"),
            with_author("Banks"),
            with_author("Banks"),
            Book::titled("anonymous"),
        ];
        assert_eq!(rank(&records, Attribute::Author), vec!["Banks", "Le Guin"]);
    }
}
