//! Freshness filter and deduplication
//!
//! Date strings come in whatever granularity the catalog had: a bare year,
//! a year-month, or a full date. Bare years use a coarse calendar rule: last
//! year still counts as fresh while the current zero-based month index is
//! below the window, which makes the cut-off jump at the year boundary.

use chrono::{DateTime, Datelike, Local, Months, NaiveDate};
use shelf_common::Book;
use std::collections::HashSet;

/// Is `date` within `window_months` of `today`?
pub fn is_fresh(date: &str, window_months: u32, today: NaiveDate) -> bool {
    let date = date.trim();

    if date.len() == 4 {
        let Ok(year) = date.parse::<i32>() else {
            return false;
        };
        let current_year = today.year();
        return year == current_year || (year == current_year - 1 && today.month0() < window_months);
    }

    let parsed = if date.len() == 7 {
        NaiveDate::parse_from_str(&format!("{}-01", date), "%Y-%m-%d").ok()
    } else {
        parse_full_date(date)
    };
    let Some(parsed) = parsed else {
        return false;
    };

    match today.checked_sub_months(Months::new(window_months)) {
        Some(threshold) => parsed >= threshold,
        None => true,
    }
}

fn parse_full_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(date).ok().map(|dt| dt.date_naive()))
}

/// Today's local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A record is fresh when its year is
pub fn is_fresh_book(book: &Book, window_months: u32, today: NaiveDate) -> bool {
    book.year
        .as_deref()
        .is_some_and(|year| is_fresh(year, window_months, today))
}

/// Keep the first record per catalog id; records without one always pass
pub fn dedupe(records: Vec<Book>) -> Vec<Book> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|book| match book.id() {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .collect()
}

/// Catalog ids present in a library
pub fn owned_ids(library: &[Book]) -> HashSet<String> {
    library
        .iter()
        .filter_map(|book| book.id().map(String::from))
        .collect()
}

/// Drop records whose catalog id the user already owns
pub fn exclude_owned(records: Vec<Book>, owned: &HashSet<String>) -> Vec<Book> {
    records
        .into_iter()
        .filter(|book| book.id().map_or(true, |id| !owned.contains(id)))
        .collect()
}
