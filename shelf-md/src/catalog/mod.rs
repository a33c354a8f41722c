//! Bibliographic source adapters
//!
//! Turn provider payloads into [`Book`](shelf_common::Book) records. Each
//! adapter owns one [`ByteSource`](shelf_common::ByteSource), so every call
//! to a provider shares that provider's rate limits.

pub mod google_books;
pub mod nyt_lists;

pub use google_books::GoogleBooksClient;
pub use nyt_lists::NytListsClient;

/// Upgrade `http://` links to `https://`
pub fn secure_url(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

/// Year from a provider date: the leading `-`-separated part, if it is
/// exactly four ASCII digits
pub fn year_from_date(date: &str) -> Option<String> {
    let year = date.trim().split('-').next()?;
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        Some(year.to_string())
    } else {
        None
    }
}

/// Trimmed, non-empty string
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_url() {
        assert_eq!(secure_url("http://books.example/t.jpg"), "https://books.example/t.jpg");
        assert_eq!(secure_url("https://books.example/t.jpg"), "https://books.example/t.jpg");
    }

    #[test]
    fn test_year_from_date() {
        assert_eq!(year_from_date("2023-05-14").as_deref(), Some("2023"));
        assert_eq!(year_from_date("1999").as_deref(), Some("1999"));
        assert_eq!(year_from_date("2023-05").as_deref(), Some("2023"));
        assert_eq!(year_from_date("May 2023"), None);
        assert_eq!(year_from_date("202"), None);
        assert_eq!(year_from_date(""), None);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ".into())).as_deref(), Some("x"));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
