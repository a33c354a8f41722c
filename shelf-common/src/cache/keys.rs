//! Cache key namespaces
//!
//! Every key is `<namespace>:<subject>`. Shared-entity subjects (author,
//! genre, list) are normalized so different spellings share one entry;
//! user ids are used as given.

use sha2::{Digest, Sha256};

pub const AUTHOR_RELEASES: &str = "author_releases";
pub const GENRE_BOOKS: &str = "genre_books";
pub const CURATED_LIST: &str = "curated_list";
pub const USER_AUTHORS: &str = "user_authors";
pub const RECOMMENDATIONS: &str = "recommendations";
pub const NEW_RELEASES: &str = "new_releases";
pub const LAST_RELEASES: &str = "last_releases";
pub const IMAGE: &str = "img_cache";

fn normalize(subject: &str) -> String {
    subject.trim().to_lowercase()
}

/// Long tier: an author's newest catalog entries
pub fn author_releases(author: &str) -> String {
    format!("{}:{}", AUTHOR_RELEASES, normalize(author))
}

/// Long tier: catalog entries for a genre
pub fn genre_books(genre: &str) -> String {
    format!("{}:{}", GENRE_BOOKS, normalize(genre))
}

/// Long tier: a curated list
pub fn curated_list(list_name: &str) -> String {
    format!("{}:{}", CURATED_LIST, normalize(list_name))
}

/// Short tier: a user's ranked authors and owned ids
pub fn user_authors(user_id: &str) -> String {
    format!("{}:{}", USER_AUTHORS, user_id)
}

/// Short tier: a user's merged recommendation set
pub fn recommendations(user_id: &str) -> String {
    format!("{}:{}", RECOMMENDATIONS, user_id)
}

/// Short tier: a user's new releases
pub fn new_releases(user_id: &str) -> String {
    format!("{}:{}", NEW_RELEASES, user_id)
}

/// Short tier: a user's per-author last releases
pub fn last_releases(user_id: &str) -> String {
    format!("{}:{}", LAST_RELEASES, user_id)
}

/// Image tier: thumbnail bytes, keyed by SHA-256 of the origin URL
pub fn image(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("{}:{:x}", IMAGE, digest)
}
