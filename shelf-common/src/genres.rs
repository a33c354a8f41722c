//! Genre taxonomy
//!
//! Static table mapping canonical genre labels to the search catalog's
//! subject tags and, where one exists, the curated bestseller list carrying
//! that genre. Declaration order is resolution order: the first entry whose
//! tag set matches a category wins.

use serde::Serialize;

/// Subject prefix the search catalog accepts (and sometimes echoes back)
pub const SUBJECT_PREFIX: &str = "subject:";

/// One canonical genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreEntry {
    pub key: &'static str,
    pub label: &'static str,
    /// Curated list name, when the list provider covers this genre
    pub external_list_name: Option<&'static str>,
    /// Lowercase subject tags, without the subject prefix
    pub canonical_subject_tags: &'static [&'static str],
}

impl GenreEntry {
    /// Search-catalog query for this genre (`subject:<first tag>`)
    pub fn subject_query(&self) -> String {
        let tag = self
            .canonical_subject_tags
            .first()
            .copied()
            .unwrap_or(self.key);
        format!("{SUBJECT_PREFIX}{tag}")
    }

    fn matches(&self, cleaned_category: &str) -> bool {
        self.canonical_subject_tags
            .iter()
            .any(|tag| *tag == cleaned_category)
    }
}

/// Canonical genre table, in resolution order
pub static TAXONOMY: &[GenreEntry] = &[
    GenreEntry {
        key: "fiction",
        label: "Fiction",
        external_list_name: Some("hardcover-fiction"),
        canonical_subject_tags: &["fiction", "novel"],
    },
    GenreEntry {
        key: "nonfiction",
        label: "Non Fiction",
        external_list_name: Some("hardcover-nonfiction"),
        canonical_subject_tags: &["nonfiction", "biography", "history"],
    },
    GenreEntry {
        key: "business",
        label: "Business",
        external_list_name: Some("business-books"),
        canonical_subject_tags: &["business", "economy", "leadership", "management"],
    },
    GenreEntry {
        key: "manga",
        label: "Manga",
        external_list_name: Some("graphic-books-and-manga"),
        canonical_subject_tags: &["manga", "graphic", "comics", "anime"],
    },
    GenreEntry {
        key: "ya",
        label: "Young Adult",
        external_list_name: Some("young-adult-hardcover"),
        canonical_subject_tags: &["young", "teen"],
    },
    GenreEntry {
        key: "advice",
        label: "Advice & Self Help",
        external_list_name: Some("advice-how-to-and-miscellaneous"),
        canonical_subject_tags: &["help", "personal", "motivation", "psychology", "relationships"],
    },
    GenreEntry {
        key: "combined",
        label: "Trending",
        external_list_name: Some("combined-print-and-e-book-fiction"),
        canonical_subject_tags: &["fiction"],
    },
    // Search catalog only
    GenreEntry {
        key: "fantasy",
        label: "Fantasy",
        external_list_name: None,
        canonical_subject_tags: &["fantasy", "epic", "magic"],
    },
    GenreEntry {
        key: "scifi",
        label: "Sci-Fi",
        external_list_name: None,
        canonical_subject_tags: &["scifi", "dystopian", "space", "cyberpunk"],
    },
    GenreEntry {
        key: "romance",
        label: "Romance",
        external_list_name: None,
        canonical_subject_tags: &["romance", "romantic", "love"],
    },
    GenreEntry {
        key: "thriller",
        label: "Thriller",
        external_list_name: None,
        canonical_subject_tags: &["thriller", "mystery", "crime", "suspense"],
    },
    GenreEntry {
        key: "horror",
        label: "Horror",
        external_list_name: None,
        canonical_subject_tags: &["horror", "gothic"],
    },
];

/// Lowercase, strip the subject prefix, trim
pub fn clean_category(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    lower
        .strip_prefix(SUBJECT_PREFIX)
        .unwrap_or(&lower)
        .trim()
        .to_string()
}

/// Resolve provider categories against an explicit table
///
/// First entry (in table order) matching any category wins. With no match the
/// first raw category is returned verbatim; with no categories, `None`.
pub fn resolve_label_in(table: &[GenreEntry], categories: &[String]) -> Option<String> {
    let cleaned: Vec<String> = categories.iter().map(|c| clean_category(c)).collect();

    table
        .iter()
        .find(|entry| cleaned.iter().any(|c| entry.matches(c)))
        .map(|entry| entry.label.to_string())
        .or_else(|| categories.first().cloned())
}

/// Resolve provider categories against [`TAXONOMY`]
pub fn resolve_label(categories: &[String]) -> Option<String> {
    resolve_label_in(TAXONOMY, categories)
}

/// Entry by exact label
pub fn by_label(label: &str) -> Option<&'static GenreEntry> {
    TAXONOMY.iter().find(|entry| entry.label == label)
}

/// Entry owning a curated list
pub fn by_list_name(list_name: &str) -> Option<&'static GenreEntry> {
    TAXONOMY
        .iter()
        .find(|entry| entry.external_list_name == Some(list_name))
}
