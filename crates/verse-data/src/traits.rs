use tilawah_core::{ChapterMeta, Verse, VerseIdentity};

/// Source of chapter metadata and verse text
///
/// Loading never fails outward: a chapter whose text cannot be read yields an
/// empty list and the failure is logged.
pub trait VerseProvider: Send + Sync {
    /// Metadata for every chapter, in order
    fn chapter_list(&self) -> Vec<ChapterMeta>;

    /// Metadata for one chapter
    fn chapter(&self, id: u16) -> Option<ChapterMeta>;

    /// Verse text for one chapter, empty if unavailable
    fn chapter_verses(&self, id: u16) -> Vec<Verse>;

    /// Case-insensitive text search over Arabic and translation
    fn search(&self, query: &SearchQuery) -> Vec<SearchHit>;

    /// Number of verses in a chapter
    fn verse_count(&self, id: u16) -> Option<u16> {
        self.chapter(id).map(|meta| meta.verse_count)
    }

    /// A single verse, if its chapter text is available
    fn verse(&self, identity: VerseIdentity) -> Option<Verse> {
        self.chapter_verses(identity.chapter)
            .into_iter()
            .find(|v| v.identity == identity)
    }
}

/// Search query
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub chapter: Option<u16>,
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chapter: None,
            limit: 20,
        }
    }

    /// Restricts the search to one chapter
    pub fn in_chapter(mut self, chapter: u16) -> Self {
        self.chapter = Some(chapter);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Which text of the verse matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    /// The query was a `chapter:verse` reference
    Reference,
    Arabic,
    Translation,
}

/// Search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub verse: Verse,
    pub chapter_name: String,
    pub matched: MatchField,
}

#[cfg(test)]
mod trait_tests {
    use super::*;

    #[test]
    fn test_search_query_builder() {
        let query = SearchQuery::new("mercy").in_chapter(55).with_limit(5);

        assert_eq!(query.text, "mercy");
        assert_eq!(query.chapter, Some(55));
        assert_eq!(query.limit, 5);
    }

    #[test]
    fn test_search_query_default() {
        let query = SearchQuery::new("light");
        assert_eq!(query.limit, 20);
        assert_eq!(query.chapter, None);
    }
}
