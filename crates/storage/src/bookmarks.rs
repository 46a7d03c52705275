//! Bookmark accessor

use crate::document::{decode_all, encode, Filter};
use crate::error::{StoreError, StoreResult};
use crate::repository::{FallbackRepository, WriteOutcome, Written};
use std::sync::Arc;
use tilawah_core::{Bookmark, BookmarkId, Validator, VerseIdentity};

pub const BOOKMARKS: &str = "bookmarks";

/// Create, read, update and delete user bookmarks
pub struct BookmarkStore {
    repo: Arc<FallbackRepository>,
}

impl BookmarkStore {
    pub fn new(repo: Arc<FallbackRepository>) -> Self {
        Self { repo }
    }

    pub fn create(&self, identity: VerseIdentity, note: Option<String>) -> StoreResult<Written<Bookmark>> {
        let mut bookmark = Bookmark::new(identity);
        if let Some(note) = note {
            bookmark.set_note(note);
        }
        self.save(bookmark)
    }

    pub fn get(&self, id: BookmarkId) -> StoreResult<Option<Bookmark>> {
        let result = self
            .repo
            .query(BOOKMARKS, &Filter::equals("id", id.as_string()))?;
        Ok(decode_all(BOOKMARKS, &result.documents).into_iter().next())
    }

    /// Replaces the note; an empty note clears it
    pub fn update_note(&self, id: BookmarkId, note: impl Into<String>) -> StoreResult<Written<Bookmark>> {
        let mut bookmark = self.get(id)?.ok_or_else(|| StoreError::NotFound {
            collection: BOOKMARKS.to_string(),
            id: id.to_string(),
        })?;
        bookmark.set_note(note.into());
        self.save(bookmark)
    }

    pub fn delete(&self, id: BookmarkId) -> StoreResult<WriteOutcome> {
        self.repo.delete(BOOKMARKS, &id.as_string())
    }

    /// Every bookmark, ordered by verse then creation time
    pub fn list(&self) -> StoreResult<Vec<Bookmark>> {
        self.list_matching(&Filter::All)
    }

    pub fn list_for_chapter(&self, chapter: u16) -> StoreResult<Vec<Bookmark>> {
        self.list_matching(&Filter::equals("identity.chapter", chapter))
    }

    fn list_matching(&self, filter: &Filter) -> StoreResult<Vec<Bookmark>> {
        let result = self.repo.query(BOOKMARKS, filter)?;
        let mut bookmarks: Vec<Bookmark> = decode_all(BOOKMARKS, &result.documents);
        bookmarks.sort_by_key(|b| (b.identity, b.created_at));
        Ok(bookmarks)
    }

    fn save(&self, bookmark: Bookmark) -> StoreResult<Written<Bookmark>> {
        bookmark
            .validate()
            .map_err(|errors| StoreError::InvalidRecord(errors.join("; ")))?;

        let outcome = self
            .repo
            .write(BOOKMARKS, &bookmark.id.as_string(), encode(&bookmark)?)?;
        Ok(Written {
            record: bookmark,
            outcome,
        })
    }
}
