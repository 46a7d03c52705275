//! Tafseer (commentary) accessor

use crate::document::{decode_all, encode, Filter};
use crate::error::{StoreError, StoreResult};
use crate::repository::{FallbackRepository, WriteOutcome, Written};
use std::sync::Arc;
use tilawah_core::{Tafseer, Validator, VerseIdentity};

pub const TAFSEER: &str = "tafseer";

/// Commentary text keyed by verse
pub struct TafseerStore {
    repo: Arc<FallbackRepository>,
}

impl TafseerStore {
    pub fn new(repo: Arc<FallbackRepository>) -> Self {
        Self { repo }
    }

    pub fn get(&self, identity: VerseIdentity) -> StoreResult<Option<Tafseer>> {
        Ok(self
            .list_for_chapter(identity.chapter)?
            .into_iter()
            .find(|t| t.identity == identity))
    }

    /// Creates or replaces the commentary for a verse
    pub fn set(
        &self,
        identity: VerseIdentity,
        text: impl Into<String>,
        author: Option<String>,
    ) -> StoreResult<Written<Tafseer>> {
        let mut tafseer = Tafseer::new(identity, text.into().trim());
        tafseer.author = author.filter(|a| !a.trim().is_empty());

        tafseer
            .validate()
            .map_err(|errors| StoreError::InvalidRecord(errors.join("; ")))?;

        let outcome = self
            .repo
            .write(TAFSEER, &identity.document_key(), encode(&tafseer)?)?;
        Ok(Written {
            record: tafseer,
            outcome,
        })
    }

    pub fn delete(&self, identity: VerseIdentity) -> StoreResult<WriteOutcome> {
        self.repo.delete(TAFSEER, &identity.document_key())
    }

    pub fn list_for_chapter(&self, chapter: u16) -> StoreResult<Vec<Tafseer>> {
        let result = self
            .repo
            .query(TAFSEER, &Filter::equals("identity.chapter", chapter))?;
        let mut entries: Vec<Tafseer> = decode_all(TAFSEER, &result.documents);
        entries.sort_by_key(|t| t.identity);
        Ok(entries)
    }
}
