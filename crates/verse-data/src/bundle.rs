//! Verse text read from a directory of per-chapter JSON files
//!
//! Each chapter lives in `<bundle_dir>/<chapter>.json`:
//!
//! ```json
//! { "chapter": 1, "verses": [ { "verse": 1, "arabic": "...", "translation": "..." } ] }
//! ```
//!
//! Chapter metadata always comes from the built-in table, so browsing works
//! even when the bundle is missing.

use crate::chapters;
use crate::error::{VerseDataError, VerseDataResult};
use crate::traits::{MatchField, SearchHit, SearchQuery, VerseProvider};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tilawah_core::{ChapterMeta, Verse, VerseIdentity, CHAPTER_COUNT};

/// On-disk form of one chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleChapter {
    pub chapter: u16,
    pub verses: Vec<BundleVerse>,
}

/// On-disk form of one verse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleVerse {
    pub verse: u16,
    pub arabic: String,
    #[serde(default)]
    pub translation: String,
}

/// Verse provider backed by a bundle directory
pub struct BundledVerseProvider {
    bundle_dir: PathBuf,
    cache: RwLock<HashMap<u16, Arc<Vec<Verse>>>>,
}

impl BundledVerseProvider {
    pub fn new(bundle_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundle_dir: bundle_dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn bundle_dir(&self) -> &Path {
        &self.bundle_dir
    }

    /// Path of the file holding chapter `id`
    pub fn chapter_path(&self, id: u16) -> PathBuf {
        self.bundle_dir.join(format!("{}.json", id))
    }

    /// True if the bundle directory exists
    pub fn is_available(&self) -> bool {
        self.bundle_dir.is_dir()
    }

    /// Reads and checks one chapter file, bypassing the cache
    pub fn load_chapter(&self, id: u16) -> VerseDataResult<Vec<Verse>> {
        let count = chapters::verse_count(id).ok_or(VerseDataError::UnknownChapter(id))?;
        let path = self.chapter_path(id);

        if !path.exists() {
            return Err(VerseDataError::BundleMissing { path });
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| VerseDataError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed: BundleChapter = serde_json::from_str(&contents)
            .map_err(|source| VerseDataError::Malformed { path, source })?;

        if parsed.chapter != id {
            return Err(VerseDataError::Inconsistent {
                chapter: id,
                reason: format!("file declares chapter {}", parsed.chapter),
            });
        }

        let mut verses = Vec::with_capacity(parsed.verses.len());
        for v in parsed.verses {
            if v.verse == 0 || v.verse > count {
                return Err(VerseDataError::Inconsistent {
                    chapter: id,
                    reason: format!("verse {} outside 1..={}", v.verse, count),
                });
            }
            verses.push(Verse {
                identity: VerseIdentity::new_unchecked(id, v.verse),
                arabic: v.arabic,
                translation: v.translation,
            });
        }
        verses.sort_by_key(|v| v.identity);
        verses.dedup_by_key(|v| v.identity);

        Ok(verses)
    }

    fn cached_verses(&self, id: u16) -> Option<Arc<Vec<Verse>>> {
        if let Ok(cache) = self.cache.read() {
            if let Some(verses) = cache.get(&id) {
                return Some(Arc::clone(verses));
            }
        }

        match self.load_chapter(id) {
            Ok(verses) => {
                let verses = Arc::new(verses);
                if let Ok(mut cache) = self.cache.write() {
                    cache.insert(id, Arc::clone(&verses));
                }
                Some(verses)
            }
            Err(VerseDataError::UnknownChapter(_)) => None,
            Err(e) => {
                log::warn!("Verse text unavailable for chapter {}: {}", id, e);
                None
            }
        }
    }
}

impl VerseProvider for BundledVerseProvider {
    fn chapter_list(&self) -> Vec<ChapterMeta> {
        chapters::all_chapters()
    }

    fn chapter(&self, id: u16) -> Option<ChapterMeta> {
        chapters::chapter_meta(id)
    }

    fn chapter_verses(&self, id: u16) -> Vec<Verse> {
        self.cached_verses(id)
            .map(|verses| verses.as_ref().clone())
            .unwrap_or_default()
    }

    fn search(&self, query: &SearchQuery) -> Vec<SearchHit> {
        let needle = query.text.trim();
        if needle.is_empty() || query.limit == 0 {
            return Vec::new();
        }

        if let Ok(identity) = needle.parse::<VerseIdentity>() {
            return self
                .verse(identity)
                .into_iter()
                .map(|verse| SearchHit {
                    chapter_name: chapter_name(identity.chapter),
                    verse,
                    matched: MatchField::Reference,
                })
                .collect();
        }

        let needle = needle.to_lowercase();
        let ids: Vec<u16> = match query.chapter {
            Some(id) => vec![id],
            None => (1..=CHAPTER_COUNT).collect(),
        };

        let mut hits = Vec::new();
        for id in ids {
            let Some(verses) = self.cached_verses(id) else {
                continue;
            };

            for verse in verses.iter() {
                let matched = if verse.translation.to_lowercase().contains(&needle) {
                    MatchField::Translation
                } else if verse.arabic.contains(needle.as_str()) {
                    MatchField::Arabic
                } else {
                    continue;
                };

                hits.push(SearchHit {
                    verse: verse.clone(),
                    chapter_name: chapter_name(id),
                    matched,
                });

                if hits.len() >= query.limit {
                    return hits;
                }
            }
        }

        hits
    }
}

fn chapter_name(id: u16) -> String {
    chapters::chapter_meta(id)
        .map(|meta| meta.name)
        .unwrap_or_default()
}
