//! Remote-first repository with a local mirror
//!
//! Every mutation goes to the remote document store first. When the remote
//! cannot take it (offline or permission refused) the change is kept in the
//! local mirror only and the caller gets [`WriteOutcome::SavedLocally`].
//! Reads fall back to the mirror the same way.

use crate::breaker::RemoteBreaker;
use crate::document::{Document, DocumentChange, DocumentStore, ChangeKind, Fields, Filter, Subscription};
use crate::error::{StoreError, StoreResult};
use crate::local::{set_or_clear_namespace, LocalStorage};
use std::collections::BTreeMap;
use std::sync::Arc;
use tilawah_config::StorageConfig;

/// Prefix of every local storage key owned by the mirror
pub const MIRROR_NAMESPACE: &str = "tilawah.mirror.";

/// Result of a mutating call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Stored remotely and mirrored locally
    Saved,
    /// Remote store unreachable or refused; kept on this device only
    SavedLocally { warning: String },
    /// Nothing needed writing
    Unchanged,
}

impl WriteOutcome {
    pub fn is_local_only(&self) -> bool {
        matches!(self, WriteOutcome::SavedLocally { .. })
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            WriteOutcome::SavedLocally { warning } => Some(warning),
            _ => None,
        }
    }

    /// Folds the outcomes of a multi-document change; any local-only part wins
    pub fn combine(self, other: WriteOutcome) -> WriteOutcome {
        match (self, other) {
            (local @ WriteOutcome::SavedLocally { .. }, _) => local,
            (_, local @ WriteOutcome::SavedLocally { .. }) => local,
            (WriteOutcome::Unchanged, other) => other,
            (saved, _) => saved,
        }
    }
}

/// A record together with how it was persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Written<T> {
    pub record: T,
    pub outcome: WriteOutcome,
}

/// Where query results came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    LocalMirror,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub documents: Vec<Document>,
    pub source: DataSource,
}

enum Remote<T> {
    Done(T),
    Skipped(String),
}

type MirrorSnapshot = BTreeMap<String, Fields>;

/// Decorates a [`DocumentStore`] with a local mirror and a failure breaker
pub struct FallbackRepository {
    remote: Arc<dyn DocumentStore>,
    local: Arc<dyn LocalStorage>,
    breaker: RemoteBreaker,
}

impl FallbackRepository {
    pub fn new(remote: Arc<dyn DocumentStore>, local: Arc<dyn LocalStorage>) -> Self {
        Self::from_config(remote, local, &StorageConfig::default())
    }

    pub fn from_config(
        remote: Arc<dyn DocumentStore>,
        local: Arc<dyn LocalStorage>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            remote,
            local,
            breaker: RemoteBreaker::from_config(config),
        }
    }

    pub fn with_breaker(mut self, breaker: RemoteBreaker) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn breaker(&self) -> &RemoteBreaker {
        &self.breaker
    }

    pub fn local(&self) -> &Arc<dyn LocalStorage> {
        &self.local
    }

    /// Writes a document remotely, then mirrors it
    pub fn write(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<WriteOutcome> {
        let remote = self.try_remote("write", collection, |store| {
            store.write(collection, Some(id), fields.clone())
        })?;

        self.mirror_update(collection, |snapshot| {
            snapshot.insert(id.to_string(), fields);
        }, &remote)?;

        Ok(Self::outcome(remote))
    }

    /// Deletes a document remotely, then from the mirror
    pub fn delete(&self, collection: &str, id: &str) -> StoreResult<WriteOutcome> {
        let remote = self.try_remote("delete", collection, |store| store.delete(collection, id))?;

        self.mirror_update(collection, |snapshot| {
            snapshot.remove(id);
        }, &remote)?;

        Ok(Self::outcome(remote))
    }

    /// Queries the remote store, falling back to the mirror
    ///
    /// A successful unfiltered query replaces the mirror for the collection.
    pub fn query(&self, collection: &str, filter: &Filter) -> StoreResult<QueryResult> {
        match self.try_remote("query", collection, |store| store.query(collection, filter))? {
            Remote::Done(documents) => {
                let snapshot_update = |snapshot: &mut MirrorSnapshot| {
                    if *filter == Filter::All {
                        snapshot.clear();
                    }
                    for doc in &documents {
                        snapshot.insert(doc.id.clone(), doc.fields.clone());
                    }
                };
                if let Err(e) = self.mirror_update(collection, snapshot_update, &Remote::Done(())) {
                    log::warn!("Could not refresh local mirror of {}: {}", collection, e);
                }
                Ok(QueryResult {
                    documents,
                    source: DataSource::Remote,
                })
            }
            Remote::Skipped(reason) => {
                log::info!("Reading {} from local mirror: {}", collection, reason);
                let documents = self
                    .read_mirror(collection)
                    .into_iter()
                    .filter(|(_, fields)| filter.matches(fields))
                    .map(|(id, fields)| Document::new(id, fields))
                    .collect();
                Ok(QueryResult {
                    documents,
                    source: DataSource::LocalMirror,
                })
            }
        }
    }

    /// Documents currently held in the local mirror of `collection`
    pub fn mirrored(&self, collection: &str) -> Vec<Document> {
        self.read_mirror(collection)
            .into_iter()
            .map(|(id, fields)| Document::new(id, fields))
            .collect()
    }

    /// Subscribes to remote deltas for a collection
    pub fn subscribe(&self, collection: &str) -> StoreResult<Subscription> {
        self.remote.subscribe(collection)
    }

    /// Mirrors a real-time delta locally
    pub fn apply_remote_change(&self, change: &DocumentChange) {
        let result = self.mirror_update(
            &change.collection,
            |snapshot| match change.kind {
                ChangeKind::Added | ChangeKind::Modified => {
                    snapshot.insert(change.document.id.clone(), change.document.fields.clone());
                }
                ChangeKind::Removed => {
                    snapshot.remove(&change.document.id);
                }
            },
            &Remote::Done(()),
        );
        if let Err(e) = result {
            log::warn!("Could not mirror change to {}: {}", change.collection, e);
        }
    }

    fn try_remote<T, F>(&self, operation: &str, collection: &str, call: F) -> StoreResult<Remote<T>>
    where
        F: FnOnce(&dyn DocumentStore) -> StoreResult<T>,
    {
        if !self.breaker.allow() {
            return Ok(Remote::Skipped(
                "remote store paused after repeated failures".to_string(),
            ));
        }

        match call(self.remote.as_ref()) {
            Ok(value) => {
                self.breaker.record_success();
                Ok(Remote::Done(value))
            }
            Err(e) if e.is_remote_failure() => {
                self.breaker.record_failure();
                log::warn!("Remote {} on {} failed, using local mirror: {}", operation, collection, e);
                Ok(Remote::Skipped(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn outcome<T>(remote: Remote<T>) -> WriteOutcome {
        match remote {
            Remote::Done(_) => WriteOutcome::Saved,
            Remote::Skipped(reason) => WriteOutcome::SavedLocally {
                warning: format!("Saved on this device only ({})", reason),
            },
        }
    }

    fn mirror_key(collection: &str) -> String {
        format!("{}{}", MIRROR_NAMESPACE, collection)
    }

    fn read_mirror(&self, collection: &str) -> MirrorSnapshot {
        let key = Self::mirror_key(collection);
        match self.local.get(&key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::debug!("Discarding malformed mirror {}: {}", key, e);
                MirrorSnapshot::new()
            }),
            Ok(None) => MirrorSnapshot::new(),
            Err(e) => {
                log::warn!("Local mirror {} unreadable: {}", key, e);
                MirrorSnapshot::new()
            }
        }
    }

    /// Applies `update` to the mirror of `collection`
    ///
    /// When the remote already has the change a local failure is only logged;
    /// when the mirror is the sole copy the failure is returned.
    fn mirror_update<T, F>(&self, collection: &str, update: F, remote: &Remote<T>) -> StoreResult<()>
    where
        F: FnOnce(&mut MirrorSnapshot),
    {
        let key = Self::mirror_key(collection);
        let mut snapshot = self.read_mirror(collection);
        update(&mut snapshot);

        let result = serde_json::to_string(&snapshot)
            .map_err(StoreError::from)
            .and_then(|raw| set_or_clear_namespace(self.local.as_ref(), MIRROR_NAMESPACE, &key, &raw));

        match (result, remote) {
            (Ok(()), _) => Ok(()),
            (Err(e), Remote::Done(_)) => {
                log::warn!("Local mirror {} not updated: {}", key, e);
                Ok(())
            }
            (Err(e), Remote::Skipped(_)) => Err(e),
        }
    }
}
