//! In-process document store
//!
//! Stands in for the remote backend in tests and the CLI. Connectivity and
//! permission failures can be switched on to exercise the fallback paths.

use crate::document::{
    ChangeKind, Document, DocumentChange, DocumentStore, Fields, Filter, Subscription,
};
use crate::error::{StoreError, StoreResult};
use crossbeam_channel::Sender;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<String, Fields>>,
    subscribers: Vec<(String, Sender<DocumentChange>)>,
}

impl Inner {
    fn notify(&mut self, change: DocumentChange) {
        self.subscribers.retain(|(collection, sender)| {
            if *collection != change.collection {
                return true;
            }
            sender.send(change.clone()).is_ok()
        });
    }
}

/// Document store held in memory
#[derive(Default)]
pub struct MemoryDocumentStore {
    inner: Mutex<Inner>,
    offline: AtomicBool,
    permission_denied: AtomicBool,
    write_attempts: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates loss of connectivity
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Simulates the backend refusing every operation
    pub fn set_permission_denied(&self, denied: bool) {
        self.permission_denied.store(denied, Ordering::SeqCst);
    }

    /// Number of write and delete calls received, including failed ones
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.lock()
            .collections
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, operation: &str, collection: &str) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(operation, "network unreachable"));
        }
        if self.permission_denied.load(Ordering::SeqCst) {
            return Err(StoreError::PermissionDenied {
                operation: operation.to_string(),
                collection: collection.to_string(),
            });
        }
        Ok(())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn query(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        self.check("query", collection)?;

        let inner = self.lock();
        let documents = inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| filter.matches(fields))
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(documents)
    }

    fn write(&self, collection: &str, id: Option<&str>, fields: Fields) -> StoreResult<String> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        self.check("write", collection)?;

        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut inner = self.lock();
        let previous = inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields.clone());

        let kind = if previous.is_some() {
            ChangeKind::Modified
        } else {
            ChangeKind::Added
        };
        inner.notify(DocumentChange {
            collection: collection.to_string(),
            kind,
            document: Document::new(id.clone(), fields),
        });

        Ok(id)
    }

    fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        self.check("delete", collection)?;

        let mut inner = self.lock();
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));

        if let Some(fields) = removed {
            inner.notify(DocumentChange {
                collection: collection.to_string(),
                kind: ChangeKind::Removed,
                document: Document::new(id, fields),
            });
        }

        Ok(())
    }

    fn subscribe(&self, collection: &str) -> StoreResult<Subscription> {
        self.check("subscribe", collection)?;

        let (sender, receiver) = crossbeam_channel::unbounded();
        self.lock()
            .subscribers
            .push((collection.to_string(), sender));
        Ok(Subscription::new(collection, receiver))
    }
}
