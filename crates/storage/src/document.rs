//! Backing document store interface
//!
//! The store is an eventually consistent collection/document database.
//! Subscriptions deliver added, modified and removed deltas, never full
//! snapshots.

use crate::error::StoreResult;
use crossbeam_channel::Receiver;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Field map of a single document
pub type Fields = Map<String, Value>;

/// A stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decodes the fields into a record type
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }
}

/// Encodes a record as document fields
///
/// Records must serialize to a JSON object.
pub fn encode<T: Serialize>(record: &T) -> StoreResult<Fields> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        other => Err(crate::StoreError::InvalidRecord(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Decodes every document that parses as `T`, skipping the rest
pub(crate) fn decode_all<T: DeserializeOwned>(collection: &str, documents: &[Document]) -> Vec<T> {
    documents
        .iter()
        .filter_map(|doc| match doc.decode() {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("Skipping malformed {} document {}: {}", collection, doc.id, e);
                None
            }
        })
        .collect()
}

/// Query filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    /// Field equality; `path` may use dots for nested fields, e.g. `identity.chapter`
    Equals { path: String, value: Value },
}

impl Filter {
    pub fn equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Equals {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Returns true if the fields satisfy the filter
    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Filter::All => true,
            Filter::Equals { path, value } => {
                let mut parts = path.split('.');
                let Some(first) = parts.next() else {
                    return false;
                };
                let mut current = fields.get(first);
                for part in parts {
                    current = current.and_then(|v| v.get(part));
                }
                current == Some(value)
            }
        }
    }
}

/// Kind of real-time delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One real-time delta delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChange {
    pub collection: String,
    pub kind: ChangeKind,
    pub document: Document,
}

/// Live subscription to one collection
///
/// Dropping the subscription unsubscribes; the store prunes closed channels
/// on its next delivery.
#[derive(Debug)]
pub struct Subscription {
    collection: String,
    receiver: Receiver<DocumentChange>,
}

impl Subscription {
    pub fn new(collection: impl Into<String>, receiver: Receiver<DocumentChange>) -> Self {
        Self {
            collection: collection.into(),
            receiver,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Takes every delta delivered so far without blocking
    pub fn drain(&self) -> Vec<DocumentChange> {
        self.receiver.try_iter().collect()
    }

    /// Underlying channel, for hosts that select over several sources
    pub fn receiver(&self) -> &Receiver<DocumentChange> {
        &self.receiver
    }
}

/// Authoritative remote document store
pub trait DocumentStore: Send + Sync {
    /// Returns every document in `collection` matching `filter`
    fn query(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// Creates or replaces a document, returning its id
    ///
    /// A new id is generated when `id` is `None`.
    fn write(&self, collection: &str, id: Option<&str>, fields: Fields) -> StoreResult<String>;

    /// Removes a document; removing a missing document is not an error
    fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Starts receiving deltas for `collection`
    fn subscribe(&self, collection: &str) -> StoreResult<Subscription>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_filter_nested_path() {
        let doc = fields(json!({ "identity": { "chapter": 2, "verse": 255 }, "note": null }));

        assert!(Filter::All.matches(&doc));
        assert!(Filter::equals("identity.chapter", 2).matches(&doc));
        assert!(!Filter::equals("identity.chapter", 3).matches(&doc));
        assert!(!Filter::equals("identity.page", 2).matches(&doc));
        assert!(Filter::equals("note", Value::Null).matches(&doc));
    }

    #[test]
    fn test_encode_requires_object() {
        assert!(encode(&json!({ "a": 1 })).is_ok());
        assert!(encode(&42).is_err());
    }

    #[test]
    fn test_drain_collects_pending() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let sub = Subscription::new("bookmarks", rx);
        for kind in [ChangeKind::Added, ChangeKind::Removed] {
            tx.send(DocumentChange {
                collection: "bookmarks".to_string(),
                kind,
                document: Document::new("x", Fields::new()),
            })
            .unwrap();
        }
        drop(tx);

        let changes = sub.drain();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].kind, ChangeKind::Removed);
        assert!(sub.drain().is_empty());
    }
}
