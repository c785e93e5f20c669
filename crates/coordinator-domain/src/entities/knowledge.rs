//! The `KnowledgeEntry` entity.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::value_objects::KnowledgeEntryId;

/// A piece of knowledge, replicated as a metadata row in the meta store and a
/// vector point in the vector store under the same `collection` name and the
/// same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeEntry {
    /// Stable identifier, shared with the vector store point.
    pub id: KnowledgeEntryId,
    /// The logical vector-store collection this entry lives in.
    pub collection: String,
    /// The entry's text, embedded to produce its vector.
    pub text: String,
    /// String-keyed metadata, carried through to the vector point's payload.
    pub metadata: HashMap<String, String>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
}

impl KnowledgeEntry {
    /// Construct a new knowledge entry.
    #[must_use]
    pub fn new(collection: String, text: String, metadata: HashMap<String, String>) -> Self {
        Self {
            id: KnowledgeEntryId::new(),
            collection,
            text,
            metadata,
            created_at: Utc::now(),
        }
    }
}
