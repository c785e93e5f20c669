//! Strong-typed UUID identifiers for domain entities.
//!
//! A newtype per entity prevents accidentally passing a `FolderId` where a
//! `FileId` is expected — the same discipline the rest of the workspace uses
//! for every identifier that crosses a port boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(FolderId, "Identifier for an [`crate::entities::IndexedFolder`].");
define_id!(FileId, "Identifier for an [`crate::entities::IndexedFile`].");
define_id!(ChunkId, "Identifier for a [`crate::entities::FileChunk`].");
define_id!(SessionId, "Identifier for a [`crate::entities::ChatSession`].");
define_id!(MessageId, "Identifier for a [`crate::entities::ChatMessage`].");
define_id!(
    SubAgentId,
    "Identifier for a [`crate::entities::SubAgentDefinition`]."
);
define_id!(
    KnowledgeEntryId,
    "Identifier for a [`crate::entities::KnowledgeEntry`]."
);
define_id!(OperationId, "Identifier for a tool invocation audit row.");

/// Opaque tenant identifier: a user within a company.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Opaque tenant identifier: the company a user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

/// The `(userId, companyId)` pair that bounds multi-tenant isolation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantContext {
    /// The acting user.
    pub user_id: UserId,
    /// The user's company.
    pub company_id: CompanyId,
}

/// Opaque identifier for an in-flight tool call within a turn, chosen by the
/// LLM provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolCallId(pub String);
