//! Origin provenance: where a document's content came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance descriptor for a stored document.
///
/// The prepare pipeline round-trips this through a read → write cycle as a
/// format-validity check: reading it back after writing must reproduce an
/// equivalent descriptor.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct OriginInfo {
    /// Name of the originating system (e.g. a provisioning repository).
    pub name: String,

    /// Path within the originating system.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Opaque key identifying the source revision or entry.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,

    /// When the content was produced at its origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}
