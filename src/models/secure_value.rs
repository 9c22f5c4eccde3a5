//! Secure values: sensitive fields that never reach the general payload.

use serde::{Deserialize, Serialize};

/// A secure field as it appears inside a stored document.
///
/// A value is *unresolved* while it still carries raw sensitive content
/// (`value`) and/or an indirect reference (`ref`). Once resolved it carries
/// only an opaque `guid`; the raw content lives in the storage engine's
/// secure channel, never in the document itself.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SecureValue {
    /// Opaque identifier assigned on first resolution. Empty until then.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub guid: String,

    /// Raw sensitive content awaiting resolution.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,

    /// Indirect reference to externally stored sensitive content.
    #[serde(default, rename = "ref", skip_serializing_if = "String::is_empty")]
    pub reference: String,
}

impl SecureValue {
    /// Whether this value may be handed to the extractor.
    ///
    /// An entirely empty value carries nothing to store. A guid combined with
    /// raw content is also rejected: resolved values are immutable, so raw
    /// content next to a guid could only leak into the payload.
    pub fn is_valid_for_write(&self) -> bool {
        if !self.guid.is_empty() {
            return self.value.is_empty() && self.reference.is_empty();
        }
        !self.value.is_empty() || !self.reference.is_empty()
    }

    /// A resolved value carrying only the given guid.
    pub fn resolved(guid: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            ..Self::default()
        }
    }
}

/// Side-channel record handed to the storage engine alongside the payload.
///
/// `value` and `refid` are populated only when the guid was generated by this
/// call; for pre-resolved fields the record carries the existing guid alone.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SecureValueRecord {
    pub guid: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refid: String,
}
