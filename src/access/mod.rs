//! Typed access to the metadata of an arbitrary structured object.
//!
//! The preparer never touches a document directly: all reads and writes go
//! through an [`ObjectAccessor`], a thin capability view resolved once per
//! call. One implementation exists per supported document schema; see
//! [`json::JsonObjectAccessor`] for the JSON document schema.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::errors::PrepareResult;
use crate::models::origin::OriginInfo;
use crate::models::secure_value::SecureValue;

pub mod json;

pub use json::JsonObjectAccessor;

/// Get/set capability over the fixed metadata surface of a stored object.
///
/// All mutation happens in place on the underlying object; implementations
/// hold no independent state. String getters return the empty string for
/// absent fields, and setters passed an empty string remove the field.
pub trait ObjectAccessor {
    fn name(&self) -> String;
    fn set_name(&mut self, name: &str);

    fn uid(&self) -> String;
    fn set_uid(&mut self, uid: &str);

    fn resource_version(&self) -> String;
    fn set_resource_version(&mut self, version: &str);

    /// Random-name generation hint. Server-assigned names make the hint
    /// meaningless by the time an object reaches storage, so the preparer
    /// only ever clears it.
    fn set_generate_name(&mut self, hint: &str);

    fn set_self_link(&mut self, link: &str);

    /// Fails with a format error when the stored timestamp cannot be parsed.
    fn creation_timestamp(&self) -> PrepareResult<Option<DateTime<Utc>>>;
    fn set_creation_timestamp(&mut self, ts: Option<DateTime<Utc>>);

    /// Written with millisecond precision; `None` clears the field.
    fn set_updated_timestamp(&mut self, ts: Option<DateTime<Utc>>);

    fn created_by(&self) -> String;
    fn set_created_by(&mut self, principal: &str);

    fn updated_by(&self) -> String;
    fn set_updated_by(&mut self, principal: &str);

    /// Fails with a format error when the stored provenance is malformed.
    fn origin_info(&self) -> PrepareResult<Option<OriginInfo>>;
    fn set_origin_info(&mut self, origin: Option<OriginInfo>);

    /// The declared secure values, or `None` when the object has none.
    fn secure_values(&self) -> PrepareResult<Option<BTreeMap<String, SecureValue>>>;

    /// Replace one secure value in place. Implementations apply their own
    /// validity rule and reject values that are not valid for write.
    fn set_secure_value(&mut self, field: &str, value: SecureValue) -> PrepareResult<()>;
}
