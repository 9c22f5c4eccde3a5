//! src/access/json.rs
//!
//! JsonObjectAccessor — the accessor implementation for JSON documents. The
//! expected schema mirrors the store's wire shape: a top-level object with a
//! `metadata` object (`name`, `uid`, `resourceVersion`, `generateName`,
//! `selfLink`, `creationTimestamp`, `annotations`) and an optional `secure`
//! object mapping field names to secure values. Ownership and provenance are
//! kept as annotations under the `object.store/` namespace.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::access::ObjectAccessor;
use crate::errors::{PrepareError, PrepareResult};
use crate::models::origin::OriginInfo;
use crate::models::secure_value::SecureValue;

const METADATA: &str = "metadata";
const ANNOTATIONS: &str = "annotations";
const SECURE: &str = "secure";

const ANNO_CREATED_BY: &str = "object.store/createdBy";
const ANNO_UPDATED_BY: &str = "object.store/updatedBy";
const ANNO_UPDATED_TIMESTAMP: &str = "object.store/updatedTimestamp";
const ANNO_ORIGIN_NAME: &str = "object.store/originName";
const ANNO_ORIGIN_PATH: &str = "object.store/originPath";
const ANNO_ORIGIN_KEY: &str = "object.store/originKey";
const ANNO_ORIGIN_TIMESTAMP: &str = "object.store/originTimestamp";

/// Capability view over a JSON document. Borrows the document mutably for
/// the duration of a prepare call; every setter mutates the document in
/// place and nothing is copied out.
pub struct JsonObjectAccessor<'a> {
    root: &'a mut Map<String, Value>,
}

impl<'a> JsonObjectAccessor<'a> {
    /// Interpret `object` under the document schema.
    ///
    /// Rejects anything that is not a JSON object carrying an object-valued
    /// `metadata` section; everything else is interpreted lazily by the
    /// individual getters.
    pub fn for_object(object: &'a mut Value) -> PrepareResult<Self> {
        let root = object
            .as_object_mut()
            .ok_or_else(|| PrepareError::Format("document root must be a JSON object".into()))?;

        match root.get(METADATA) {
            Some(Value::Object(_)) => Ok(Self { root }),
            Some(_) => Err(PrepareError::Format(
                "`metadata` must be a JSON object".into(),
            )),
            None => Err(PrepareError::Format("document has no `metadata`".into())),
        }
    }

    fn meta(&self) -> Option<&Map<String, Value>> {
        self.root.get(METADATA).and_then(Value::as_object)
    }

    fn meta_mut(&mut self) -> &mut Map<String, Value> {
        let slot = self
            .root
            .entry(METADATA)
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("metadata was just normalized to an object"),
        }
    }

    fn meta_str(&self, key: &str) -> String {
        self.meta()
            .and_then(|meta| meta.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Write a metadata string field; an empty value removes the field.
    fn set_meta_str(&mut self, key: &str, value: &str) {
        let meta = self.meta_mut();
        if value.is_empty() {
            meta.remove(key);
        } else {
            meta.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    fn annotation(&self, key: &str) -> String {
        self.meta()
            .and_then(|meta| meta.get(ANNOTATIONS))
            .and_then(Value::as_object)
            .and_then(|annotations| annotations.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Write an annotation; an empty value removes it, and a map emptied by
    /// the removal is pruned from the metadata.
    fn set_annotation(&mut self, key: &str, value: &str) {
        let meta = self.meta_mut();
        if value.is_empty() {
            let emptied = match meta.get_mut(ANNOTATIONS).and_then(Value::as_object_mut) {
                Some(annotations) => {
                    annotations.remove(key);
                    annotations.is_empty()
                }
                None => return,
            };
            if emptied {
                meta.remove(ANNOTATIONS);
            }
            return;
        }

        let slot = meta
            .entry(ANNOTATIONS)
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(annotations) = slot {
            annotations.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    fn parse_timestamp(&self, field: &str, raw: &str) -> PrepareResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|err| PrepareError::Format(format!("invalid `{field}` timestamp: {err}")))
    }
}

impl ObjectAccessor for JsonObjectAccessor<'_> {
    fn name(&self) -> String {
        self.meta_str("name")
    }

    fn set_name(&mut self, name: &str) {
        self.set_meta_str("name", name);
    }

    fn uid(&self) -> String {
        self.meta_str("uid")
    }

    fn set_uid(&mut self, uid: &str) {
        self.set_meta_str("uid", uid);
    }

    fn resource_version(&self) -> String {
        self.meta_str("resourceVersion")
    }

    fn set_resource_version(&mut self, version: &str) {
        self.set_meta_str("resourceVersion", version);
    }

    fn set_generate_name(&mut self, hint: &str) {
        self.set_meta_str("generateName", hint);
    }

    fn set_self_link(&mut self, link: &str) {
        self.set_meta_str("selfLink", link);
    }

    fn creation_timestamp(&self) -> PrepareResult<Option<DateTime<Utc>>> {
        let raw = self.meta_str("creationTimestamp");
        if raw.is_empty() {
            return Ok(None);
        }
        self.parse_timestamp("creationTimestamp", &raw).map(Some)
    }

    fn set_creation_timestamp(&mut self, ts: Option<DateTime<Utc>>) {
        let text = ts
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();
        self.set_meta_str("creationTimestamp", &text);
    }

    fn set_updated_timestamp(&mut self, ts: Option<DateTime<Utc>>) {
        let text = ts
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();
        self.set_annotation(ANNO_UPDATED_TIMESTAMP, &text);
    }

    fn created_by(&self) -> String {
        self.annotation(ANNO_CREATED_BY)
    }

    fn set_created_by(&mut self, principal: &str) {
        self.set_annotation(ANNO_CREATED_BY, principal);
    }

    fn updated_by(&self) -> String {
        self.annotation(ANNO_UPDATED_BY)
    }

    fn set_updated_by(&mut self, principal: &str) {
        self.set_annotation(ANNO_UPDATED_BY, principal);
    }

    fn origin_info(&self) -> PrepareResult<Option<OriginInfo>> {
        let name = self.annotation(ANNO_ORIGIN_NAME);
        if name.is_empty() {
            return Ok(None);
        }

        let raw_ts = self.annotation(ANNO_ORIGIN_TIMESTAMP);
        let timestamp = if raw_ts.is_empty() {
            None
        } else {
            Some(self.parse_timestamp("originTimestamp", &raw_ts)?)
        };

        Ok(Some(OriginInfo {
            name,
            path: self.annotation(ANNO_ORIGIN_PATH),
            key: self.annotation(ANNO_ORIGIN_KEY),
            timestamp,
        }))
    }

    fn set_origin_info(&mut self, origin: Option<OriginInfo>) {
        let origin = origin.unwrap_or_default();
        let timestamp = origin
            .timestamp
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();

        self.set_annotation(ANNO_ORIGIN_NAME, &origin.name);
        self.set_annotation(ANNO_ORIGIN_PATH, &origin.path);
        self.set_annotation(ANNO_ORIGIN_KEY, &origin.key);
        self.set_annotation(ANNO_ORIGIN_TIMESTAMP, &timestamp);
    }

    fn secure_values(&self) -> PrepareResult<Option<BTreeMap<String, SecureValue>>> {
        let section = match self.root.get(SECURE) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(PrepareError::Format("`secure` must be a JSON object".into()));
            }
        };

        let mut values = BTreeMap::new();
        for (field, raw) in section {
            let value: SecureValue = serde_json::from_value(raw.clone()).map_err(|err| {
                PrepareError::Format(format!("malformed secure value `{field}`: {err}"))
            })?;
            values.insert(field.clone(), value);
        }
        Ok(Some(values))
    }

    fn set_secure_value(&mut self, field: &str, value: SecureValue) -> PrepareResult<()> {
        if !value.is_valid_for_write() {
            return Err(PrepareError::SecureValueRewrite {
                field: field.to_string(),
                reason: "value is not valid for write".into(),
            });
        }

        let slot = self
            .root
            .entry(SECURE)
            .or_insert_with(|| Value::Object(Map::new()));
        let section = slot
            .as_object_mut()
            .ok_or_else(|| PrepareError::SecureValueRewrite {
                field: field.to_string(),
                reason: "`secure` is not a JSON object".into(),
            })?;

        let encoded = serde_json::to_value(&value).map_err(|err| {
            PrepareError::SecureValueRewrite {
                field: field.to_string(),
                reason: err.to_string(),
            }
        })?;
        section.insert(field.to_string(), encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn rejects_non_object_roots() {
        let mut doc = json!("not an object");
        assert!(matches!(
            JsonObjectAccessor::for_object(&mut doc),
            Err(PrepareError::Format(_))
        ));
    }

    #[test]
    fn rejects_missing_or_malformed_metadata() {
        let mut missing = json!({ "spec": {} });
        assert!(matches!(
            JsonObjectAccessor::for_object(&mut missing),
            Err(PrepareError::Format(_))
        ));

        let mut malformed = json!({ "metadata": "nope" });
        assert!(matches!(
            JsonObjectAccessor::for_object(&mut malformed),
            Err(PrepareError::Format(_))
        ));
    }

    #[test]
    fn reads_and_writes_metadata_fields() {
        let mut doc = json!({ "metadata": { "name": "a", "resourceVersion": "7" } });
        let mut obj = JsonObjectAccessor::for_object(&mut doc).unwrap();

        assert_eq!(obj.name(), "a");
        assert_eq!(obj.resource_version(), "7");
        assert_eq!(obj.uid(), "");

        obj.set_uid("u-1");
        obj.set_resource_version("");
        assert_eq!(obj.uid(), "u-1");
        assert_eq!(obj.resource_version(), "");

        assert_eq!(doc["metadata"]["uid"], json!("u-1"));
        assert!(doc["metadata"].get("resourceVersion").is_none());
    }

    #[test]
    fn clearing_last_annotation_prunes_the_map() {
        let mut doc = json!({
            "metadata": {
                "name": "a",
                "annotations": { "object.store/updatedBy": "user:1" }
            }
        });
        let mut obj = JsonObjectAccessor::for_object(&mut doc).unwrap();
        obj.set_updated_by("");
        assert!(doc["metadata"].get("annotations").is_none());
    }

    #[test]
    fn creation_timestamp_parse_failure_is_a_format_error() {
        let mut doc = json!({ "metadata": { "name": "a", "creationTimestamp": "yesterday" } });
        let obj = JsonObjectAccessor::for_object(&mut doc).unwrap();
        assert!(matches!(
            obj.creation_timestamp(),
            Err(PrepareError::Format(_))
        ));
    }

    #[test]
    fn origin_info_round_trips_without_loss() {
        let origin = OriginInfo {
            name: "provisioning".into(),
            path: "dashboards/a.json".into(),
            key: "abc123".into(),
            timestamp: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        };

        let mut doc = json!({ "metadata": { "name": "a" } });
        let mut obj = JsonObjectAccessor::for_object(&mut doc).unwrap();
        obj.set_origin_info(Some(origin.clone()));

        assert_eq!(obj.origin_info().unwrap(), Some(origin));
    }

    #[test]
    fn absent_origin_reads_as_none_and_clears_cleanly() {
        let mut doc = json!({ "metadata": { "name": "a" } });
        let mut obj = JsonObjectAccessor::for_object(&mut doc).unwrap();
        assert_eq!(obj.origin_info().unwrap(), None);

        obj.set_origin_info(Some(OriginInfo {
            name: "repo".into(),
            ..OriginInfo::default()
        }));
        obj.set_origin_info(None);
        assert_eq!(obj.origin_info().unwrap(), None);
        assert!(doc["metadata"].get("annotations").is_none());
    }

    #[test]
    fn malformed_origin_timestamp_is_a_format_error() {
        let mut doc = json!({
            "metadata": {
                "name": "a",
                "annotations": {
                    "object.store/originName": "repo",
                    "object.store/originTimestamp": "not-a-time"
                }
            }
        });
        let obj = JsonObjectAccessor::for_object(&mut doc).unwrap();
        assert!(matches!(obj.origin_info(), Err(PrepareError::Format(_))));
    }

    #[test]
    fn secure_section_must_be_an_object() {
        let mut doc = json!({ "metadata": { "name": "a" }, "secure": [1, 2] });
        let obj = JsonObjectAccessor::for_object(&mut doc).unwrap();
        assert!(matches!(obj.secure_values(), Err(PrepareError::Format(_))));
    }

    #[test]
    fn set_secure_value_rejects_invalid_values() {
        let mut doc = json!({ "metadata": { "name": "a" } });
        let mut obj = JsonObjectAccessor::for_object(&mut doc).unwrap();
        assert!(matches!(
            obj.set_secure_value("token", SecureValue::default()),
            Err(PrepareError::SecureValueRewrite { .. })
        ));
    }
}
