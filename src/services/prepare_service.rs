//! src/services/prepare_service.rs
//!
//! PrepareService — the create/update preparation protocols. This file
//! intentionally owns no transport, storage, or auth wiring; identity and
//! encoding arrive as injected capabilities and the storage engine only ever
//! sees the finished `PreparedWrite`.

use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::access::{JsonObjectAccessor, ObjectAccessor};
use crate::encode::Encoder;
use crate::errors::{PrepareError, PrepareResult};
use crate::identity::{IdentitySource, RequestContext};
use crate::models::secure_value::SecureValueRecord;
use crate::services::secure::extract_secure_values;

/// Everything the storage engine needs for one write: the encoded payload
/// and the secure-value records it must persist outside the general payload.
#[derive(Debug)]
pub struct PreparedWrite {
    pub bytes: Bytes,
    pub secure: BTreeMap<String, SecureValueRecord>,
}

/// PrepareService enforces the invariants an object must satisfy immediately
/// before it is handed to the storage engine:
/// - Creates carry an authenticated creator, no resource version, and no
///   server-assigned fields supplied by the caller.
/// - Updates carry forward the immutable identity of the previous revision
///   and always refresh the updater and update time.
/// - Secure values leave the payload and travel as guid-keyed records.
///
/// Each call is a pure, synchronous, single-object operation; nothing is
/// shared between concurrent calls. Conflicting writers are detected by the
/// storage engine's resource-version check, not here.
pub struct PrepareService {
    identity: Arc<dyn IdentitySource>,
    encoder: Arc<dyn Encoder>,
}

impl PrepareService {
    pub fn new(identity: Arc<dyn IdentitySource>, encoder: Arc<dyn Encoder>) -> Self {
        Self { identity, encoder }
    }

    /// Prepare `new_object` for its first write.
    ///
    /// Mutates the document in place (clearing server-assigned fields,
    /// recording the creator, resolving secure values) and returns its
    /// encoded bytes plus the secure-value side channel.
    pub fn prepare_for_create(
        &self,
        ctx: &RequestContext,
        new_object: &mut Value,
    ) -> PrepareResult<PreparedWrite> {
        let principal = self.identity.resolve_principal(ctx)?;

        let secure = {
            let mut obj = JsonObjectAccessor::for_object(new_object)?;
            if obj.name().is_empty() {
                return Err(PrepareError::MissingName);
            }
            if !obj.resource_version().is_empty() {
                return Err(PrepareError::ResourceVersionOnCreate);
            }
            obj.set_generate_name(""); // Clear the random name hint
            obj.set_resource_version("");
            obj.set_self_link("");

            // Read+write verifies the origin format is accurate
            let origin = obj.origin_info()?;
            obj.set_origin_info(origin);

            // A freshly created object has no prior update
            obj.set_updated_by("");
            obj.set_updated_timestamp(None);
            obj.set_created_by(&principal.uid);

            extract_secure_values(&mut obj)?
        };

        let bytes = self.encoder.encode(new_object)?;
        debug!("prepared object for create as {}", principal.uid);
        Ok(PreparedWrite { bytes, secure })
    }

    /// Prepare `update_object` to replace `previous_object`.
    ///
    /// The caller supplies the previous revision, typically from the read
    /// half of a compare-and-swap. `uid`, `createdBy`, and
    /// `creationTimestamp` are taken from it unconditionally — a caller that
    /// submits different values is silently corrected, not rejected. The
    /// resource version is left alone; the storage engine arbitrates
    /// optimistic-concurrency conflicts.
    pub fn prepare_for_update(
        &self,
        ctx: &RequestContext,
        update_object: &mut Value,
        previous_object: &Value,
    ) -> PrepareResult<PreparedWrite> {
        let principal = self.identity.resolve_principal(ctx)?;

        let secure = {
            let mut obj = JsonObjectAccessor::for_object(update_object)?;
            if obj.name().is_empty() {
                return Err(PrepareError::MissingName);
            }

            // The accessor mutates in place, so read the previous revision
            // through its own working copy.
            let mut previous = previous_object.clone();
            let prev = JsonObjectAccessor::for_object(&mut previous)?;
            obj.set_uid(&prev.uid());
            obj.set_created_by(&prev.created_by());
            obj.set_creation_timestamp(prev.creation_timestamp()?);

            // Read+write verifies the origin format is accurate
            let origin = obj.origin_info()?;
            obj.set_origin_info(origin);

            obj.set_updated_by(&principal.uid);
            obj.set_updated_timestamp(Some(Utc::now()));

            extract_secure_values(&mut obj)?
        };

        let bytes = self.encoder.encode(update_object)?;
        debug!("prepared object for update as {}", principal.uid);
        Ok(PreparedWrite { bytes, secure })
    }
}
