//! Secure-value extraction: moves raw sensitive content out of a document
//! and into the side channel the storage engine persists separately.

use std::collections::BTreeMap;

use tracing::debug;
use uuid::Uuid;

use crate::access::ObjectAccessor;
use crate::errors::{PrepareError, PrepareResult};
use crate::models::secure_value::{SecureValue, SecureValueRecord};

/// Resolve every secure value declared on `obj`.
///
/// Fields whose value already carries a guid were resolved by an earlier
/// write and are left untouched; their record carries the guid alone. Fields
/// seen for the first time get a freshly generated guid, their raw value and
/// reference move into the returned record, and the in-object value is
/// rewritten to carry only the guid — after this call the document itself
/// never holds raw sensitive content.
///
/// Extraction is all-or-nothing: rewrites are staged once every field has
/// validated and rolled back if the accessor rejects any of them, so an error
/// leaves the document exactly as it was.
pub fn extract_secure_values<A: ObjectAccessor>(
    obj: &mut A,
) -> PrepareResult<BTreeMap<String, SecureValueRecord>> {
    let Some(secure) = obj.secure_values()? else {
        return Ok(BTreeMap::new());
    };
    if secure.is_empty() {
        return Ok(BTreeMap::new());
    }

    let mut records = BTreeMap::new();
    let mut staged: Vec<(String, SecureValue)> = Vec::new();

    for (field, value) in &secure {
        if !value.is_valid_for_write() {
            return Err(PrepareError::InvalidSecureValue(field.clone()));
        }

        if !value.guid.is_empty() {
            // Resolved in a prior write; the guid is immutable from here on.
            records.insert(
                field.clone(),
                SecureValueRecord {
                    guid: value.guid.clone(),
                    ..SecureValueRecord::default()
                },
            );
            continue;
        }

        let guid = Uuid::new_v4().to_string();
        records.insert(
            field.clone(),
            SecureValueRecord {
                guid: guid.clone(),
                value: value.value.clone(),
                refid: value.reference.clone(),
            },
        );
        staged.push((field.clone(), SecureValue::resolved(guid)));
    }

    for (idx, (field, rewritten)) in staged.iter().enumerate() {
        if let Err(err) = obj.set_secure_value(field, rewritten.clone()) {
            // Restore the fields already rewritten so the caller sees no
            // partial commit. The originals validated above, so restoring
            // them can only fail for the same structural reason the rewrite
            // did; nothing more can be done about it here.
            for (prev_field, _) in &staged[..idx] {
                let _ = obj.set_secure_value(prev_field, secure[prev_field].clone());
            }
            return Err(err);
        }
    }

    debug!("extracted {} secure value(s)", records.len());
    Ok(records)
}
