//! End-to-end flow: create an object, hand the encoded payload to a
//! pretend storage engine, then update the stored revision.

use std::sync::Arc;

use object_prepare::{
    ContextIdentity, JsonEncoder, PrepareService, Principal, RequestContext,
};
use serde_json::{Value, json};

fn service() -> PrepareService {
    PrepareService::new(Arc::new(ContextIdentity), Arc::new(JsonEncoder))
}

#[test]
fn secure_values_never_reach_the_payload_across_a_create_update_cycle() {
    let service = service();
    let creator = RequestContext::with_principal(Principal::new("user:42"));

    let mut new_object = json!({
        "metadata": { "name": "a" },
        "spec": { "title": "first" },
        "secure": { "token": { "value": "secret123" } }
    });

    let created = service.prepare_for_create(&creator, &mut new_object).unwrap();
    let token_guid = created.secure["token"].guid.clone();
    assert_eq!(created.secure["token"].value, "secret123");

    // What the storage engine persists as the general payload.
    let mut stored: Value = serde_json::from_slice(&created.bytes).unwrap();
    assert_eq!(stored["secure"]["token"], json!({ "guid": token_guid }));
    assert!(!created.bytes.windows(9).any(|w| w == b"secret123"));
    assert_eq!(
        stored["metadata"]["annotations"]["object.store/createdBy"],
        json!("user:42")
    );

    // The storage engine assigns a version; a second writer edits the
    // stored revision and submits it back.
    stored["metadata"]["resourceVersion"] = json!("1");
    let mut update = stored.clone();
    update["spec"]["title"] = json!("second");
    update["metadata"]["uid"] = json!("tampered");

    let editor = RequestContext::with_principal(Principal::new("user:7"));
    let updated = service
        .prepare_for_update(&editor, &mut update, &stored)
        .unwrap();

    // The resolved secure value kept its guid and shipped no raw content.
    assert_eq!(updated.secure["token"].guid, token_guid);
    assert_eq!(updated.secure["token"].value, "");

    let stored_v2: Value = serde_json::from_slice(&updated.bytes).unwrap();
    assert_eq!(stored_v2["spec"]["title"], json!("second"));
    assert_eq!(stored_v2["secure"]["token"], json!({ "guid": token_guid }));
    // Immutable identity came from the stored revision, not the caller.
    assert!(stored_v2["metadata"].get("uid").is_none() || stored_v2["metadata"]["uid"] != json!("tampered"));
    assert_eq!(
        stored_v2["metadata"]["annotations"]["object.store/createdBy"],
        json!("user:42")
    );
    assert_eq!(
        stored_v2["metadata"]["annotations"]["object.store/updatedBy"],
        json!("user:7")
    );
    // The caller-supplied version rides along for the storage engine's
    // optimistic-concurrency check.
    assert_eq!(stored_v2["metadata"]["resourceVersion"], json!("1"));
}
