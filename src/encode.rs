//! Wire encoding capability for finalized documents.

use bytes::Bytes;
use serde_json::Value;

use crate::errors::{PrepareError, PrepareResult};

/// Serializes a finalized document for the storage engine.
///
/// The codec itself is a collaborator: the preparer only cares that an object
/// becomes bytes after every invariant has been applied.
pub trait Encoder: Send + Sync {
    fn encode(&self, object: &Value) -> PrepareResult<Bytes>;
}

/// Default encoder producing the document's JSON bytes.
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn encode(&self, object: &Value) -> PrepareResult<Bytes> {
        serde_json::to_vec(object)
            .map(Bytes::from)
            .map_err(|err| PrepareError::Encoding(err.to_string()))
    }
}
