//! Error taxonomy for the prepare pipeline.
//!
//! Every variant is terminal for the call that produced it: nothing here is
//! transient, so callers retry by repeating the whole create/update attempt
//! (with a freshly read previous object), never by retrying inside this crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepareError {
    /// No authenticated principal was attached to the request context.
    #[error("no principal found in request context")]
    Unauthenticated,

    /// The object cannot be interpreted under the expected document schema,
    /// including stored timestamps or origin annotations that fail to parse.
    #[error("object does not match the expected schema: {0}")]
    Format(String),

    /// The object has no name. Names are required on both create and update.
    #[error("object must have a name")]
    MissingName,

    /// A secure value failed the accessor's validity rule before extraction.
    #[error("unable to write secure value `{0}`")]
    InvalidSecureValue(String),

    /// A resource version was supplied on create. Versions are assigned by
    /// the storage engine; pre-supplying one signals protocol misuse rather
    /// than a malformed request.
    #[error("resource version must not be set when creating an object")]
    ResourceVersionOnCreate,

    /// The accessor rejected the guid-only rewrite of a secure value. The
    /// extraction is aborted as a whole and the object left unchanged.
    #[error("unable to rewrite secure value `{field}`: {reason}")]
    SecureValueRewrite { field: String, reason: String },

    /// The encoder failed to serialize the finalized object.
    #[error("failed to encode object: {0}")]
    Encoding(String),
}

pub type PrepareResult<T> = Result<T, PrepareError>;
