//! Prepares structured objects for durable, versioned storage.
//!
//! The crate enforces the create/update invariants a multi-tenant resource
//! store expects — ownership, timestamps, version fields, origin provenance —
//! and separates sensitive "secure" field values from the general payload
//! before anything is persisted. A prepare call mutates the document in
//! place, replaces raw secure content with opaque guids, and returns the
//! encoded payload together with the guid-keyed side channel the storage
//! engine persists separately.
//!
//! Transport, authentication wiring, the wire codec, and the storage engine
//! itself are collaborators: identity and encoding arrive through the
//! [`identity::IdentitySource`] and [`encode::Encoder`] capabilities, and the
//! storage engine only ever sees a finished
//! [`services::prepare_service::PreparedWrite`].

pub mod access;
pub mod encode;
pub mod errors;
pub mod identity;
pub mod models;
pub mod services;

pub use access::{JsonObjectAccessor, ObjectAccessor};
pub use encode::{Encoder, JsonEncoder};
pub use errors::{PrepareError, PrepareResult};
pub use identity::{ContextIdentity, IdentitySource, Principal, RequestContext};
pub use models::origin::OriginInfo;
pub use models::secure_value::{SecureValue, SecureValueRecord};
pub use services::prepare_service::{PrepareService, PreparedWrite};
pub use services::secure::extract_secure_values;
