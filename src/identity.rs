//! Request identity: who is performing the current prepare operation.

use serde::{Deserialize, Serialize};

use crate::errors::{PrepareError, PrepareResult};

/// The authenticated caller of a prepare operation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    /// Opaque identifier recorded in `createdBy`/`updatedBy` (e.g. "user:42").
    pub uid: String,
}

impl Principal {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// Per-call context handed in by the outer request-handling layer.
///
/// Carries the principal the transport authenticated, if any. The prepare
/// pipeline is synchronous and holds no deadline of its own; cancellation
/// stays with the caller.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    principal: Option<Principal>,
}

impl RequestContext {
    /// A context with no authenticated principal.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_principal(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

/// Capability that resolves the acting principal for an operation.
///
/// Injected into the preparer so tests and alternative deployments can swap
/// the identity machinery without process-wide setup.
pub trait IdentitySource: Send + Sync {
    fn resolve_principal(&self, ctx: &RequestContext) -> PrepareResult<Principal>;
}

/// Default identity source: the principal attached to the request context.
pub struct ContextIdentity;

impl IdentitySource for ContextIdentity {
    fn resolve_principal(&self, ctx: &RequestContext) -> PrepareResult<Principal> {
        ctx.principal()
            .cloned()
            .ok_or(PrepareError::Unauthenticated)
    }
}
