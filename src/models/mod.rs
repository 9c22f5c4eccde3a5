//! Core data models for the prepare pipeline.
//!
//! These entities describe the secure-value channel and origin provenance of
//! a stored document. They serialize naturally as JSON via `serde` and carry
//! no behavior beyond their own validity rules.

pub mod origin;
pub mod secure_value;
