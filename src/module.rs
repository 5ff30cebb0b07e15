//! The `Module` contract (spec §1, §4.5): the seam a module dispatch fabric would
//! call through to route `{module, action, payload}` triples. Building the fabric
//! itself — HTTP transport, routing, auth — is out of scope (spec §1 Non-goals);
//! this crate only exposes the contract such a fabric would call.
//!
//! Grounded in `orc/module.go`'s `Module` interface, translated from Go's
//! `map[string]interface{}` payload into a typed `serde_json::Value`.

use async_trait::async_trait;

use crate::error::ControllerError;

/// An abstract task handler a dispatch fabric addresses by name.
#[async_trait]
pub trait Module: Send + Sync {
    /// The name this module is addressed by (e.g. `"task"`).
    fn name(&self) -> &'static str;

    /// The actions this module recognizes.
    fn actions(&self) -> &'static [&'static str];

    /// Executes `action` with the decoded JSON `payload`, returning a result
    /// document or a structured error.
    async fn execute(
        &self,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, ControllerError>;
}
