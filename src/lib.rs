//! A declarative task lifecycle controller backed by a pluggable container runtime
//! adapter.
//!
//! This crate loads task definitions from a directory of JSON documents, launches
//! each as a container, supervises running tasks concurrently, chains successor
//! tasks based on exit status, and cleans up resources on every exit path. It
//! exposes the [`Module`] contract an external module dispatch fabric would call
//! through — building that fabric (HTTP framing, routing, auth) is out of scope.

pub mod config;
pub mod error;
pub mod module;
pub mod runtime;
pub mod task;
pub mod telemetry;

pub use config::Configuration;
pub use module::Module;
pub use task::{Controller, RunningRegistry, TaskDriver, TaskSpec, TaskStore};
pub use telemetry::init_tracing;
