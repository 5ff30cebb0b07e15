//! The container runtime adapter: the capability contract the task driver is built
//! against (spec §4.2), plus a `bollard`-backed implementation and an in-memory one
//! for tests.

pub mod docker;
pub mod mock;
mod traits;

pub use docker::DockerAdapter;
pub use mock::{MockAdapter, MockOp};
pub use traits::{ContainerCreateSpec, ContainerInspection, ContainerRef, ContainerRuntimeAdapter};
