//! The task controller: the declarative lifecycle engine that is the sole focus of
//! this crate (spec §1). Loads task definitions from disk, launches each as a
//! container, supervises running tasks concurrently, chains successors based on exit
//! status, and cleans up resources on every exit path.

pub mod controller;
pub mod driver;
pub mod registry;
pub mod spec;
pub mod store;
pub mod supervisor;

pub use controller::Controller;
pub use driver::TaskDriver;
pub use registry::{RunningRegistry, TerminationSignal};
pub use spec::TaskSpec;
pub use store::TaskStore;
