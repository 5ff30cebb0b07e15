//! In-memory [`ContainerRuntimeAdapter`] for tests, grounded in
//! `task/controller_test.go`'s `mocktask`: per-container scriptable state (running,
//! exit code) plus per-call injectable failures. The task driver is exercised
//! directly against this adapter rather than being mocked itself (see Design Notes).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::AdapterError;

use super::traits::{ContainerCreateSpec, ContainerInspection, ContainerRef, ContainerRuntimeAdapter};

#[derive(Debug, Clone)]
struct MockContainer {
    id: String,
    running: bool,
    exit_code: i64,
}

/// Which operation a scripted failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Pull,
    Create,
    Start,
    Stop,
    Remove,
    Inspect,
    ListByName,
}

#[derive(Default)]
struct State {
    /// Container name -> container record. Absent means "no container by this name".
    containers: HashMap<String, MockContainer>,
    next_id: u64,
    /// Operations scripted to fail, and the message to fail with.
    failures: HashMap<MockOp, String>,
    /// Names for which `list_by_name` should report more than one match, simulating
    /// an `Inconsistency`.
    duplicated: Vec<String>,
}

/// In-memory adapter driven entirely by test setup — no real container runtime.
pub struct MockAdapter {
    state: Mutex<State>,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Script an operation to fail with `message` on its next invocation (and every
    /// one after, until [`Self::clear_failure`] is called).
    pub fn fail(&self, op: MockOp, message: impl Into<String>) {
        self.state.lock().failures.insert(op, message.into());
    }

    pub fn clear_failure(&self, op: MockOp) {
        self.state.lock().failures.remove(&op);
    }

    /// Pre-seed a container as already existing, e.g. to simulate "discovered
    /// already-running at load".
    pub fn seed_container(&self, name: &str, running: bool) {
        let mut state = self.state.lock();
        let id = format!("mock-{}", state.next_id);
        state.next_id += 1;
        state.containers.insert(
            name.to_string(),
            MockContainer {
                id,
                running,
                exit_code: 0,
            },
        );
    }

    /// Mark a running container's terminal exit code and flip it to not-running, as
    /// if the process inside had exited.
    pub fn set_exited(&self, name: &str, exit_code: i64) {
        let mut state = self.state.lock();
        if let Some(c) = state.containers.get_mut(name) {
            c.running = false;
            c.exit_code = exit_code;
        }
    }

    /// Force `list_by_name(name)` to report two matches, independent of what's
    /// actually tracked — simulates the inconsistency case directly.
    pub fn force_duplicate(&self, name: &str) {
        self.state.lock().duplicated.push(name.to_string());
    }

    pub fn is_tracked(&self, name: &str) -> bool {
        self.state.lock().containers.contains_key(name)
    }

    fn check(&self, op: MockOp) -> Result<(), AdapterError> {
        if let Some(msg) = self.state.lock().failures.get(&op) {
            return Err(AdapterError::Other(msg.clone()));
        }
        Ok(())
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRuntimeAdapter for MockAdapter {
    async fn pull(&self, _image: &str) -> Result<(), AdapterError> {
        self.check(MockOp::Pull)
    }

    async fn create(&self, spec: &ContainerCreateSpec) -> Result<String, AdapterError> {
        self.check(MockOp::Create)?;

        let mut state = self.state.lock();
        let id = format!("mock-{}", state.next_id);
        state.next_id += 1;
        state.containers.insert(
            spec.name.clone(),
            MockContainer {
                id: id.clone(),
                running: false,
                exit_code: 0,
            },
        );
        Ok(id)
    }

    async fn start(&self, id: &str) -> Result<(), AdapterError> {
        self.check(MockOp::Start)?;

        let mut state = self.state.lock();
        let container = state
            .containers
            .values_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AdapterError::ContainerNotFound(id.to_string()))?;
        container.running = true;
        Ok(())
    }

    async fn stop(&self, id: &str, _grace: Duration) -> Result<(), AdapterError> {
        self.check(MockOp::Stop)?;

        let mut state = self.state.lock();
        let container = state
            .containers
            .values_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AdapterError::ContainerNotFound(id.to_string()))?;
        container.running = false;
        container.exit_code = 0;
        Ok(())
    }

    async fn remove(&self, id: &str, _force: bool) -> Result<(), AdapterError> {
        self.check(MockOp::Remove)?;

        let mut state = self.state.lock();
        state.containers.retain(|_, c| c.id != id);
        Ok(())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerInspection, AdapterError> {
        self.check(MockOp::Inspect)?;

        let state = self.state.lock();
        let container = state
            .containers
            .values()
            .find(|c| c.id == id)
            .ok_or_else(|| AdapterError::ContainerNotFound(id.to_string()))?;
        Ok(ContainerInspection {
            running: container.running,
            exit_code: container.exit_code,
        })
    }

    async fn list_by_name(&self, name: &str) -> Result<Vec<ContainerRef>, AdapterError> {
        self.check(MockOp::ListByName)?;

        let state = self.state.lock();
        if state.duplicated.contains(&name.to_string()) {
            return Ok(vec![
                ContainerRef { id: format!("{}-dup-a", name) },
                ContainerRef { id: format!("{}-dup-b", name) },
            ]);
        }

        Ok(state
            .containers
            .get(name)
            .map(|c| vec![ContainerRef { id: c.id.clone() }])
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_start_marks_running() {
        let adapter = MockAdapter::new();
        let spec = ContainerCreateSpec {
            name: "hello".into(),
            image: "alpine:latest".into(),
            command: vec![],
            env: vec![],
            exposed_ports: vec![],
            port_bindings: HashMap::new(),
            binds: vec![],
        };

        let id = adapter.create(&spec).await.unwrap();
        adapter.start(&id).await.unwrap();

        let refs = adapter.list_by_name("hello").await.unwrap();
        assert_eq!(refs.len(), 1);
        let inspection = adapter.inspect(&refs[0].id).await.unwrap();
        assert!(inspection.running);
    }

    #[tokio::test]
    async fn scripted_failure_propagates() {
        let adapter = MockAdapter::new();
        adapter.fail(MockOp::Pull, "network down");
        let err = adapter.pull("alpine:latest").await.unwrap_err();
        assert!(err.to_string().contains("network down"));
    }

    #[tokio::test]
    async fn forced_duplicate_reports_two() {
        let adapter = MockAdapter::new();
        adapter.seed_container("hello", true);
        adapter.force_duplicate("hello");
        let refs = adapter.list_by_name("hello").await.unwrap();
        assert_eq!(refs.len(), 2);
    }
}
