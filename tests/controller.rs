//! Integration coverage for the full load -> start -> supervise -> chain -> cleanup
//! path, mirroring `task/controller_test.go`'s table-driven cases against fixture
//! task directories.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use taskctl::runtime::{MockAdapter, MockOp};
use taskctl::{Configuration, Controller};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn config(task_directory: PathBuf) -> Configuration {
    Configuration {
        task_directory,
        initialize_tasks: false,
        poll_interval_ms: 500,
        stop_grace_seconds: 10,
    }
}

async fn wait_until(mut check: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn empty_directory_loads_into_empty_store() {
    let adapter = Arc::new(MockAdapter::new());
    let controller = Controller::load(&config(fixture("empty")), adapter).await.unwrap();
    assert!(controller.running_tasks().is_empty());
}

#[tokio::test]
async fn bad_json_aborts_load() {
    let adapter = Arc::new(MockAdapter::new());
    let result = Controller::load(&config(fixture("bad_json")), adapter).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn duplicate_name_aborts_load() {
    let adapter = Arc::new(MockAdapter::new());
    let result = Controller::load(&config(fixture("duplicate_name")), adapter).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn nonexistent_directory_aborts_load() {
    let adapter = Arc::new(MockAdapter::new());
    let result = Controller::load(&config(fixture("does_not_exist")), adapter).await;
    assert!(result.is_err());
}

/// Scenario 1 (spec §8): `hello` exits 0, its `on_success` successor `world` starts
/// and then appears in `running`; `hello`'s container is cleaned up.
#[tokio::test]
async fn happy_path_chains_on_success_and_cleans_up() {
    let adapter = Arc::new(MockAdapter::new());
    let controller = Controller::load(&config(fixture("happy_path")), adapter.clone())
        .await
        .unwrap();

    controller.start("hello").await.unwrap();
    assert!(controller.running_tasks().contains(&"hello".to_string()));

    // Let the supervisor observe the running container at least once before it exits.
    tokio::time::sleep(Duration::from_millis(10)).await;
    adapter.set_exited("hello", 0);

    assert!(
        wait_until(
            || controller.running_tasks().contains(&"world".to_string()),
            Duration::from_secs(2),
        )
        .await
    );
    assert!(
        wait_until(|| !controller.running_tasks().contains(&"hello".to_string()), Duration::from_secs(2)).await
    );
    assert!(!adapter.is_tracked("hello"));
}

/// Scenario 2: startup finds an existing container already running; the supervisor
/// attaches without calling `Start`, and `running` lists it immediately.
#[tokio::test]
async fn already_running_task_is_attached_without_restart() {
    let adapter = Arc::new(MockAdapter::new());
    adapter.seed_container("hello", true);

    let controller = Controller::load(&config(fixture("happy_path")), adapter.clone())
        .await
        .unwrap();

    assert!(controller.running_tasks().contains(&"hello".to_string()));
}

/// Scenario 3: a failing `create` surfaces as an error and leaves the registry
/// untouched.
#[tokio::test]
async fn failed_start_surfaces_error_and_skips_registry() {
    let adapter = Arc::new(MockAdapter::new());
    let controller = Controller::load(&config(fixture("happy_path")), adapter.clone())
        .await
        .unwrap();

    adapter.fail(MockOp::Create, "no such image: missing:x");

    let err = controller.start("hello").await.unwrap_err();
    assert!(err.to_string().contains("missing:x"));
    assert!(!controller.running_tasks().contains(&"hello".to_string()));
}

/// Scenario 4: stopping a supervised task calls the driver's stop exactly once, and
/// the supervisor removes it from the registry on its next poll.
#[tokio::test]
async fn stop_while_supervised_removes_from_registry() {
    let adapter = Arc::new(MockAdapter::new());
    let controller = Controller::load(&config(fixture("happy_path")), adapter.clone())
        .await
        .unwrap();

    controller.start("hello").await.unwrap();
    assert!(controller.running_tasks().contains(&"hello".to_string()));

    controller.stop("hello").await.unwrap();

    assert!(
        wait_until(
            || !controller.running_tasks().contains(&"hello".to_string()),
            Duration::from_secs(2),
        )
        .await
    );
}

/// Scenario 5: a non-zero exit starts the `on_failure` successor.
#[tokio::test]
async fn failure_chain_starts_on_failure_successor() {
    let adapter = Arc::new(MockAdapter::new());
    let controller = Controller::load(&config(fixture("failure_chain")), adapter.clone())
        .await
        .unwrap();

    controller.start("hello").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    adapter.set_exited("hello", 2);

    assert!(
        wait_until(
            || controller.running_tasks().contains(&"recover".to_string()),
            Duration::from_secs(2),
        )
        .await
    );
}

/// Scenario 6: an unknown task name is rejected and the registry is unchanged.
#[tokio::test]
async fn unknown_task_is_rejected() {
    let adapter = Arc::new(MockAdapter::new());
    let controller = Controller::load(&config(fixture("happy_path")), adapter).await.unwrap();

    let err = controller.start("ghost").await.unwrap_err();
    assert!(err.to_string().contains("ghost"));
    assert!(controller.running_tasks().is_empty());
}

/// Attach is idempotent: concurrently starting the same task twice results in one
/// supervisor, not two.
#[tokio::test]
async fn concurrent_start_calls_result_in_one_supervisor() {
    let adapter = Arc::new(MockAdapter::new());
    let controller = Controller::load(&config(fixture("happy_path")), adapter.clone())
        .await
        .unwrap();

    let (a, b) = tokio::join!(controller.start("hello"), controller.start("hello"));
    assert!(a.is_ok());
    assert!(b.is_ok());

    let running = controller.running_tasks();
    assert_eq!(running.iter().filter(|n| *n == "hello").count(), 1);
}
