//! The lifecycle supervisor: one cooperative worker per running task, owning it from
//! attach to final cleanup (spec §4.4).

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::runtime::ContainerRuntimeAdapter;

use super::controller::Controller;
use super::driver::TaskDriver;
use super::registry::TerminationSender;

/// Poll interval for the RUNNING state (spec §4.4).
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Attempts to attach a supervisor for `name`. Returns immediately (no-op) if one is
/// already active — the attach procedure is the registry's atomic check-then-insert,
/// not anything this function does itself.
///
/// On success, spawns a `tokio` task running the full state machine and returns.
/// The spawned task is the sole owner of `sender` and runs cleanup on every exit
/// path before closing the signal and removing the registry entry, in that order.
pub fn attach<A: ContainerRuntimeAdapter + 'static>(
    controller: Controller<A>,
    driver: Arc<TaskDriver<A>>,
    poll_interval: Duration,
) {
    let name = driver.name().to_string();

    let sender = match controller.registry().attach(&name) {
        Some(sender) => sender,
        None => {
            info!("task [{}] already has an active supervisor, skipping attach", name);
            return;
        }
    };

    tokio::spawn(run(controller, driver, sender, poll_interval));
}

async fn run<A: ContainerRuntimeAdapter + 'static>(
    controller: Controller<A>,
    driver: Arc<TaskDriver<A>>,
    sender: TerminationSender,
    poll_interval: Duration,
) {
    let name = driver.name().to_string();

    let exited_cleanly = poll_until_stopped(&driver, poll_interval).await;

    if exited_cleanly {
        drain(&controller, &driver).await;
    }

    clean_up(&driver).await;

    sender.close();
    controller.registry().detach(&name);
}

/// RUNNING state: poll every `poll_interval` until the container is no longer
/// running. Returns `true` if the poll loop ended because the container actually
/// stopped, `false` if it ended because of a poll error (in which case DRAINING is
/// skipped — we don't know the exit code).
async fn poll_until_stopped<A: ContainerRuntimeAdapter>(driver: &TaskDriver<A>, poll_interval: Duration) -> bool {
    loop {
        match driver.is_running().await {
            Ok(false) => {
                info!("task [{}] complete", driver.name());
                return true;
            }
            Ok(true) => {
                sleep(poll_interval).await;
            }
            Err(e) => {
                error!("task [{}]: error fetching status: {}", driver.name(), e);
                return false;
            }
        }
    }
}

/// DRAINING state: compute successors and fire-and-forget start each through the
/// facade. One failing successor is logged and does not suppress its siblings.
async fn drain<A: ContainerRuntimeAdapter + 'static>(controller: &Controller<A>, driver: &TaskDriver<A>) {
    let next_tasks = match driver.next_tasks().await {
        Ok(tasks) => tasks,
        Err(e) => {
            error!("task [{}]: error fetching next tasks: {}", driver.name(), e);
            return;
        }
    };

    for task_name in next_tasks {
        if let Err(e) = controller.start(&task_name).await {
            error!(
                "task [{}]: error starting connected task [{}]: {}",
                driver.name(),
                task_name,
                e
            );
        }
    }
}

/// CLEANING state: always attempted, regardless of how RUNNING/DRAINING ended.
/// Errors are logged, never fatal.
async fn clean_up<A: ContainerRuntimeAdapter>(driver: &TaskDriver<A>) {
    if let Err(e) = driver.cleanup().await {
        warn!("task [{}]: error cleaning up: {}", driver.name(), e);
    }
}
