use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};

use crate::config::LaunchConfig;
use crate::error::{LaunchError, Result};
use crate::native::WineEntry;
use crate::plan::{assemble, LaunchPlan};

pub const LOADER_THREAD_NAME: &str = "sharedwine-loader";

/// What the native entry reported once it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub diagnostic: String,
}

/// Completion handle for one launch.
///
/// Dropping it detaches the loader thread; the outcome is still logged.
pub struct LaunchHandle {
    rx: Receiver<Result<LaunchOutcome>>,
    thread: JoinHandle<()>,
    taken: bool,
}

impl LaunchHandle {
    /// Blocks until the native entry returns.
    pub fn wait(mut self) -> Result<LaunchOutcome> {
        if self.taken {
            return Err(LaunchError::ResultTaken);
        }
        let res = self.rx.recv().unwrap_or(Err(LaunchError::WorkerPanicked));
        self.taken = true;
        res
    }

    /// Returns `None` on timeout, or once the result has already been taken.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Result<LaunchOutcome>> {
        if self.taken {
            return None;
        }
        let res = match self.rx.recv_timeout(timeout) {
            Ok(res) => res,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => Err(LaunchError::WorkerPanicked),
        };
        self.taken = true;
        Some(res)
    }

    /// Non-blocking variant of [`LaunchHandle::wait_timeout`].
    pub fn try_result(&mut self) -> Option<Result<LaunchOutcome>> {
        if self.taken {
            return None;
        }
        let res = match self.rx.try_recv() {
            Ok(res) => res,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(LaunchError::WorkerPanicked),
        };
        self.taken = true;
        Some(res)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Assembles the launch on the calling thread, then runs the native entry on a dedicated
/// loader thread.
///
/// Configuration problems (no prefix) are returned directly; everything that happens on the
/// loader thread arrives through the returned handle.
///
/// Assembly is the only work done before the thread starts. It includes one filesystem check
/// for `drive_c/winestart.cmd` when no command line is given, so the caller is not entirely
/// free of blocking I/O.
pub fn dispatch(config: LaunchConfig, entry: Arc<dyn WineEntry>) -> Result<LaunchHandle> {
    let plan = assemble(&config)?;
    spawn_loader(plan, entry)
}

fn spawn_loader(plan: LaunchPlan, entry: Arc<dyn WineEntry>) -> Result<LaunchHandle> {
    let (tx, rx) = bounded::<Result<LaunchOutcome>>(1);

    let thread = thread::Builder::new()
        .name(LOADER_THREAD_NAME.to_string())
        .spawn(move || {
            let res = entry.init(&plan).map(|diagnostic| {
                log::warn!("wine_init returned: {diagnostic}");
                LaunchOutcome { diagnostic }
            });
            if let Err(e) = &res {
                log::error!("failed to start wine from {}: {e}", plan.layout.root().display());
            }
            // Ignore send errors: the handle may have been dropped.
            let _ = tx.send(res);
        })
        .map_err(LaunchError::Spawn)?;

    Ok(LaunchHandle { rx, thread, taken: false })
}

/// Fire-and-forget launch: the caller is never blocked and never told about failures,
/// which are only logged.
pub fn initialize_wine(config: LaunchConfig, entry: Arc<dyn WineEntry>) {
    match dispatch(config, entry) {
        Ok(_detached) => {}
        Err(e) => log::error!("initialize_wine: {e}"),
    }
}
