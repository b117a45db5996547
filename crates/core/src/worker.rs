//! Worker process lifecycle: spawning, tracking, and termination.

use std::process::Stdio;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock};

use crate::config::LauncherConfig;
use crate::error::{LaunchError, StopError};
use crate::observer;
use crate::registry::WorkerRegistry;

/// Worker lifecycle states.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerState {
    /// Spawned, not yet confirmed live.
    Starting,

    /// Confirmed live and streaming.
    Running,

    /// Termination requested, exit not yet observed.
    Stopping,

    /// Exited with the given code.
    Exited(i32),

    /// Terminated abnormally (signal, poll failure).
    Failed(String),
}

impl WorkerState {
    /// Short lowercase label for logs and API responses.
    pub fn label(&self) -> &'static str {
        match self {
            WorkerState::Starting => "starting",
            WorkerState::Running => "running",
            WorkerState::Stopping => "stopping",
            WorkerState::Exited(_) => "exited",
            WorkerState::Failed(_) => "failed",
        }
    }
}

/// Handle to one spawned stream worker.
///
/// Registered with the [`WorkerRegistry`] immediately after a successful
/// spawn; retired by the exit monitor once the process is reaped.
#[derive(Debug)]
pub struct WorkerHandle {
    /// OS-assigned process ID.
    pub pid: u32,

    /// Stream URL the worker was launched with.
    pub stream_url: String,

    /// When the worker was spawned.
    pub started_at: DateTime<Utc>,

    /// Current lifecycle state.
    state: RwLock<WorkerState>,

    /// The child process, shared between the exit monitor and `stop`.
    pub(crate) child: Mutex<Option<Child>>,
}

impl WorkerHandle {
    fn new(pid: u32, stream_url: String, child: Child) -> Self {
        Self {
            pid,
            stream_url,
            started_at: Utc::now(),
            state: RwLock::new(WorkerState::Starting),
            child: Mutex::new(Some(child)),
        }
    }

    /// Handle with no backing process, for registry tests.
    #[cfg(test)]
    pub(crate) fn detached(pid: u32, stream_url: String) -> Self {
        Self {
            pid,
            stream_url,
            started_at: Utc::now(),
            state: RwLock::new(WorkerState::Starting),
            child: Mutex::new(None),
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> WorkerState {
        self.state.read().await.clone()
    }

    pub(crate) async fn set_state(&self, state: WorkerState) {
        *self.state.write().await = state;
    }
}

/// Spawns stream workers and dispatches termination signals.
pub struct WorkerLauncher {
    config: LauncherConfig,
    registry: Arc<WorkerRegistry>,
}

impl WorkerLauncher {
    /// Create a launcher that registers workers with `registry`.
    pub fn new(config: LauncherConfig, registry: Arc<WorkerRegistry>) -> Self {
        Self { config, registry }
    }

    /// Registry this launcher registers workers with.
    pub fn registry(&self) -> &Arc<WorkerRegistry> {
        &self.registry
    }

    /// Start a worker for `stream_url`, falling back to the configured
    /// default URL when none is supplied. Empty strings count as absent.
    ///
    /// The handle is registered before this returns, so a concurrently issued
    /// stop request can always find it. Does not wait for the worker to
    /// finish; output and exit are handled by the attached observer tasks.
    pub async fn start(
        &self,
        stream_url: Option<String>,
    ) -> Result<Arc<WorkerHandle>, LaunchError> {
        let url = stream_url
            .filter(|u| !u.is_empty())
            .or_else(|| self.config.default_stream_url.clone())
            .ok_or(LaunchError::NoUrlConfigured)?;

        // Argument vector only; the URL is never passed through a shell.
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                LaunchError::ExecutableNotFound(self.config.program.display().to_string())
            }
            _ => LaunchError::SpawnFailed(e),
        })?;

        let pid = child.id().ok_or_else(|| {
            LaunchError::SpawnFailed(std::io::Error::other("worker exited during spawn"))
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let handle = Arc::new(WorkerHandle::new(pid, url.clone(), child));
        self.registry.register(handle.clone()).await;

        // No readiness handshake exists, so a successful spawn is "running".
        handle.set_state(WorkerState::Running).await;

        observer::attach(handle.clone(), self.registry.clone(), stdout, stderr);

        tracing::info!(pid, stream_url = %url, "stream worker started");
        Ok(handle)
    }

    /// Request termination of the worker with `pid`.
    ///
    /// Dispatches SIGTERM and returns once the signal is sent; the exit
    /// monitor removes the registry entry when the process is actually
    /// reaped. A worker that already exited (but whose exit has not been
    /// processed yet) counts as success.
    pub async fn stop(&self, pid: u32) -> Result<(), StopError> {
        let handle = self.registry.lookup(pid).await.ok_or(StopError::NotFound)?;

        handle.set_state(WorkerState::Stopping).await;
        Self::signal(&handle).await?;

        tracing::info!(pid, "worker termination requested");
        Ok(())
    }

    /// Request termination of every live worker. Used on shutdown.
    pub async fn stop_all(&self) {
        for handle in self.registry.active().await {
            if let Err(e) = self.stop(handle.pid).await {
                tracing::warn!(pid = handle.pid, error = %e, "failed to stop worker during shutdown");
            }
        }
    }

    #[cfg(unix)]
    async fn signal(handle: &WorkerHandle) -> Result<(), StopError> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        // Hold the child lock so the exit monitor cannot reap concurrently;
        // a reaped pid must not be signalled (it may have been recycled).
        let mut child = handle.child.lock().await;
        let already_exited = match child.as_mut() {
            None => true,
            Some(c) => c.try_wait().ok().flatten().is_some(),
        };
        if already_exited {
            return Ok(());
        }

        match kill(Pid::from_raw(handle.pid as i32), Signal::SIGTERM) {
            Ok(()) => Ok(()),
            // Already gone; the exit just has not been processed yet.
            Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(StopError::SignalFailed(std::io::Error::from_raw_os_error(
                errno as i32,
            ))),
        }
    }

    #[cfg(windows)]
    async fn signal(handle: &WorkerHandle) -> Result<(), StopError> {
        let mut child = handle.child.lock().await;
        match child.as_mut() {
            None => Ok(()),
            Some(child) => match child.start_kill() {
                Ok(()) => Ok(()),
                // start_kill on an already-exited child reports InvalidInput.
                Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
                Err(e) => Err(StopError::SignalFailed(e)),
            },
        }
    }
}
