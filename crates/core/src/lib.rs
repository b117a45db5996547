//! Worker process lifecycle management for the streamgate control plane.
//!
//! The control server spawns one external streaming worker per start request,
//! tracks it here by OS pid, watches its output and exit, and signals it on
//! stop. Nothing is persisted: restarting the control plane forgets all
//! workers.

pub mod config;
pub mod error;
mod observer;
pub mod registry;
pub mod worker;

pub use config::LauncherConfig;
pub use error::{LaunchError, StopError};
pub use registry::WorkerRegistry;
pub use worker::{WorkerHandle, WorkerLauncher, WorkerState};
