//! Launcher configuration.
//!
//! Read once from the environment at process start; immutable afterwards.

use std::env;
use std::path::PathBuf;

/// Configuration for spawning stream workers.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Worker executable.
    pub program: PathBuf,

    /// Fixed arguments placed before the stream URL (e.g. a script path).
    pub args: Vec<String>,

    /// Default stream URL used when a start request carries none.
    pub default_stream_url: Option<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("python"),
            args: Vec::new(),
            default_stream_url: None,
        }
    }
}

impl LauncherConfig {
    /// Build a config from the process environment.
    ///
    /// - `WORKER_EXECUTABLE`: worker program (default: `python`)
    /// - `WORKER_ARGS`: whitespace-separated fixed arguments placed before
    ///   the stream URL (e.g. the worker script path)
    /// - `STREAM_URL`: default stream URL for start requests that carry none
    pub fn from_env() -> Self {
        let program = env::var("WORKER_EXECUTABLE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("python"));

        let args = env::var("WORKER_ARGS")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let default_stream_url = env::var("STREAM_URL").ok().filter(|v| !v.is_empty());

        Self {
            program,
            args,
            default_stream_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_python() {
        let config = LauncherConfig::default();
        assert_eq!(config.program, PathBuf::from("python"));
        assert!(config.args.is_empty());
        assert!(config.default_stream_url.is_none());
    }
}
