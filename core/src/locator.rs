//! Toolchain host resolution and command construction.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::config::ToolchainConfig;

/// Picks the host executable: a non-empty override wins, otherwise the
/// default name is left for the search path to resolve.
pub fn resolve_host_path(env_value: Option<OsString>, default_host: &str) -> PathBuf {
    match env_value {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => PathBuf::from(default_host),
    }
}

/// The toolchain host to invoke. Every call to [`Toolchain::command`]
/// produces a fresh child; nothing is shared between invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    host: PathBuf,
}

impl Toolchain {
    pub fn new(host: impl Into<PathBuf>) -> Self {
        Self { host: host.into() }
    }

    /// Resolves the host from the environment. Existence is not checked here;
    /// a missing executable shows up when the process is launched.
    pub fn locate(cfg: &ToolchainConfig) -> Self {
        let host = resolve_host_path(std::env::var_os(&cfg.host_path_var), &cfg.default_host);
        tracing::debug!(target: "dotshim.locator", host = %host.display(), "toolchain host resolved");
        Self { host }
    }

    pub fn host(&self) -> &Path {
        &self.host
    }

    pub fn program(&self) -> String {
        self.host.display().to_string()
    }

    /// Builds a command running the host with `command_line`.
    ///
    /// stdout and stderr are piped, stdin is null, and on Windows no console
    /// window is created.
    pub fn command(&self, command_line: &OsStr) -> Command {
        let mut cmd = Command::new(&self.host);
        apply_command_line(&mut cmd, command_line);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use windows::Win32::System::Threading::CREATE_NO_WINDOW;
            cmd.creation_flags(CREATE_NO_WINDOW.0);
        }

        cmd
    }
}

#[cfg(windows)]
fn apply_command_line(cmd: &mut Command, command_line: &OsStr) {
    if !command_line.is_empty() {
        cmd.raw_arg(command_line);
    }
}

#[cfg(unix)]
fn apply_command_line(cmd: &mut Command, command_line: &OsStr) {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let args = crate::runner::cmdline::split_command_line(command_line.as_bytes());
    cmd.args(args.into_iter().map(OsString::from_vec));
}
