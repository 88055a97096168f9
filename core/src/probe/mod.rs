//! SDK version probing.
//!
//! The host is run once in information mode and its stdout is captured
//! through a relay. The version is taken from the captured text; an unknown
//! version stops the launcher before the real invocation.

mod version;

use std::ffi::OsStr;
use std::process::Stdio;

pub use version::{extract_version, find_version_text, SdkVersion};

use crate::error::{LauncherError, ProbeError};
use crate::locator::Toolchain;
use crate::runner::tee::{spawn_relay, CaptureSink, StreamKind, LINE_TERMINATOR};

/// Runs `<host> <probe_argument>` and returns its stdout, one line per
/// relayed line, each followed by [`LINE_TERMINATOR`]. The probe's exit code
/// is not inspected.
pub async fn capture_info(
    toolchain: &Toolchain,
    probe_argument: &str,
) -> Result<String, LauncherError> {
    let program = toolchain.program();
    let mut cmd = toolchain.command(OsStr::new(probe_argument));
    // stderr is not read by the probe; discarding it keeps a chatty host
    // from blocking on a full pipe.
    cmd.stderr(Stdio::null());

    let mut child = cmd.spawn().map_err(|source| LauncherError::Launch {
        program: program.clone(),
        source,
    })?;
    tracing::debug!(target: "dotshim.probe", program = %program, pid = ?child.id(), "probe started");

    let Some(stdout) = child.stdout.take() else {
        return Err(LauncherError::Launch {
            program,
            source: std::io::Error::new(std::io::ErrorKind::Other, "stdout was not piped"),
        });
    };
    let (sink, mut lines) = CaptureSink::channel();
    let relay = spawn_relay(StreamKind::Stdout, stdout, sink);

    let status = child.wait().await.map_err(|source| LauncherError::Wait {
        program: program.clone(),
        source,
    })?;
    relay.finish().await?;
    tracing::debug!(target: "dotshim.probe", status = %status, "probe finished");

    let mut info = String::new();
    while let Ok(line) = lines.try_recv() {
        info.push_str(&line);
        info.push_str(LINE_TERMINATOR);
    }
    Ok(info)
}

/// Probes the toolchain for its SDK version.
pub async fn probe_version(
    toolchain: &Toolchain,
    probe_argument: &str,
) -> Result<SdkVersion, LauncherError> {
    let info = capture_info(toolchain, probe_argument).await?;
    match extract_version(&info) {
        Some(version) => {
            tracing::info!(target: "dotshim.probe", version = %version, "sdk version detected");
            Ok(version)
        }
        None => {
            tracing::warn!(
                target: "dotshim.probe",
                matched = ?find_version_text(&info),
                "sdk version unknown"
            );
            Err(ProbeError::UnknownVersion.into())
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn fake_host(dir: &TempDir, body: &str) -> Toolchain {
        let path = dir.path().join("dotnet");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        Toolchain::new(path)
    }

    #[tokio::test]
    async fn captures_lines_with_terminators() {
        let dir = TempDir::new().unwrap();
        let host = fake_host(&dir, "printf 'one\\r\\ntwo\\nthree'");

        let info = capture_info(&host, "--info").await.unwrap();

        assert_eq!(info, "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn probe_passes_the_info_argument() {
        let dir = TempDir::new().unwrap();
        let host = fake_host(
            &dir,
            "if [ \"$1\" = \"--info\" ] && [ $# -eq 1 ]; then echo 'Version: 7.0.100'; fi",
        );

        let version = probe_version(&host, "--info").await.unwrap();

        assert_eq!(version, SdkVersion::new(7, 0, 100));
    }

    #[tokio::test]
    async fn probe_exit_code_is_ignored() {
        let dir = TempDir::new().unwrap();
        let host = fake_host(&dir, "echo ' Version: 8.0.204'; echo oops >&2; exit 3");

        let version = probe_version(&host, "--info").await.unwrap();

        assert_eq!(version, SdkVersion::new(8, 0, 204));
    }

    #[tokio::test]
    async fn missing_version_is_unknown() {
        let dir = TempDir::new().unwrap();
        let host = fake_host(&dir, "echo 'no version here'");

        let err = probe_version(&host, "--info").await.unwrap_err();

        assert!(matches!(err, LauncherError::Probe(ProbeError::UnknownVersion)));
        assert_eq!(err.to_string(), "Cannot determine SDK version!");
    }

    #[tokio::test]
    async fn missing_host_is_a_launch_failure() {
        let dir = TempDir::new().unwrap();
        let host = Toolchain::new(dir.path().join("absent"));

        let err = probe_version(&host, "--info").await.unwrap_err();

        assert!(err.is_not_found());
    }
}
