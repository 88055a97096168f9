use std::ffi::OsStr;

use crate::encoding::ConsoleEncoding;
use crate::error::LauncherError;
use crate::locator::Toolchain;

use super::outcome::RunOutcome;
use super::tee::{spawn_relay, ConsoleSink, LineSink, StreamKind};

/// Runs the toolchain with `command_line`, relaying its stdout and stderr to
/// the parent console streams.
pub async fn run_toolchain(
    toolchain: &Toolchain,
    command_line: &OsStr,
    encoding: ConsoleEncoding,
) -> Result<RunOutcome, LauncherError> {
    run_toolchain_with(
        toolchain,
        command_line,
        ConsoleSink::stdout(encoding),
        ConsoleSink::stderr(encoding),
    )
    .await
}

/// Runs the toolchain with explicit sinks for its two output streams.
///
/// Both relays are started before waiting on the child, and both are drained
/// after it exits. A launch failure is returned as an outcome; a relay or
/// wait failure is an error.
pub async fn run_toolchain_with<O, E>(
    toolchain: &Toolchain,
    command_line: &OsStr,
    stdout_sink: O,
    stderr_sink: E,
) -> Result<RunOutcome, LauncherError>
where
    O: LineSink + 'static,
    E: LineSink + 'static,
{
    let program = toolchain.program();
    let mut child = match toolchain.command(command_line).spawn() {
        Ok(child) => child,
        Err(source) => {
            tracing::error!(target: "dotshim.supervisor", program = %program, error = %source, "launch failed");
            return Ok(RunOutcome::LaunchFailed { program, source });
        }
    };
    tracing::debug!(
        target: "dotshim.supervisor",
        program = %program,
        pid = ?child.id(),
        command_line = %command_line.to_string_lossy(),
        "toolchain started"
    );

    let out_relay = child
        .stdout
        .take()
        .map(|stdout| spawn_relay(StreamKind::Stdout, stdout, stdout_sink));
    let err_relay = child
        .stderr
        .take()
        .map(|stderr| spawn_relay(StreamKind::Stderr, stderr, stderr_sink));

    let wait = child.wait().await;

    // Drain both relays even if waiting failed, so no output is lost.
    let out_done = match out_relay {
        Some(relay) => relay.finish().await.map(Some),
        None => Ok(None),
    };
    let err_done = match err_relay {
        Some(relay) => relay.finish().await.map(Some),
        None => Ok(None),
    };

    let status = wait.map_err(|source| LauncherError::Wait {
        program: program.clone(),
        source,
    })?;
    let stdout_lines = out_done?;
    let stderr_lines = err_done?;

    let outcome = RunOutcome::from_status(status);
    tracing::debug!(
        target: "dotshim.supervisor",
        exit_code = ?outcome.exit_code(),
        stdout_lines = ?stdout_lines,
        stderr_lines = ?stderr_lines,
        "toolchain exited"
    );
    Ok(outcome)
}
