use std::ffi::OsString;

use dotshim_core::config::{load_default, LauncherConfig};
use dotshim_core::console::apply_console_encoding;
use dotshim_core::runner::{join_args, ConsoleSink, LineSink};
use dotshim_core::{
    probe_version, run_toolchain, select_encoding, ConsoleEncoding, LauncherError, RunOutcome,
    Toolchain, VERSION_UNKNOWN_EXIT_CODE,
};

use crate::logging;

const EXIT_SETUP_FAILED: i32 = 1;
const EXIT_LAUNCH_FAILED: i32 = 126;
const EXIT_NOT_FOUND: i32 = 127;

pub async fn run_app() -> i32 {
    let cfg = match load_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("dotshim: {:#}", anyhow::Error::new(e));
            return EXIT_SETUP_FAILED;
        }
    };
    let _log_guard = match logging::init(&cfg.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("dotshim: {e:#}");
            return EXIT_SETUP_FAILED;
        }
    };

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let output_redirected = !atty::is(atty::Stream::Stdout);
    let encoding = select_encoding(output_redirected, &args);

    match launch(&cfg, &args, encoding).await {
        Ok(code) => code,
        Err(e) => report(e, encoding).await,
    }
}

/// Probes the SDK version, then runs the toolchain with `args` and returns
/// its exit code.
async fn launch(
    cfg: &LauncherConfig,
    args: &[OsString],
    encoding: ConsoleEncoding,
) -> Result<i32, LauncherError> {
    apply_console_encoding(encoding);

    let toolchain = Toolchain::locate(&cfg.toolchain);
    probe_version(&toolchain, &cfg.toolchain.probe_argument).await?;

    let command_line = join_args(args);
    match run_toolchain(&toolchain, &command_line, encoding).await? {
        RunOutcome::Exited { code } => Ok(code),
        RunOutcome::LaunchFailed { program, source } => {
            Err(LauncherError::Launch { program, source })
        }
    }
}

fn exit_code_for(err: &LauncherError) -> i32 {
    match err {
        LauncherError::Probe(_) => VERSION_UNKNOWN_EXIT_CODE,
        e if e.is_not_found() => EXIT_NOT_FOUND,
        LauncherError::Launch { .. } => EXIT_LAUNCH_FAILED,
        _ => EXIT_SETUP_FAILED,
    }
}

/// Writes the diagnostic for `err` to stderr in the console encoding and
/// returns the exit code to use.
async fn report(err: LauncherError, encoding: ConsoleEncoding) -> i32 {
    let code = exit_code_for(&err);
    let message = match err {
        LauncherError::Probe(e) => e.to_string(),
        other => format!("dotshim: {:#}", anyhow::Error::new(other)),
    };

    let mut stderr = ConsoleSink::stderr(encoding);
    if let Err(e) = stderr.accept(message).await {
        tracing::error!(error = %e, "failed to write diagnostic");
    }
    code
}
