use std::process::ExitStatus;

/// Exit code used when the OS reports neither a code nor a signal.
const EXIT_STATUS_UNAVAILABLE: i32 = 1;

/// How a supervised toolchain invocation ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The child ran and terminated; `code` is its normalized exit code.
    Exited { code: i32 },
    /// The child could not be started at all.
    LaunchFailed {
        program: String,
        source: std::io::Error,
    },
}

impl RunOutcome {
    /// Outcome of a child that terminated with `status`.
    ///
    /// The child's code passes through unchanged. On Unix a signal death is
    /// reported as `128 + signal`, the way a shell shows it.
    pub fn from_status(status: ExitStatus) -> Self {
        let code = status
            .code()
            .or_else(|| signal_code(&status))
            .unwrap_or(EXIT_STATUS_UNAVAILABLE);
        RunOutcome::Exited { code }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RunOutcome::Exited { code } => Some(*code),
            RunOutcome::LaunchFailed { .. } => None,
        }
    }
}

#[cfg(unix)]
fn signal_code(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|sig| 128 + sig)
}

#[cfg(not(unix))]
fn signal_code(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn exit_codes_pass_through() {
        for code in [0, 1, 42, 255] {
            let outcome = RunOutcome::from_status(ExitStatus::from_raw(code << 8));
            assert_eq!(outcome.exit_code(), Some(code));
        }
    }

    #[test]
    fn signals_map_to_128_plus_signal() {
        // raw wait status 9: killed by SIGKILL
        let outcome = RunOutcome::from_status(ExitStatus::from_raw(9));
        assert_eq!(outcome.exit_code(), Some(137));
    }

    #[test]
    fn launch_failure_has_no_exit_code() {
        let outcome = RunOutcome::LaunchFailed {
            program: "dotnet".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(outcome.exit_code(), None);
    }
}
