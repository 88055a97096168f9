//! Core of the dotshim launcher.
//!
//! Selects the console encoding, probes the toolchain for its SDK version,
//! then runs the toolchain with the caller's arguments while relaying its
//! output streams line by line.

pub mod config;
pub mod console;
pub mod encoding;
pub mod error;
pub mod locator;
pub mod probe;
pub mod runner;

pub use encoding::{select_encoding, ConsoleEncoding};
pub use error::{LauncherError, ProbeError, RelayError};
pub use locator::Toolchain;
pub use probe::{probe_version, SdkVersion};
pub use runner::{run_toolchain, RunOutcome};

/// Exit code reserved for an undeterminable SDK version.
pub const VERSION_UNKNOWN_EXIT_CODE: i32 = -1;
