pub mod cmdline;
mod outcome;
mod run;
pub mod tee;

pub use cmdline::join_args;
pub use outcome::RunOutcome;
pub use run::{run_toolchain, run_toolchain_with};
pub use tee::{CaptureSink, ConsoleSink, LineSink, StreamKind, LINE_TERMINATOR};
