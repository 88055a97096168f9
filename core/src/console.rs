use crate::encoding::ConsoleEncoding;

/// Applies the chosen encoding to the console input and output code pages.
///
/// Called once at start, before any child is spawned. A console that refuses
/// the code page (no console attached, or UTF-16 which cannot be a console
/// code page) keeps its current setting. UTF-16 text still reaches a Windows
/// console intact through `WideConsole`.
pub fn apply_console_encoding(encoding: ConsoleEncoding) {
    #[cfg(windows)]
    {
        use windows::Win32::System::Console::{SetConsoleCP, SetConsoleOutputCP};

        let cp = encoding.code_page();
        // SAFETY: plain Win32 calls taking a code page id by value.
        if let Err(e) = unsafe { SetConsoleCP(cp) } {
            tracing::debug!(target: "dotshim.console", code_page = cp, error = %e, "input code page not applied");
        }
        if let Err(e) = unsafe { SetConsoleOutputCP(cp) } {
            tracing::debug!(target: "dotshim.console", code_page = cp, error = %e, "output code page not applied");
        }
    }

    tracing::debug!(
        target: "dotshim.console",
        encoding = encoding.name(),
        code_page = encoding.code_page(),
        "console encoding selected"
    );
}

#[cfg(windows)]
pub use wide::WideConsole;

#[cfg(windows)]
mod wide {
    use std::ffi::c_void;
    use std::io;

    use windows::Win32::Foundation::HANDLE;
    use windows::Win32::System::Console::{
        GetConsoleMode, GetStdHandle, WriteConsoleW, CONSOLE_MODE, STD_ERROR_HANDLE, STD_HANDLE,
        STD_OUTPUT_HANDLE,
    };

    use crate::encoding::ConsoleEncoding;

    /// A console screen buffer written with UTF-16 text.
    ///
    /// Byte writes to a console go through a UTF-8 check in std, so UTF-16
    /// output has to bypass them. Only exists for a real console handle and a
    /// UTF-16 encoding; pipes and files keep the byte path.
    #[derive(Debug, Clone, Copy)]
    pub struct WideConsole {
        // raw HANDLE value, kept as an integer so sinks stay Send
        handle: isize,
    }

    impl WideConsole {
        pub fn stdout(encoding: ConsoleEncoding) -> Option<Self> {
            Self::for_handle(STD_OUTPUT_HANDLE, encoding)
        }

        pub fn stderr(encoding: ConsoleEncoding) -> Option<Self> {
            Self::for_handle(STD_ERROR_HANDLE, encoding)
        }

        pub(crate) fn for_handle(std_handle: STD_HANDLE, encoding: ConsoleEncoding) -> Option<Self> {
            if !matches!(encoding, ConsoleEncoding::Utf16 { .. }) {
                return None;
            }
            // SAFETY: GetStdHandle has no preconditions.
            let handle = unsafe { GetStdHandle(std_handle) }.ok()?;
            if handle.is_invalid() {
                return None;
            }
            let mut mode = CONSOLE_MODE::default();
            // SAFETY: `mode` is a valid out pointer; fails for non-console handles.
            unsafe { GetConsoleMode(handle, &mut mode) }.ok()?;
            Some(Self {
                handle: handle.0 as isize,
            })
        }

        /// Writes `text` as UTF-16 code units, retrying partial writes.
        pub fn write(&self, text: &str) -> io::Result<()> {
            let units: Vec<u16> = text.encode_utf16().collect();
            let handle = HANDLE(self.handle as *mut c_void);
            let mut rest = units.as_slice();
            while !rest.is_empty() {
                let mut written = 0u32;
                // SAFETY: `handle` was checked to be a console in `for_handle`
                // and `written` outlives the call.
                unsafe { WriteConsoleW(handle, rest, Some(&mut written as *mut u32), None) }
                    .map_err(io::Error::from)?;
                if written == 0 {
                    return Err(io::ErrorKind::WriteZero.into());
                }
                rest = &rest[(written as usize).min(rest.len())..];
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn utf8_never_uses_wide_console() {
            assert!(WideConsole::for_handle(STD_OUTPUT_HANDLE, ConsoleEncoding::Utf8).is_none());
            assert!(WideConsole::stderr(ConsoleEncoding::Utf8).is_none());
        }
    }
}
