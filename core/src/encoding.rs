//! Console encoding negotiation.
//!
//! Terminals and redirected pipes prefer different text encodings on the
//! hosts this launcher targets. The choice is made once, before any child is
//! spawned, and is then threaded by value into every sink that writes to the
//! parent console.

use std::borrow::Cow;
use std::ffi::OsStr;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

/// Argument token that forces UTF-8 output even on an interactive terminal.
pub const UTF8_OUTPUT_FLAG: &str = "/utf8output";

/// Text encoding of the launcher's own stdin/stdout/stderr.
///
/// Both variants are strict: malformed input is reported, never replaced,
/// and no byte-order mark is ever written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleEncoding {
    Utf8,
    Utf16 { big_endian: bool },
}

impl ConsoleEncoding {
    /// UTF-16 in the byte order of the host.
    pub fn native_utf16() -> Self {
        ConsoleEncoding::Utf16 {
            big_endian: cfg!(target_endian = "big"),
        }
    }

    pub fn encoding(&self) -> &'static Encoding {
        match self {
            ConsoleEncoding::Utf8 => UTF_8,
            ConsoleEncoding::Utf16 { big_endian: false } => UTF_16LE,
            ConsoleEncoding::Utf16 { big_endian: true } => UTF_16BE,
        }
    }

    pub fn name(&self) -> &'static str {
        self.encoding().name()
    }

    /// Windows code page identifier for this encoding.
    pub fn code_page(&self) -> u32 {
        match self {
            ConsoleEncoding::Utf8 => 65001,
            ConsoleEncoding::Utf16 { big_endian: false } => 1200,
            ConsoleEncoding::Utf16 { big_endian: true } => 1201,
        }
    }

    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            ConsoleEncoding::Utf8 => text.as_bytes().to_vec(),
            ConsoleEncoding::Utf16 { big_endian } => {
                let mut out = Vec::with_capacity(text.len() * 2);
                for unit in text.encode_utf16() {
                    if *big_endian {
                        out.extend_from_slice(&unit.to_be_bytes());
                    } else {
                        out.extend_from_slice(&unit.to_le_bytes());
                    }
                }
                out
            }
        }
    }

    /// Strict decode. Returns `None` on any malformed sequence.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        self.encoding()
            .decode_without_bom_handling_and_without_replacement(bytes)
    }
}

/// Picks the console encoding.
///
/// Redirected output, or `/utf8output` anywhere in `args`, selects UTF-8.
/// An interactive terminal without the flag selects native UTF-16.
pub fn select_encoding<I, S>(output_redirected: bool, args: I) -> ConsoleEncoding
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    if output_redirected || has_utf8_output_flag(args) {
        ConsoleEncoding::Utf8
    } else {
        ConsoleEncoding::native_utf16()
    }
}

fn has_utf8_output_flag<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .any(|a| a.as_ref() == OsStr::new(UTF8_OUTPUT_FLAG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NO_ARGS: [&str; 0] = [];

    #[test]
    fn redirected_output_selects_utf8() {
        assert_eq!(select_encoding(true, NO_ARGS), ConsoleEncoding::Utf8);
        assert_eq!(
            select_encoding(true, ["build", "-c", "Release"]),
            ConsoleEncoding::Utf8
        );
    }

    #[test]
    fn flag_selects_utf8_on_terminal() {
        assert_eq!(
            select_encoding(false, ["exec", "csc.dll", "/utf8output", "a.cs"]),
            ConsoleEncoding::Utf8
        );
    }

    #[test]
    fn terminal_without_flag_selects_native_utf16() {
        let enc = select_encoding(false, ["build"]);
        assert_eq!(enc, ConsoleEncoding::native_utf16());
        if cfg!(target_endian = "little") {
            assert_eq!(enc.name(), "UTF-16LE");
        } else {
            assert_eq!(enc.name(), "UTF-16BE");
        }
    }

    #[test]
    fn flag_must_match_whole_token() {
        assert_eq!(
            select_encoding(false, ["/utf8output:true", "/UTF8OUTPUT"]),
            ConsoleEncoding::native_utf16()
        );
    }

    #[test]
    fn selection_is_pure() {
        for redirected in [false, true] {
            for args in [vec!["build"], vec!["/utf8output"], vec![]] {
                assert_eq!(
                    select_encoding(redirected, &args),
                    select_encoding(redirected, &args)
                );
            }
        }
    }

    #[test]
    fn utf16_encoding_has_no_bom() {
        let le = ConsoleEncoding::Utf16 { big_endian: false };
        assert_eq!(le.encode("Hi"), vec![0x48, 0x00, 0x69, 0x00]);

        let be = ConsoleEncoding::Utf16 { big_endian: true };
        assert_eq!(be.encode("Hi"), vec![0x00, 0x48, 0x00, 0x69]);
    }

    #[test]
    fn utf16_encodes_surrogate_pairs() {
        let le = ConsoleEncoding::Utf16 { big_endian: false };
        assert_eq!(le.encode("\u{1F600}"), vec![0x3D, 0xD8, 0x00, 0xDE]);
    }

    #[test]
    fn utf8_encoding_is_identity() {
        assert_eq!(ConsoleEncoding::Utf8.encode("Build succeeded."), b"Build succeeded.");
    }

    #[test]
    fn strict_decode_rejects_malformed_input() {
        assert!(ConsoleEncoding::Utf8.decode(&[0x61, 0xFF, 0x62]).is_none());
        let le = ConsoleEncoding::Utf16 { big_endian: false };
        assert!(le.decode(&[0x41, 0x00, 0x42]).is_none());
    }

    #[test]
    fn strict_decode_keeps_bom_bytes() {
        let decoded = ConsoleEncoding::Utf8.decode(&[0xEF, 0xBB, 0xBF, 0x61]);
        assert_eq!(decoded.as_deref(), Some("\u{FEFF}a"));
    }

    #[test]
    fn code_pages() {
        assert_eq!(ConsoleEncoding::Utf8.code_page(), 65001);
        assert_eq!(ConsoleEncoding::Utf16 { big_endian: false }.code_page(), 1200);
        assert_eq!(ConsoleEncoding::Utf16 { big_endian: true }.code_page(), 1201);
    }
}
