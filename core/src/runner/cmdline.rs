//! Single-string command lines.
//!
//! The toolchain receives the launcher's arguments as one command line: the
//! argument vector joined by single spaces, with no re-quoting. Windows hands
//! that string to the child as-is. Elsewhere it is split back into argv with
//! the MSVCRT-compatible rules the toolchain host applies itself, so both
//! platforms see the same arguments.

use std::ffi::{OsStr, OsString};

/// Joins `args` with single spaces. Quotes and whitespace inside arguments
/// are passed through untouched.
pub fn join_args<S: AsRef<OsStr>>(args: &[S]) -> OsString {
    let mut line = OsString::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            line.push(" ");
        }
        line.push(arg);
    }
    line
}

/// Splits a command line into arguments.
///
/// Spaces and tabs separate arguments outside quotes. `"` toggles quoting and
/// `""` inside quotes is a literal quote. A run of backslashes followed by a
/// quote yields half the backslashes; an odd leftover escapes the quote.
/// Backslashes not followed by a quote are literal.
#[cfg_attr(windows, allow(dead_code))]
pub fn split_command_line(line: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < line.len() {
        while i < line.len() && is_blank(line[i]) {
            i += 1;
        }
        if i == line.len() {
            break;
        }
        out.push(next_argument(line, &mut i));
        i += 1;
    }

    out
}

#[cfg_attr(windows, allow(dead_code))]
fn next_argument(line: &[u8], i: &mut usize) -> Vec<u8> {
    let mut arg = Vec::new();
    let mut in_quotes = false;

    while *i < line.len() {
        let mut backslashes = 0;
        while *i < line.len() && line[*i] == b'\\' {
            *i += 1;
            backslashes += 1;
        }

        if backslashes > 0 {
            if *i >= line.len() || line[*i] != b'"' {
                arg.extend(std::iter::repeat(b'\\').take(backslashes));
            } else {
                arg.extend(std::iter::repeat(b'\\').take(backslashes / 2));
                if backslashes % 2 != 0 {
                    arg.push(b'"');
                    *i += 1;
                }
            }
            continue;
        }

        let c = line[*i];
        if c == b'"' {
            if in_quotes && *i + 1 < line.len() && line[*i + 1] == b'"' {
                arg.push(b'"');
                *i += 1;
            } else {
                in_quotes = !in_quotes;
            }
            *i += 1;
            continue;
        }

        if is_blank(c) && !in_quotes {
            break;
        }

        arg.push(c);
        *i += 1;
    }

    arg
}

#[cfg_attr(windows, allow(dead_code))]
fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t'
}
