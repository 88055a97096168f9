//! Line relays from child pipes to sinks.
//!
//! Each child stream gets its own task. A task reads complete lines, decodes
//! them strictly and hands them to its sink in the order they were read. Two
//! relays never share state, so no ordering exists between stdout and stderr.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::encoding::ConsoleEncoding;
use crate::error::RelayError;

#[cfg(windows)]
pub const LINE_TERMINATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_TERMINATOR: &str = "\n";

/// Child pipes are read as UTF-8 regardless of the console encoding.
const CHILD_ENCODING: ConsoleEncoding = ConsoleEncoding::Utf8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

/// Destination of relayed lines. Lines arrive without their terminator.
#[async_trait]
pub trait LineSink: Send {
    async fn accept(&mut self, line: String) -> std::io::Result<()>;
}

/// Writes each line plus [`LINE_TERMINATOR`] to a parent stream, encoded
/// with the console encoding, and flushes so output stays live.
///
/// On Windows, a UTF-16 sink attached to a real console writes through
/// `console::WideConsole` instead of `writer`.
pub struct ConsoleSink<W> {
    writer: W,
    encoding: ConsoleEncoding,
    #[cfg(windows)]
    wide: Option<crate::console::WideConsole>,
}

impl ConsoleSink<tokio::io::Stdout> {
    pub fn stdout(encoding: ConsoleEncoding) -> Self {
        let sink = Self::new(tokio::io::stdout(), encoding);
        #[cfg(windows)]
        let sink = sink.with_console(crate::console::WideConsole::stdout(encoding));
        sink
    }
}

impl ConsoleSink<tokio::io::Stderr> {
    pub fn stderr(encoding: ConsoleEncoding) -> Self {
        let sink = Self::new(tokio::io::stderr(), encoding);
        #[cfg(windows)]
        let sink = sink.with_console(crate::console::WideConsole::stderr(encoding));
        sink
    }
}

impl<W> ConsoleSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W, encoding: ConsoleEncoding) -> Self {
        Self {
            writer,
            encoding,
            #[cfg(windows)]
            wide: None,
        }
    }

    #[cfg(windows)]
    fn with_console(mut self, wide: Option<crate::console::WideConsole>) -> Self {
        self.wide = wide;
        self
    }

    /// True when lines bypass `writer` and go to the console as UTF-16.
    pub fn writes_wide(&self) -> bool {
        #[cfg(windows)]
        {
            self.wide.is_some()
        }
        #[cfg(not(windows))]
        {
            false
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> LineSink for ConsoleSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn accept(&mut self, mut line: String) -> std::io::Result<()> {
        line.push_str(LINE_TERMINATOR);
        #[cfg(windows)]
        if let Some(console) = &self.wide {
            return console.write(&line);
        }
        let bytes = self.encoding.encode(&line);
        self.writer.write_all(&bytes).await?;
        self.writer.flush().await
    }
}

/// Accumulates lines in memory. The receiving half is only drained after
/// the relay has finished.
pub struct CaptureSink {
    tx: mpsc::UnboundedSender<String>,
}

impl CaptureSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl LineSink for CaptureSink {
    async fn accept(&mut self, line: String) -> std::io::Result<()> {
        self.tx.send(line).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "capture receiver dropped")
        })
    }
}

/// A running relay task.
pub struct RelayHandle {
    stream: StreamKind,
    handle: JoinHandle<Result<u64, RelayError>>,
}

impl RelayHandle {
    /// Waits until the stream is closed and every line has been delivered.
    /// Returns the number of lines relayed.
    pub async fn finish(self) -> Result<u64, RelayError> {
        self.handle.await.map_err(|source| RelayError::Join {
            stream: self.stream.as_str(),
            source,
        })?
    }
}

/// Starts relaying `reader` into `sink` on its own task.
pub fn spawn_relay<R, S>(stream: StreamKind, reader: R, sink: S) -> RelayHandle
where
    R: AsyncRead + Unpin + Send + 'static,
    S: LineSink + 'static,
{
    let handle = tokio::spawn(relay_lines(stream, reader, sink));
    RelayHandle { stream, handle }
}

/// Relays until end of stream. End of stream is not forwarded as a line.
///
/// A line ends at `\n`, `\r\n` or a lone `\r`. A `\r` ends its line at
/// once; a `\n` arriving right after it, even in a later read, is dropped.
/// A final unterminated line is still delivered.
pub async fn relay_lines<R, S>(stream: StreamKind, reader: R, mut sink: S) -> Result<u64, RelayError>
where
    R: AsyncRead + Unpin,
    S: LineSink,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::with_capacity(256);
    let mut after_cr = false;
    let mut count = 0u64;

    loop {
        let chunk = reader.fill_buf().await.map_err(|source| RelayError::Io {
            stream: stream.as_str(),
            source,
        })?;
        if chunk.is_empty() {
            break;
        }

        let skip = usize::from(after_cr && chunk[0] == b'\n');
        after_cr = false;
        let rest = &chunk[skip..];
        let (used, ended) = match rest.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) => {
                line.extend_from_slice(&rest[..i]);
                after_cr = rest[i] == b'\r';
                (skip + i + 1, true)
            }
            None => {
                line.extend_from_slice(rest);
                (chunk.len(), false)
            }
        };
        reader.consume(used);

        if ended {
            deliver(stream, &line, &mut sink).await?;
            line.clear();
            count += 1;
        }
    }

    if !line.is_empty() {
        deliver(stream, &line, &mut sink).await?;
        count += 1;
    }

    tracing::debug!(target: "dotshim.relay", stream = stream.as_str(), lines = count, "stream closed");
    Ok(count)
}

async fn deliver<S: LineSink>(stream: StreamKind, raw: &[u8], sink: &mut S) -> Result<(), RelayError> {
    let line = CHILD_ENCODING
        .decode(raw)
        .ok_or(RelayError::Decode {
            stream: stream.as_str(),
            encoding: CHILD_ENCODING.name(),
        })?
        .into_owned();

    sink.accept(line).await.map_err(|source| RelayError::Io {
        stream: stream.as_str(),
        source,
    })
}
