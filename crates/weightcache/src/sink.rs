//! Destinations for eviction notices
//!
//! A [`NoticeSink`] receives one formatted line per eviction while the cache
//! is in verbose mode. It is called with the cache lock held: a slow sink
//! stalls every other cache operation, and calling back into the same cache
//! from inside a sink deadlocks.

use std::io::{self, Write};

/// Receives human-readable eviction notices
pub trait NoticeSink: Send {
    /// Deliver a single notice line (without trailing newline)
    fn notice(&mut self, line: &str) -> io::Result<()>;
}

impl NoticeSink for Box<dyn NoticeSink> {
    fn notice(&mut self, line: &str) -> io::Result<()> {
        (**self).notice(line)
    }
}

/// Writes each notice as a newline-terminated line to an [`io::Write`]
pub struct WriteSink<W> {
    writer: W,
}

impl<W: Write + Send> WriteSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> NoticeSink for WriteSink<W> {
    fn notice(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

/// Forwards notices to `tracing` at INFO level. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NoticeSink for LogSink {
    fn notice(&mut self, line: &str) -> io::Result<()> {
        tracing::info!(target: "weightcache::evict", "{}", line);
        Ok(())
    }
}

/// A sink backed by a closure
pub struct FnSink<F>(pub F);

impl<F> NoticeSink for FnSink<F>
where
    F: FnMut(&str) -> io::Result<()> + Send,
{
    fn notice(&mut self, line: &str) -> io::Result<()> {
        (self.0)(line)
    }
}
