use std::io::{self, Write};

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

use crate::app::constants::LOG_TIME_FORMAT;

pub(crate) fn init_logging(verbose: bool) -> Result<()> {
    let default_directive = if verbose { "cpbftpchk=debug" } else { "cpbftpchk=info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_writer(raw_stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("init logging: {err}"))
}

fn raw_stderr() -> CrlfWriter<io::Stderr> {
    CrlfWriter::new(io::stderr())
}

/// Turns `\n` into `\r\n`; a raw-mode terminal does not return the carriage by itself.
pub(crate) struct CrlfWriter<W> {
    inner: W,
}

impl<W: Write> CrlfWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut start = 0;
        for (idx, byte) in buf.iter().enumerate() {
            if *byte == b'\n' {
                self.inner.write_all(&buf[start..idx])?;
                self.inner.write_all(b"\r\n")?;
                start = idx + 1;
            }
        }
        self.inner.write_all(&buf[start..])?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
