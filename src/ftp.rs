use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use suppaftp::FtpStream;
use suppaftp::list::File;

use crate::app::backend::{RemoteHandle, resolve_addrs};
use crate::descriptor::ConnectionDescriptor;
use crate::model::{EntryKind, RemoteEntry};

const ANONYMOUS: &str = "anonymous";

pub(crate) struct FtpHandle {
    stream: FtpStream,
}

pub(crate) fn connect_ftp(config: &ConnectionDescriptor, timeout: Duration) -> Result<FtpHandle> {
    let mut last_err = None;
    let mut stream = None;
    for addr in resolve_addrs(config)? {
        match FtpStream::connect_timeout(addr, timeout) {
            Ok(connected) => {
                stream = Some(connected);
                break;
            }
            Err(err) => last_err = Some(err),
        }
    }
    let mut stream = match (stream, last_err) {
        (Some(stream), _) => stream,
        (None, Some(err)) => return Err(err).context("ftp connect"),
        (None, None) => anyhow::bail!("ftp connect failed: no address"),
    };
    stream.get_ref().set_read_timeout(Some(timeout)).ok();
    stream.get_ref().set_write_timeout(Some(timeout)).ok();

    let (user, password) = if config.username.is_empty() {
        (ANONYMOUS, ANONYMOUS)
    } else {
        (config.username.as_str(), config.password.as_str())
    };
    stream.login(user, password).context("ftp login")?;
    Ok(FtpHandle { stream })
}

impl RemoteHandle for FtpHandle {
    fn list(&mut self, path: &str) -> Result<Vec<RemoteEntry>> {
        let lines = self.stream.list(Some(path)).context("ftp list")?;
        Ok(parse_listing(&lines))
    }

    fn quit(&mut self) -> Result<()> {
        self.stream.quit().context("ftp quit")
    }
}

/// Parses `LIST` output, skipping lines that are neither Unix nor DOS style.
fn parse_listing(lines: &[String]) -> Vec<RemoteEntry> {
    lines
        .iter()
        .filter_map(|line| match File::from_str(line) {
            Ok(file) => Some(file),
            Err(err) => {
                tracing::debug!("skipping listing line {line:?}: {err}");
                None
            }
        })
        .filter(|file| file.name() != "." && file.name() != "..")
        .map(|file| RemoteEntry {
            name: file.name().to_string(),
            size: i64::try_from(file.size()).unwrap_or(i64::MAX),
            modified: DateTime::<Local>::from(file.modified()),
            kind: if file.is_directory() {
                EntryKind::Folder
            } else if file.is_file() {
                EntryKind::File
            } else {
                EntryKind::Unknown
            },
        })
        .collect()
}
