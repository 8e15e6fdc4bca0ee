use std::io;
use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use ssh2::{KeyboardInteractivePrompt, Prompt, Session, Sftp};

use crate::app::backend::{RemoteHandle, resolve_addrs};
use crate::descriptor::ConnectionDescriptor;
use crate::model::{EntryKind, RemoteEntry};

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;
const S_IFREG: u32 = 0o100000;

pub(crate) struct SftpHandle {
    // Keeps the transport alive for the sftp channel.
    session: Session,
    sftp: Sftp,
}

pub(crate) fn connect_sftp(config: &ConnectionDescriptor, timeout: Duration) -> Result<SftpHandle> {
    let mut last_err = None;
    let mut tcp = None;
    for addr in resolve_addrs(config)? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                tcp = Some(stream);
                break;
            }
            Err(err) => last_err = Some(err),
        }
    }
    let tcp = tcp.ok_or_else(|| {
        let err = last_err.unwrap_or_else(|| io::Error::other("connect failed"));
        anyhow::anyhow!("connect tcp failed: {err}")
    })?;
    tcp.set_read_timeout(Some(timeout)).ok();
    tcp.set_write_timeout(Some(timeout)).ok();

    let mut session = Session::new().context("create session")?;
    session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
    session.set_tcp_stream(tcp);
    session.handshake().context("ssh handshake")?;

    if let Err(err) = session.userauth_password(&config.username, &config.password) {
        tracing::debug!("password auth rejected ({err}), trying keyboard-interactive");
        let mut answers = PasswordAnswers(&config.password);
        session
            .userauth_keyboard_interactive(&config.username, &mut answers)
            .context("keyboard-interactive auth")?;
    }
    if !session.authenticated() {
        anyhow::bail!("Authentication failed");
    }

    let sftp = session.sftp().context("open sftp")?;
    Ok(SftpHandle { session, sftp })
}

/// Answers every keyboard-interactive question with the stored password.
struct PasswordAnswers<'a>(&'a str);

impl KeyboardInteractivePrompt for PasswordAnswers<'_> {
    fn prompt<'b>(
        &mut self,
        _username: &str,
        _instructions: &str,
        prompts: &[Prompt<'b>],
    ) -> Vec<String> {
        prompts.iter().map(|_| self.0.to_string()).collect()
    }
}

impl RemoteHandle for SftpHandle {
    fn list(&mut self, path: &str) -> Result<Vec<RemoteEntry>> {
        let mut entries = Vec::new();
        for (child, stat) in self.sftp.readdir(Path::new(path)).context("read remote dir")? {
            let name = child
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| String::from("/"));
            if name == "." || name == ".." {
                continue;
            }
            entries.push(RemoteEntry {
                name,
                size: stat
                    .size
                    .map(|size| i64::try_from(size).unwrap_or(i64::MAX))
                    .unwrap_or(0),
                modified: stat.mtime.and_then(epoch_to_local).unwrap_or_default(),
                kind: kind_from_perm(stat.perm),
            });
        }
        Ok(entries)
    }

    fn quit(&mut self) -> Result<()> {
        self.session
            .disconnect(None, "bye", None)
            .context("ssh disconnect")
    }
}

fn epoch_to_local(secs: u64) -> Option<DateTime<Local>> {
    let secs = i64::try_from(secs).ok()?;
    DateTime::from_timestamp(secs, 0).map(|utc| utc.with_timezone(&Local))
}

fn kind_from_perm(perm: Option<u32>) -> EntryKind {
    match perm.map(|perm| perm & S_IFMT) {
        Some(S_IFDIR) => EntryKind::Folder,
        Some(S_IFREG) => EntryKind::File,
        _ => EntryKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_perm_reads_file_type_bits() {
        assert_eq!(kind_from_perm(Some(0o040755)), EntryKind::Folder);
        assert_eq!(kind_from_perm(Some(0o100644)), EntryKind::File);
        assert_eq!(kind_from_perm(Some(0o120777)), EntryKind::Unknown);
        assert_eq!(kind_from_perm(None), EntryKind::Unknown);
    }

    #[test]
    fn epoch_to_local_converts_seconds() {
        let local = epoch_to_local(0).unwrap();
        assert_eq!(local.timestamp(), 0);
    }
}
