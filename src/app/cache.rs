use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::app::backend::{RemoteHandle, Transport};
use crate::descriptor::ConnectionDescriptor;
use crate::model::{EntryKind, Snapshot};

/// Last good listing of the configured remote directory plus the connection used to fetch it.
pub(crate) struct RemoteCache {
    descriptor: ConnectionDescriptor,
    transport: Arc<dyn Transport>,
    handle: Option<Box<dyn RemoteHandle>>,
    snapshot: Option<Snapshot>,
}

impl RemoteCache {
    pub(crate) fn new(descriptor: ConnectionDescriptor, transport: Arc<dyn Transport>) -> Self {
        Self {
            descriptor,
            transport,
            handle: None,
            snapshot: None,
        }
    }

    pub(crate) fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub(crate) fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub(crate) fn connect(&mut self) -> Result<()> {
        info!("connecting...");
        let handle = self
            .transport
            .connect(&self.descriptor)
            .with_context(|| format!("connect to {}", self.descriptor.summary()))?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Fetches a fresh listing, reconnecting at most once on failure.
    ///
    /// On error the previous snapshot stays in place.
    pub(crate) fn refresh(&mut self) -> Result<&Snapshot> {
        let path = self.descriptor.remote_dir().to_string();
        let first = match self.handle.as_mut() {
            Some(handle) => {
                info!("reading remote directory...");
                handle.list(&path)
            }
            None => Err(anyhow::anyhow!("not connected")),
        };
        let entries = match first {
            Ok(entries) => entries,
            Err(err) => {
                warn!("list {path}: {err:#}");
                self.reconnect()?;
                info!("reading remote directory...");
                let handle = self.handle.as_mut().context("reconnect left no handle")?;
                handle.list(&path).map_err(|err| {
                    error!("list {path}: {err:#}");
                    err
                })?
            }
        };
        let folders = entries
            .iter()
            .filter(|entry| entry.kind == EntryKind::Folder)
            .count();
        info!("{} entries in {path}", entries.len());
        debug!(folders, others = entries.len() - folders, "listing parsed");
        Ok(&*self.snapshot.insert(Snapshot::new(path, entries)))
    }

    fn reconnect(&mut self) -> Result<()> {
        info!("reconnecting...");
        if let Some(mut stale) = self.handle.take() {
            if let Err(err) = stale.quit() {
                warn!("close stale connection: {err:#}");
            }
        }
        self.connect().map_err(|err| {
            error!("{err:#}");
            err
        })
    }

    pub(crate) fn disconnect(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(err) = handle.quit() {
                warn!("disconnect: {err:#}");
            }
        }
    }
}
