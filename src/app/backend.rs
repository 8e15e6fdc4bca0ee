use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::descriptor::{ConnectionDescriptor, Protocol};
use crate::ftp::connect_ftp;
use crate::model::RemoteEntry;
use crate::ssh::connect_sftp;

#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// A live connection to the remote server.
pub(crate) trait RemoteHandle {
    fn list(&mut self, path: &str) -> Result<Vec<RemoteEntry>>;
    fn quit(&mut self) -> Result<()>;
}

pub(crate) trait Transport {
    fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<Box<dyn RemoteHandle>>;
}

#[derive(Debug)]
pub(crate) struct NetworkTransport {
    timeout: Duration,
}

impl NetworkTransport {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Transport for NetworkTransport {
    fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<Box<dyn RemoteHandle>> {
        match descriptor.protocol {
            Protocol::Ftp => Ok(Box::new(connect_ftp(descriptor, self.timeout)?)),
            Protocol::Sftp => Ok(Box::new(connect_sftp(descriptor, self.timeout)?)),
        }
    }
}

pub(crate) fn resolve_addrs(config: &ConnectionDescriptor) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (config.host.as_str(), config.port)
        .to_socket_addrs()
        .with_context(|| format!("resolve address {}:{}", config.host, config.port))?
        .collect();
    if addrs.is_empty() {
        anyhow::bail!("no address found for {}", config.host);
    }
    Ok(addrs)
}

#[cfg(test)]
type Script<T> = Arc<Mutex<VecDeque<Result<T, String>>>>;

#[cfg(test)]
#[derive(Default)]
pub(crate) struct MockTransport {
    connects: Mutex<VecDeque<Result<(), String>>>,
    lists: Script<Vec<RemoteEntry>>,
    connect_calls: Mutex<usize>,
    list_calls: Arc<Mutex<usize>>,
    quit_calls: Arc<Mutex<usize>>,
}

#[cfg(test)]
impl MockTransport {
    /// Connect attempts succeed unless a failure has been queued.
    pub(crate) fn push_connect(&self, result: Result<()>) {
        self.connects
            .lock()
            .unwrap()
            .push_back(result.map_err(|err| err.to_string()));
    }

    pub(crate) fn push_list(&self, result: Result<Vec<RemoteEntry>>) {
        self.lists
            .lock()
            .unwrap()
            .push_back(result.map_err(|err| err.to_string()));
    }

    pub(crate) fn connect_calls(&self) -> usize {
        *self.connect_calls.lock().unwrap()
    }

    pub(crate) fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    pub(crate) fn quit_calls(&self) -> usize {
        *self.quit_calls.lock().unwrap()
    }
}

#[cfg(test)]
impl Transport for MockTransport {
    fn connect(&self, _descriptor: &ConnectionDescriptor) -> Result<Box<dyn RemoteHandle>> {
        *self.connect_calls.lock().unwrap() += 1;
        if let Some(Err(err)) = self.connects.lock().unwrap().pop_front() {
            return Err(anyhow::anyhow!(err));
        }
        Ok(Box::new(MockHandle {
            lists: Arc::clone(&self.lists),
            list_calls: Arc::clone(&self.list_calls),
            quit_calls: Arc::clone(&self.quit_calls),
        }))
    }
}

#[cfg(test)]
struct MockHandle {
    lists: Script<Vec<RemoteEntry>>,
    list_calls: Arc<Mutex<usize>>,
    quit_calls: Arc<Mutex<usize>>,
}

#[cfg(test)]
impl RemoteHandle for MockHandle {
    fn list(&mut self, _path: &str) -> Result<Vec<RemoteEntry>> {
        *self.list_calls.lock().unwrap() += 1;
        match self.lists.lock().unwrap().pop_front() {
            Some(Ok(entries)) => Ok(entries),
            Some(Err(err)) => Err(anyhow::anyhow!(err)),
            None => Err(anyhow::anyhow!("no listing scripted")),
        }
    }

    fn quit(&mut self) -> Result<()> {
        *self.quit_calls.lock().unwrap() += 1;
        Ok(())
    }
}
