use std::io::Write;
use std::time::Instant;

use anyhow::Result;

use crate::app::cache::RemoteCache;
use crate::clipboard::ClipboardSource;
use crate::config::Settings;
use crate::input::TriggerSource;
use crate::model::LoopState;

pub(crate) mod backend;
pub(crate) mod cache;
pub(crate) mod constants;
mod handlers;
pub(crate) mod logging;
pub(crate) mod matching;

/// Session state shared by the key triggers.
pub(crate) struct App<W: Write> {
    pub(crate) settings: Settings,
    pub(crate) state: LoopState,
    pub(crate) quit: bool,
    pub(crate) cache: RemoteCache,
    pub(crate) last_refresh: Instant,
    clipboard: Box<dyn ClipboardSource>,
    out: W,
}

impl<W: Write> App<W> {
    pub(crate) fn new(
        settings: Settings,
        cache: RemoteCache,
        clipboard: Box<dyn ClipboardSource>,
        out: W,
    ) -> Self {
        Self {
            settings,
            state: LoopState::Busy,
            quit: false,
            cache,
            last_refresh: Instant::now(),
            clipboard,
            out,
        }
    }

    /// Connects, loads the first listing and opens the loop for triggers.
    pub(crate) fn start(&mut self) -> Result<()> {
        self.print_status();
        self.cache.connect()?;
        self.last_refresh = Instant::now();
        self.refresh_cache();
        self.print_status();
        self.state = LoopState::Idle;
        Ok(())
    }

    pub(crate) fn run(&mut self, source: &mut dyn TriggerSource) -> Result<()> {
        let tick = self.settings.poll_interval();
        while !self.quit {
            if let Some(trigger) = source.next_trigger(tick)? {
                self.dispatch(trigger, source);
            }
        }
        Ok(())
    }

    pub(crate) fn shutdown(&mut self) {
        self.cache.disconnect();
    }
}
