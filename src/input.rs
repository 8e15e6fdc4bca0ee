use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::config::KeyBindings;
use crate::model::Trigger;

pub(crate) trait TriggerSource {
    /// Waits up to `timeout` for the next bound key; `Ok(None)` when nothing arrived.
    fn next_trigger(&mut self, timeout: Duration) -> Result<Option<Trigger>>;
}

pub(crate) struct KeyboardTriggers {
    keys: KeyBindings,
}

impl KeyboardTriggers {
    pub(crate) fn new(keys: KeyBindings) -> Self {
        Self { keys }
    }
}

impl TriggerSource for KeyboardTriggers {
    fn next_trigger(&mut self, timeout: Duration) -> Result<Option<Trigger>> {
        let mut wait = timeout;
        while event::poll(wait).context("poll input")? {
            if let Event::Key(key) = event::read().context("read input")? {
                if let Some(trigger) = trigger_for(&self.keys, key) {
                    return Ok(Some(trigger));
                }
            }
            wait = Duration::ZERO;
        }
        Ok(None)
    }
}

pub(crate) fn trigger_for(keys: &KeyBindings, key: KeyEvent) -> Option<Trigger> {
    if key.kind != KeyEventKind::Press || !key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    let c = c.to_ascii_lowercase();
    // Raw mode swallows SIGINT, so Ctrl+C has to stop the loop too.
    let bound = |key: char| c == key.to_ascii_lowercase();
    if bound(keys.quit) || c == 'c' {
        Some(Trigger::Quit)
    } else if bound(keys.refresh) {
        Some(Trigger::Refresh)
    } else if bound(keys.paste) {
        Some(Trigger::PasteCheck)
    } else {
        None
    }
}

/// Puts the terminal into raw mode until dropped.
pub(crate) struct RawModeGuard;

impl RawModeGuard {
    pub(crate) fn enable() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        disable_raw_mode().ok();
    }
}
