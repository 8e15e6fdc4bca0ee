use std::io::Write;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, error, warn};

use crate::app::App;
use crate::app::constants::{SEPARATOR_LINE, SNAPSHOT_TIME_FORMAT};
use crate::app::matching::{extract_candidates, match_candidate};
use crate::input::TriggerSource;
use crate::model::{LoopState, Trigger};
use crate::ui::{Line, Tone, render_match, write_line};

impl<W: Write> App<W> {
    /// Runs one trigger to completion. Only `Quit` is honoured while busy.
    pub(crate) fn dispatch(&mut self, trigger: Trigger, source: &mut dyn TriggerSource) {
        match trigger {
            Trigger::Quit => {
                self.quit = true;
                return;
            }
            _ if self.state == LoopState::Busy => {
                debug!(?trigger, "busy, trigger ignored");
                return;
            }
            Trigger::Refresh => {
                self.state = LoopState::Busy;
                self.manual_refresh();
            }
            Trigger::PasteCheck => {
                self.state = LoopState::Busy;
                self.paste_check();
            }
        }
        self.drain_pending(source);
        self.state = LoopState::Idle;
    }

    // Keys pressed while the operation ran reach the guard before going idle.
    fn drain_pending(&mut self, source: &mut dyn TriggerSource) {
        loop {
            match source.next_trigger(Duration::ZERO) {
                Ok(Some(trigger)) => self.dispatch(trigger, source),
                Ok(None) => break,
                Err(err) => {
                    warn!("read input: {err:#}");
                    break;
                }
            }
        }
    }

    fn manual_refresh(&mut self) {
        self.last_refresh = Instant::now();
        self.emit(Line::new(Tone::Plain, SEPARATOR_LINE));
        self.refresh_cache();
        self.print_status();
    }

    fn paste_check(&mut self) {
        let text = match self.clipboard.read_text() {
            Ok(text) => text,
            Err(err) => {
                error!("clipboard: {err:#}");
                String::new()
            }
        };
        if self.last_refresh.elapsed() >= self.settings.refresh_every() {
            self.last_refresh = Instant::now();
            self.emit(Line::new(Tone::Plain, SEPARATOR_LINE));
            self.refresh_cache();
            self.print_status();
        }
        self.check_candidates(&text);
        self.emit(Line::new(Tone::Plain, SEPARATOR_LINE));
        self.print_status();
    }

    pub(super) fn refresh_cache(&mut self) {
        if let Err(err) = self.cache.refresh() {
            error!("refresh failed, keeping previous listing: {err:#}");
        }
    }

    fn check_candidates(&mut self, text: &str) {
        if self.cache.snapshot().is_none() {
            warn!("no remote listing available yet, every name reports as missing");
        }
        let now = Local::now();
        let stale_after = self.settings.stale_after();
        for candidate in extract_candidates(text) {
            let result = match_candidate(&candidate, self.cache.snapshot());
            let line = render_match(&result, now, stale_after);
            self.emit(line);
        }
    }

    pub(super) fn print_status(&mut self) {
        self.emit(Line::new(Tone::Hint, self.settings.keys.help_line()));
        let mut summary = self.cache.descriptor().summary();
        if !self.cache.is_connected() {
            summary.push_str(" (not connected)");
        }
        self.emit(Line::new(Tone::Plain, summary));
        let listed = self.cache.snapshot().map(|snapshot| {
            format!(
                "{} entries in {}, listed at {}",
                snapshot.entries.len(),
                snapshot.path,
                snapshot.fetched_at.format(SNAPSHOT_TIME_FORMAT)
            )
        });
        if let Some(listed) = listed {
            self.emit(Line::new(Tone::Plain, listed));
        }
        self.emit(Line::new(Tone::Plain, SEPARATOR_LINE));
    }

    fn emit(&mut self, line: Line) {
        if let Err(err) = write_line(&mut self.out, &line) {
            warn!("write output: {err}");
        }
    }
}
