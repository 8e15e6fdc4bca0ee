use std::io::{self, Write};

use chrono::{DateTime, Local};
use crossterm::style::Stylize;

use crate::app::constants::{
    ENTRY_TIME_FORMAT, NOT_FOUND_PLACEHOLDER, SIZE_ERROR, SIZE_UNITS,
};
use crate::app::matching::is_stale;
use crate::model::{MatchResult, RemoteEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tone {
    Found,
    Stale,
    Partial,
    Missing,
    Hint,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    pub(crate) tone: Tone,
    pub(crate) text: String,
}

impl Line {
    pub(crate) fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }
}

/// Three significant digits plus unit letter, then the last three digits: `  1M 234`.
pub(crate) fn format_size(size: i64) -> String {
    if size < 0 {
        return SIZE_ERROR.to_string();
    }
    let mut magnitude = size;
    let mut unit = 0;
    while magnitude >= 1000 {
        magnitude /= 1000;
        unit += 1;
    }
    format!("{magnitude:>3}{} {:03}", SIZE_UNITS[unit], size % 1000)
}

pub(crate) fn format_entry(entry: &RemoteEntry) -> String {
    format!(
        "{}|{}|{}",
        entry.modified.format(ENTRY_TIME_FORMAT),
        format_size(entry.size),
        entry.name
    )
}

pub(crate) fn render_match(
    result: &MatchResult,
    now: DateTime<Local>,
    stale_after: chrono::Duration,
) -> Line {
    let Some(entry) = result.entry() else {
        return Line::new(Tone::Missing, format!("{NOT_FOUND_PLACEHOLDER}{}", result.name()));
    };
    let tone = if is_stale(entry, now, stale_after) {
        Tone::Stale
    } else if matches!(result, MatchResult::FoundAsPartial(_)) {
        Tone::Partial
    } else {
        Tone::Found
    };
    Line::new(tone, format_entry(entry))
}

pub(crate) fn write_line<W: Write>(out: &mut W, line: &Line) -> io::Result<()> {
    let text = line.text.as_str();
    match line.tone {
        Tone::Found => writeln!(out, "{}", text.green()),
        Tone::Stale => writeln!(out, "{}", text.cyan()),
        Tone::Partial => writeln!(out, "{}", text.yellow()),
        Tone::Missing => writeln!(out, "{}", text.red()),
        Tone::Hint => writeln!(out, "{}", text.dark_yellow()),
        Tone::Plain => writeln!(out, "{text}"),
    }?;
    out.flush()
}
