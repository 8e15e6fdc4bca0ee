use chrono::{DateTime, Local};

use crate::app::constants::PARTIAL_SUFFIX;
use crate::model::{MatchResult, RemoteEntry, Snapshot};

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Pulls at most one filename-shaped token out of every line of `text`.
pub(crate) fn extract_candidates(text: &str) -> Vec<String> {
    text.split('\n').filter_map(extract_file_name).collect()
}

/// Picks the first run of name characters that carries an extension, or the first run at all.
// Skipping leading words like "Downloaded:" or "copy" is intended; a plain scan would stop at them.
fn extract_file_name(line: &str) -> Option<String> {
    let mut runs = line.split(|c: char| !is_name_char(c)).filter(|run| !run.is_empty());
    let first = runs.next()?;
    let chosen = if has_extension(first) {
        first
    } else {
        runs.find(|run| has_extension(run)).unwrap_or(first)
    };
    Some(chosen.to_string())
}

// A dot with a name character on both sides; rules out "..." and "Loading...".
fn has_extension(run: &str) -> bool {
    run.trim_matches('.').contains('.')
}

pub(crate) fn match_candidate(name: &str, snapshot: Option<&Snapshot>) -> MatchResult {
    let Some(snapshot) = snapshot else {
        return MatchResult::NotFound(name.to_string());
    };
    if let Some(entry) = snapshot.find(name) {
        return MatchResult::Found(entry.clone());
    }
    if let Some(entry) = snapshot.find(&format!("{name}{PARTIAL_SUFFIX}")) {
        return MatchResult::FoundAsPartial(entry.clone());
    }
    MatchResult::NotFound(name.to_string())
}

pub(crate) fn is_stale(entry: &RemoteEntry, now: DateTime<Local>, threshold: chrono::Duration) -> bool {
    now.signed_duration_since(entry.modified) > threshold
}
