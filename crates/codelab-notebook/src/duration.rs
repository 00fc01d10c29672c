//! `Duration: N` handling.
//!
//! Codelab sections announce their length with a line like `Duration: 5`. Inside
//! a section the first such marker is moved directly below the heading, and once
//! the notebook is assembled every duration line is rewritten to the canonical
//! `Duration: N minutes` form followed by a blank line.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MARKER: Regex = Regex::new(r"Duration:\s*(\d+)").expect("invalid regex expression");
    static ref DURATION_LINE: Regex =
        Regex::new(r"(?i)^Duration:\s*(\d+)\s*(?:minutes?)?\s*$").expect("invalid regex expression");
}

/// Whether a section's duration has been located yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationState {
    #[default]
    Unknown,
    Found(u64),
    Absent,
}

pub fn canonical_duration(minutes: u64) -> String {
    let unit = if minutes == 1 { "minute" } else { "minutes" };
    format!("Duration: {} {}", minutes, unit)
}

/// Finds the first duration marker in `line` whose minutes fit in a `u64`.
///
/// Returns the minutes and what is left of the line once the marker is cut out.
/// Markers with an out of range number are skipped and stay in the line.
pub fn find_marker(line: &str) -> Option<(u64, String)> {
    MARKER.captures_iter(line).find_map(|caps| {
        let minutes = caps[1].parse().ok()?;
        let whole = caps.get(0)?;
        let rest = format!("{}{}", &line[..whole.start()], &line[whole.end()..]);
        Some((minutes, rest.trim().to_string()))
    })
}

/// Moves the first duration marker in `lines` to the top of the section.
///
/// When `has_heading` is set the first line is the section heading: it is never
/// scanned and stays first. The buffer becomes `[heading, duration, "", rest..]`.
/// Returns the minutes found, leaving `lines` untouched when there is no marker.
pub fn hoist_duration(lines: &mut Vec<String>, has_heading: bool) -> Option<u64> {
    let skip = usize::from(has_heading && !lines.is_empty());
    let (idx, minutes, rest) = lines
        .iter()
        .enumerate()
        .skip(skip)
        .find_map(|(i, l)| find_marker(l).map(|(m, rest)| (i, m, rest)))?;

    if rest.is_empty() {
        lines.remove(idx);
    } else {
        lines[idx] = rest;
    }

    let tail = lines.split_off(skip);
    lines.push(canonical_duration(minutes));
    lines.push(String::new());
    lines.extend(tail);
    Some(minutes)
}

/// Canonicalizes every line consisting only of a duration and makes sure a
/// blank line separates it from the text that follows. Applying it twice is the
/// same as applying it once.
pub fn normalize_durations(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let minutes = DURATION_LINE
            .captures(line)
            .and_then(|c| c[1].parse::<u64>().ok());
        match minutes {
            Some(n) => {
                out.push(canonical_duration(n));
                if lines.get(i + 1).map_or(false, |next| !next.trim().is_empty()) {
                    out.push(String::new());
                }
            }
            None => out.push(line.to_string()),
        }
    }

    out.join("\n")
}
