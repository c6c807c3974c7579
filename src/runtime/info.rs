//! Track descriptions printed on request.

use std::io::Write;

use crate::playlist::Pick;

/// One-line summary of a pick: name, duration when known, and where it comes from.
pub fn describe(pick: &Pick) -> String {
    let track = &pick.track;
    let mut line = track.name.clone();
    let duration = track.metadata.as_ref().and_then(|m| m.duration_seconds);
    if let Some(seconds) = duration.filter(|s| *s > 0.0) {
        line.push_str(&format!(" [{}]", format_duration(seconds)));
    }
    line.push_str(&format!(" ({}) at {}", track.acquisition_arg, pick.occurrence));
    line
}

pub fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Print a line to stdout, terminated for a raw-mode terminal.
pub fn say(line: &str) {
    let mut out = std::io::stdout().lock();
    let _ = write!(out, "{line}\r\n");
    let _ = out.flush();
}
