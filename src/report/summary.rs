// src/report/summary.rs

use std::sync::LazyLock;

use regex::Regex;

/// First line of a component error that carries a Python traceback.
static TRACEBACK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Error: component .*: Traceback \(most recent call last\)")
        .expect("traceback pattern must compile")
});

const TRACEBACK_MARKER: &str = "Traceback";

/// Turn the first recorded fatal message into summary lines.
///
/// A message whose first line opens a traceback is collapsed to the error
/// prefix of that line plus the last line (the raised exception); the
/// frames in between are dropped. Any other message is returned line by
/// line. `None` or an empty message yields no lines.
pub fn format_error_summary(message: Option<&str>) -> Vec<String> {
    let Some(message) = message.filter(|m| !m.is_empty()) else {
        return Vec::new();
    };

    let lines: Vec<&str> = message.lines().collect();
    let Some(&first) = lines.first() else {
        return Vec::new();
    };

    if TRACEBACK_HEADER.is_match(first) {
        let head = first
            .split(TRACEBACK_MARKER)
            .next()
            .unwrap_or(first)
            .trim_end();
        let last = lines.last().copied().unwrap_or(first);
        return vec![head.to_string(), last.to_string()];
    }

    lines.into_iter().map(str::to_string).collect()
}
