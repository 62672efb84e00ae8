// src/classify/death.rs

//! Parsing of the `LONG_DEATH` / `DEATH_FINISHED` markers.
//!
//! Components announce a long-running shutdown callback with an info report
//! such as:
//!
//! ```text
//! Info: component CamSensor: entering Death() LONG_DEATH
//! Info: component CamSensor: leaving Death() DEATH_FINISHED
//! ```
//!
//! The `Info:` prefix is optional, since some bindings strip it.

pub const LONG_DEATH: &str = "LONG_DEATH";
pub const DEATH_FINISHED: &str = "DEATH_FINISHED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathMarkerKind {
    Begin,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathMarker {
    pub component: String,
    pub kind: DeathMarkerKind,
}

/// Extract a death marker from an info message, if it carries one.
pub fn parse_death_marker(message: &str) -> Option<DeathMarker> {
    let mut tokens: Vec<&str> = message.split_whitespace().collect();
    if tokens.first() == Some(&"Info:") {
        tokens.remove(0);
    }

    // "component", "<name>:", ..., "<command>"
    if tokens.len() < 3 || tokens[0] != "component" {
        return None;
    }

    let kind = match *tokens.last()? {
        LONG_DEATH => DeathMarkerKind::Begin,
        DEATH_FINISHED => DeathMarkerKind::End,
        _ => return None,
    };

    let component = tokens[1].strip_suffix(':').unwrap_or(tokens[1]);
    if component.is_empty() {
        return None;
    }

    Some(DeathMarker {
        component: component.to_string(),
        kind,
    })
}
