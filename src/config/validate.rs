// src/config/validate.rs

use std::time::Duration;

use crate::classify::PatternTable;
use crate::config::model::{ConfigFile, RawConfigFile, RawSupervisorSection, SupervisorSection};
use crate::errors::{DiagwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DiagwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let supervisor = validate_supervisor(&raw.supervisor)?;
        // Compile once here so a bad regex fails at load time.
        PatternTable::with_extra(&raw.patterns)?;
        validate_engine(&raw)?;
        Ok(ConfigFile::new_unchecked(supervisor, raw.patterns, raw.engine))
    }
}

fn validate_supervisor(raw: &RawSupervisorSection) -> Result<SupervisorSection> {
    Ok(SupervisorSection {
        poll_interval: non_zero_duration("poll_interval", &raw.poll_interval)?,
        shutdown_grace: duration_field("shutdown_grace", &raw.shutdown_grace)?,
        death_timeout: non_zero_duration("death_timeout", &raw.death_timeout)?,
        tolerate_all_errors: raw.tolerate_all_errors,
        engine_signals_exit: raw.engine_signals_exit,
    })
}

fn validate_engine(raw: &RawConfigFile) -> Result<()> {
    if raw.engine.program.trim().is_empty() {
        return Err(DiagwatchError::ConfigError(
            "[engine].program must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn duration_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value).map_err(|e| {
        DiagwatchError::ConfigError(format!("[supervisor].{field}: {e}"))
    })
}

fn non_zero_duration(field: &str, value: &str) -> Result<Duration> {
    let dur = duration_field(field, value)?;
    if dur.is_zero() {
        return Err(DiagwatchError::ConfigError(format!(
            "[supervisor].{field} must be greater than zero"
        )));
    }
    Ok(dur)
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}
