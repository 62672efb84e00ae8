// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
/// Guards against a `Death()` method that never returns.
pub const DEFAULT_DEATH_TIMEOUT: Duration = Duration::from_secs(1800);

pub const DEFAULT_ENGINE_PROGRAM: &str = "rtmaps_runtime";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [supervisor]
/// poll_interval = "1s"
/// shutdown_grace = "2s"
/// death_timeout = "30m"
/// tolerate_all_errors = false
///
/// [patterns]
/// tolerated = ["Error: component MyCam_1: .*"]
///
/// [engine]
/// program = "/opt/rtmaps/bin/rtmaps_runtime"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub supervisor: RawSupervisorSection,

    #[serde(default)]
    pub patterns: PatternSection,

    #[serde(default)]
    pub engine: EngineSection,
}

/// `[supervisor]` section, durations still as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSupervisorSection {
    /// How often the control loop checks the run state.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// Delay after the diagram stopped, to let pending reports flush.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: String,

    /// Upper bound on waiting for `DEATH_FINISHED` reports.
    #[serde(default = "default_death_timeout")]
    pub death_timeout: String,

    /// Treat every reported error as tolerable. The
    /// `DIAGWATCH_TOLERATE_ERRORS` environment variable overrides this.
    #[serde(default)]
    pub tolerate_all_errors: bool,

    /// Whether the engine turns an `exit` command into a shutdown on its
    /// own. Defaults to `false` on Windows and `true` elsewhere.
    #[serde(default = "default_engine_signals_exit")]
    pub engine_signals_exit: bool,
}

fn default_poll_interval() -> String {
    "1s".to_string()
}

fn default_shutdown_grace() -> String {
    "2s".to_string()
}

fn default_death_timeout() -> String {
    "1800s".to_string()
}

fn default_engine_signals_exit() -> bool {
    !cfg!(windows)
}

impl Default for RawSupervisorSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            shutdown_grace: default_shutdown_grace(),
            death_timeout: default_death_timeout(),
            tolerate_all_errors: false,
            engine_signals_exit: default_engine_signals_exit(),
        }
    }
}

/// `[patterns]` section: extra regexes appended to the built-in tables.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct PatternSection {
    #[serde(default)]
    pub tolerated: Vec<String>,

    #[serde(default)]
    pub tolerated_in_shutdown: Vec<String>,

    #[serde(default)]
    pub timeout: Vec<String>,
}

/// `[engine]` section for the process-backed engine binding.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EngineSection {
    #[serde(default = "default_engine_program")]
    pub program: String,

    /// Arguments placed before the diagram path.
    #[serde(default = "default_engine_args")]
    pub args: Vec<String>,
}

fn default_engine_program() -> String {
    DEFAULT_ENGINE_PROGRAM.to_string()
}

fn default_engine_args() -> Vec<String> {
    vec!["--console".to_string(), "--no-X11".to_string()]
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            program: default_engine_program(),
            args: default_engine_args(),
        }
    }
}

/// Validated `[supervisor]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSection {
    pub poll_interval: Duration,
    pub shutdown_grace: Duration,
    pub death_timeout: Duration,
    pub tolerate_all_errors: bool,
    pub engine_signals_exit: bool,
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            death_timeout: DEFAULT_DEATH_TIMEOUT,
            tolerate_all_errors: false,
            engine_signals_exit: default_engine_signals_exit(),
        }
    }
}

/// Validated configuration.
///
/// Obtained via `ConfigFile::try_from(RawConfigFile)` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub supervisor: SupervisorSection,
    pub patterns: PatternSection,
    pub engine: EngineSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        supervisor: SupervisorSection,
        patterns: PatternSection,
        engine: EngineSection,
    ) -> Self {
        Self {
            supervisor,
            patterns,
            engine,
        }
    }

    /// Apply the environment's tolerate-all override, if present.
    pub fn with_tolerate_override(mut self, tolerate: Option<bool>) -> Self {
        if let Some(tolerate) = tolerate {
            self.supervisor.tolerate_all_errors = tolerate;
        }
        self
    }
}
