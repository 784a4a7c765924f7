//! Import configuration and the scene configuration file loader.
//!
//! # File format
//!
//! One `key;value[;charset]` entry per line, `#` starts a comment line:
//!
//! ```text
//! # Equil scenario, first two hours
//! network;data/network.xml;UTF-8
//! events;data/events.xml
//! ensembles;data/ensembles.xml;windows-1250
//! start_at;0
//! end_at;7200
//! target_duration;90
//! dialect;matsim
//! ```
//!
//! | Key               | Value                                            |
//! |-------------------|--------------------------------------------------|
//! | `network`         | path, optional charset (default `UTF-8`)         |
//! | `events`          | path, optional charset                           |
//! | `ensembles`       | path, optional charset                           |
//! | `start_at`        | seconds, non-negative                            |
//! | `end_at`          | seconds, non-negative                            |
//! | `target_duration` | replay length in whole seconds (default 60)      |
//! | `dialect`         | `matsim` (default) or `jdeeco`                   |
//!
//! Keys that only configure the viewer (`just_agents`, `showLinks`,
//! `scripts`, `plugins`, `pluginsDirs`) and any other unknown key are
//! ignored with a warning.  Every malformed line is reported, not just the
//! first one.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

use rv_core::TimeWindow;
use rv_core::attr::parse_time;
use rv_core::charset::encoding_for_label;
use rv_events::{Dialect, window::DEFAULT_THRESHOLD};

use crate::{ImportError, ImportResult};

/// Replay length used when the configuration does not set one.
pub const DEFAULT_TARGET_DURATION: u32 = 60;

// ── FileSpec ──────────────────────────────────────────────────────────────────

/// An input file and the character encoding it is written in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSpec {
    pub path:     PathBuf,
    /// WHATWG encoding label.
    pub encoding: String,
}

impl FileSpec {
    /// A UTF-8 file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), encoding: "UTF-8".to_owned() }
    }

    pub fn with_encoding(path: impl Into<PathBuf>, encoding: impl Into<String>) -> Self {
        Self { path: path.into(), encoding: encoding.into() }
    }
}

// ── LogDialect ────────────────────────────────────────────────────────────────

/// Which simulator wrote the events file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LogDialect {
    /// MATSim events; ensemble events come from a separate file.
    #[default]
    Matsim,
    /// jDEECo log; link and ensemble records share the events file.
    Jdeeco,
}

impl LogDialect {
    /// Dialect used for the movement events.
    pub fn movement(self) -> Dialect {
        match self {
            LogDialect::Matsim => Dialect::Matsim,
            LogDialect::Jdeeco => Dialect::Jdeeco,
        }
    }
}

impl FromStr for LogDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "matsim" => Ok(LogDialect::Matsim),
            "jdeeco" => Ok(LogDialect::Jdeeco),
            other => Err(format!("unknown dialect {other:?}: expected \"matsim\" or \"jdeeco\"")),
        }
    }
}

impl fmt::Display for LogDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogDialect::Matsim => "matsim",
            LogDialect::Jdeeco => "jdeeco",
        })
    }
}

// ── ImportConfig ──────────────────────────────────────────────────────────────

/// Everything one scene import needs.
///
/// Built fluently or loaded with [`load_config`]:
///
/// ```
/// use rv_core::TimeWindow;
/// use rv_import::{FileSpec, ImportConfig, LogDialect};
///
/// let config = ImportConfig::new(FileSpec::new("network.xml"))
///     .events(FileSpec::new("events.xml"))
///     .dialect(LogDialect::Matsim)
///     .window(TimeWindow::between(0.0, 3600.0))
///     .target_duration(120);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ImportConfig {
    pub network:             FileSpec,
    pub events:              Option<FileSpec>,
    pub ensembles:           Option<FileSpec>,
    pub window:              TimeWindow,
    pub dialect:             LogDialect,
    /// Length of the replay animation in seconds.
    pub target_duration:     u32,
    /// Event files at least this large are windowed before parsing.
    pub windowing_threshold: u64,
}

impl ImportConfig {
    pub fn new(network: FileSpec) -> Self {
        Self {
            network,
            events:              None,
            ensembles:           None,
            window:              TimeWindow::UNBOUNDED,
            dialect:             LogDialect::default(),
            target_duration:     DEFAULT_TARGET_DURATION,
            windowing_threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn events(mut self, events: FileSpec) -> Self {
        self.events = Some(events);
        self
    }

    /// Separate ensemble log (MATSim dialect only).
    pub fn ensembles(mut self, ensembles: FileSpec) -> Self {
        self.ensembles = Some(ensembles);
        self
    }

    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn dialect(mut self, dialect: LogDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn target_duration(mut self, seconds: u32) -> Self {
        self.target_duration = seconds;
        self
    }

    pub fn windowing_threshold(mut self, bytes: u64) -> Self {
        self.windowing_threshold = bytes;
        self
    }

    /// Check the values that do not depend on the input files.
    pub fn validate(&self) -> ImportResult<()> {
        let mut errors = Vec::new();
        if let (Some(start), Some(end)) = (self.window.start, self.window.end) {
            if start > end {
                errors.push(format!("start_at ({start}) is later than end_at ({end})"));
            }
        }
        if self.target_duration == 0 {
            errors.push("target_duration must be at least one second".to_owned());
        }
        let files = [Some(&self.network), self.events.as_ref(), self.ensembles.as_ref()];
        for spec in files.into_iter().flatten() {
            if encoding_for_label(&spec.encoding).is_none() {
                let path = spec.path.display();
                errors.push(format!("unknown charset {:?} for {path}", spec.encoding));
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(ImportError::Config(errors)) }
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Load an [`ImportConfig`] from a scene configuration file (UTF-8).
pub fn load_config(path: &Path) -> ImportResult<ImportConfig> {
    let file = File::open(path)?;
    load_config_reader(file)
}

/// Like [`load_config`] but accepts any `Read` source.
pub fn load_config_reader<R: Read>(reader: R) -> ImportResult<ImportConfig> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut errors = Vec::new();
    let mut network = None;
    let mut network_seen = false;
    let mut events = None;
    let mut ensembles = None;
    let mut window = TimeWindow::UNBOUNDED;
    let mut dialect = LogDialect::default();
    let mut target_duration = DEFAULT_TARGET_DURATION;

    for result in csv_reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                errors.push(e.to_string());
                continue;
            }
        };
        let line = record.position().map_or(0, |p| p.line());
        let key = record.get(0).unwrap_or("");

        let outcome = match key {
            "" => Ok(()),
            "network" => {
                network_seen = true;
                file_spec(&record).map(|f| network = Some(f))
            }
            "events" => file_spec(&record).map(|f| events = Some(f)),
            "ensembles" => file_spec(&record).map(|f| ensembles = Some(f)),
            "start_at" => {
                single(&record).and_then(|v| seconds(key, v)).map(|t| window.start = Some(t))
            }
            "end_at" => single(&record).and_then(|v| seconds(key, v)).map(|t| window.end = Some(t)),
            "target_duration" => single(&record)
                .and_then(whole_seconds)
                .map(|d| target_duration = d),
            "dialect" => single(&record).and_then(str::parse::<LogDialect>).map(|d| dialect = d),
            other => {
                warn!(line, key = other, "ignoring unsupported configuration key");
                Ok(())
            }
        };
        if let Err(msg) = outcome {
            errors.push(format!("[line {line}] {key}: {msg}"));
        }
    }

    if !network_seen {
        errors.push("no `network` entry".to_owned());
    }
    let network = match network {
        Some(network) if errors.is_empty() => network,
        _ => return Err(ImportError::Config(errors)),
    };

    let config = ImportConfig {
        network,
        events,
        ensembles,
        window,
        dialect,
        target_duration,
        windowing_threshold: DEFAULT_THRESHOLD,
    };
    config.validate()?;
    Ok(config)
}

// ── Field helpers ─────────────────────────────────────────────────────────────

fn file_spec(record: &csv::StringRecord) -> Result<FileSpec, String> {
    if record.len() < 2 {
        return Err("expected `key;path[;charset]`".to_owned());
    }
    if record.len() > 3 {
        return Err("too many `;`-separated values".to_owned());
    }
    let path = &record[1];
    if path.is_empty() {
        return Err("empty path".to_owned());
    }
    let encoding = record.get(2).filter(|c| !c.is_empty()).unwrap_or("UTF-8");
    if encoding_for_label(encoding).is_none() {
        return Err(format!("unknown charset {encoding:?}"));
    }
    Ok(FileSpec::with_encoding(path, encoding))
}

fn single(record: &csv::StringRecord) -> Result<&str, String> {
    match record.len() {
        2 => Ok(&record[1]),
        n => Err(format!("expected exactly one value, found {}", n.saturating_sub(1))),
    }
}

fn whole_seconds(value: &str) -> Result<u32, String> {
    value.parse().map_err(|e| format!("{value:?} is not a whole number of seconds: {e}"))
}

fn seconds(key: &str, value: &str) -> Result<f64, String> {
    parse_time("config", key, value).map_err(|e| e.to_string())
}
