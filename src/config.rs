// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! Run configuration: timestamp formats, log location and marker characters.
//!
//! Values come from an optional TOML file; every key falls back to the
//! built-in default. The resulting [`Config`] is immutable for the whole run.

use crate::error::{Error, Result};
use crate::engine::Marker;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default log directory under the home directory.
const DEFAULT_DIRECTORY: &str = "Worklog";

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// On-disk shape of the config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    date_format: Option<String>,
    time_format: Option<String>,
    directory: Option<String>,
    filename: Option<String>,
    start_char: Option<char>,
    continue_char: Option<char>,
    stop_char: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub date_format: String,
    pub time_format: String,
    /// Base directory; the formatted `filename` is joined onto it.
    pub directory: PathBuf,
    /// strftime template relative to `directory`. A slash creates a subdirectory.
    pub filename: String,
    pub start_char: char,
    pub continue_char: char,
    pub stop_char: char,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            directory: home_dir().join(DEFAULT_DIRECTORY),
            filename: default_filename(DEFAULT_DATE_FORMAT),
            start_char: 'S',
            continue_char: '|',
            stop_char: 'F',
        }
    }
}

/// Home directory, or `.` when it cannot be determined.
fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_filename(date_format: &str) -> String {
    format!("%Y/Week %U/{}.log", date_format)
}

/// Expands a leading `~` to the home directory.
fn expand_home(dir: &str) -> PathBuf {
    if dir == "~" {
        return home_dir();
    }
    match dir.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None => PathBuf::from(dir),
    }
}

/// Fails if `template` contains an unknown specifier or one a naive local
/// timestamp cannot render (e.g. `%Z`).
fn check_template(key: &str, template: &str) -> Result<()> {
    let sample = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::Config("could not build sample date".to_string()))?;
    let mut buf = String::new();
    write!(buf, "{}", sample.format(template))
        .map_err(|_| Error::Config(format!("{} has an invalid format: {:?}", key, template)))
}

impl Config {
    /// `~/.config/worklog/config.toml` (platform config dir), if one exists on this platform.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("worklog").join("config.toml"))
    }

    /// Loads `path` if given (it must exist), otherwise the default location
    /// (a missing default file yields the defaults).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            return Self::load_from(p);
        }
        match Self::default_path() {
            Some(p) if p.exists() => Self::load_from(&p),
            _ => {
                debug!("no config file, using defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parses config text directly; used where no file is involved.
    pub fn from_toml(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, origin: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| Error::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })?;
        let config = Self::from_file(file);
        config.validate()?;
        Ok(config)
    }

    fn from_file(file: ConfigFile) -> Self {
        let defaults = Self::default();
        let date_format = file.date_format.unwrap_or(defaults.date_format);
        let filename = file
            .filename
            .unwrap_or_else(|| default_filename(&date_format));
        Config {
            filename,
            date_format,
            time_format: file.time_format.unwrap_or(defaults.time_format),
            directory: file
                .directory
                .as_deref()
                .map(expand_home)
                .unwrap_or(defaults.directory),
            start_char: file.start_char.unwrap_or(defaults.start_char),
            continue_char: file.continue_char.unwrap_or(defaults.continue_char),
            stop_char: file.stop_char.unwrap_or(defaults.stop_char),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_template("date_format", &self.date_format)?;
        check_template("time_format", &self.time_format)?;
        check_template("filename", &self.filename)?;
        if self.filename.trim().is_empty() {
            return Err(Error::Config("filename must not be empty".to_string()));
        }
        if Path::new(&self.filename).has_root() {
            return Err(Error::Config(format!(
                "filename must be relative to directory: {:?}",
                self.filename
            )));
        }
        let markers = [
            ("start_char", self.start_char),
            ("continue_char", self.continue_char),
            ("stop_char", self.stop_char),
        ];
        for (key, c) in markers {
            if c == '\t' || c == '\n' || c == '\r' {
                return Err(Error::Config(format!("{} must not be a tab or newline", key)));
            }
        }
        if self.start_char == self.continue_char
            || self.start_char == self.stop_char
            || self.continue_char == self.stop_char
        {
            return Err(Error::Config(
                "start_char, continue_char and stop_char must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Format of the timestamp field: date and time joined by one space.
    pub fn full_date_format(&self) -> String {
        format!("{} {}", self.date_format, self.time_format)
    }

    /// Log file for the week containing `now`.
    pub fn log_path(&self, now: &NaiveDateTime) -> PathBuf {
        self.directory.join(now.format(&self.filename).to_string())
    }

    pub fn marker_char(&self, marker: Marker) -> char {
        match marker {
            Marker::Start => self.start_char,
            Marker::Continue => self.continue_char,
            Marker::Stop => self.stop_char,
        }
    }

    /// Marker for a character; `None` for anything outside the vocabulary.
    pub fn marker_for(&self, c: char) -> Option<Marker> {
        if c == self.start_char {
            Some(Marker::Start)
        } else if c == self.continue_char {
            Some(Marker::Continue)
        } else if c == self.stop_char {
            Some(Marker::Stop)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.full_date_format(), "%Y-%m-%d %H:%M:%S");
        assert_eq!(config.filename, "%Y/Week %U/%Y-%m-%d.log");
        assert!(config.directory.ends_with("Worklog"));
        assert_eq!(
            (config.start_char, config.continue_char, config.stop_char),
            ('S', '|', 'F')
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_path_uses_sunday_week_number() {
        let config = Config {
            directory: PathBuf::from("/logs"),
            ..Config::default()
        };
        // 2024-01-07 is the first Sunday of 2024, so it opens week 01.
        assert_eq!(
            config.log_path(&at(2024, 1, 6)),
            PathBuf::from("/logs/2024/Week 00/2024-01-06.log")
        );
        assert_eq!(
            config.log_path(&at(2024, 1, 7)),
            PathBuf::from("/logs/2024/Week 01/2024-01-07.log")
        );
    }

    #[test]
    fn test_from_toml_overrides() {
        let config = Config::from_toml(
            r#"
directory = "/tmp/wl"
date_format = "%d.%m.%Y"
start_char = "B"
stop_char = "E"
"#,
        )
        .unwrap();
        assert_eq!(config.directory, PathBuf::from("/tmp/wl"));
        assert_eq!(config.filename, "%Y/Week %U/%d.%m.%Y.log");
        assert_eq!(config.full_date_format(), "%d.%m.%Y %H:%M:%S");
        assert_eq!(config.start_char, 'B');
        assert_eq!(config.continue_char, '|');
        assert_eq!(config.stop_char, 'E');
    }

    #[test]
    fn test_from_toml_expands_home() {
        let config = Config::from_toml("directory = \"~/logs\"").unwrap();
        assert!(config.directory.ends_with("logs"));
        assert!(!config.directory.starts_with("~"));
    }

    #[test]
    fn test_from_toml_rejects_unknown_key() {
        let err = Config::from_toml("colour = \"red\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_from_toml_rejects_multi_char_marker() {
        assert!(Config::from_toml("start_char = \"ST\"").is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_markers() {
        let err = Config::from_toml("stop_char = \"S\"").unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_validate_rejects_tab_marker() {
        let err = Config::from_toml("continue_char = \"\\t\"").unwrap_err();
        assert!(err.to_string().contains("tab"));
    }

    #[test]
    fn test_validate_rejects_bad_template() {
        assert!(Config::from_toml("time_format = \"%H:%Q\"").is_err());
        assert!(Config::from_toml("filename = \"%Z.log\"").is_err());
    }

    #[test]
    fn test_validate_rejects_absolute_filename() {
        let err = Config::from_toml("directory = \"/base\"\nfilename = \"/abs/%Y.log\"").unwrap_err();
        assert!(err.to_string().contains("relative"));
        assert!(Config::from_toml("filename = \"logs/%Y.log\"").is_ok());
    }

    #[test]
    fn test_marker_lookup() {
        let config = Config::default();
        assert_eq!(config.marker_for('S'), Some(Marker::Start));
        assert_eq!(config.marker_for('|'), Some(Marker::Continue));
        assert_eq!(config.marker_for('F'), Some(Marker::Stop));
        assert_eq!(config.marker_for('X'), None);
        assert_eq!(config.marker_char(Marker::Stop), 'F');
    }

    #[test]
    fn test_load_from_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "directory = \"/srv/worklog\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.directory, PathBuf::from("/srv/worklog"));
    }
}
