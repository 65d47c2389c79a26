// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! One run against the current week's log file.
//!
//! Every run re-reads the file: the last START or STOP record (the
//! breakpoint) decides the elapsed time, and the last line decides whether a
//! new record starts a period or continues one.

use crate::config::Config;
use crate::error::{Error, Result};
use chrono::{NaiveDateTime, TimeDelta};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shown instead of a duration when there is no breakpoint or it cannot be parsed.
pub const ELAPSED_ERROR: &str = "Error calculating working time.";

const SECS_PER_DAY: i64 = 86_400;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Start,
    Continue,
    Stop,
}

/// What a run does with the log file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Print the whole file, then the elapsed time.
    Dump,
    /// Print the last record, then the elapsed time.
    Status,
    /// Append a record. `finish` forces a STOP; `words` form the comment.
    Record { finish: bool, words: Vec<String> },
}

/// Result of scanning a log file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Breakpoint {
    /// Final line of the file, empty if the file is empty.
    pub last_line: String,
    /// Timestamp text of the last START or STOP record, empty if none.
    pub last_timestamp: String,
    /// Whether that record was a STOP.
    pub last_was_stop: bool,
}

pub struct WorkLog {
    config: Config,
    path: PathBuf,
    now: NaiveDateTime,
}

impl WorkLog {
    /// Validates `config` and resolves the log path for `now`; nothing
    /// touches the filesystem yet.
    pub fn new(config: Config, now: NaiveDateTime) -> Result<Self> {
        config.validate()?;
        let path = config.log_path(&now);
        debug!(path = %path.display(), "resolved log file");
        Ok(WorkLog { config, path, now })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn run(&self, mode: &Mode, out: &mut dyn Write) -> Result<()> {
        ensure_file(&self.path)?;
        let bp = find_last_breakpoint(&self.path, &self.config)?;
        let elapsed = elapsed_display(&bp.last_timestamp, bp.last_was_stop, &self.config, self.now);

        match mode {
            Mode::Dump => {
                let content = fs::read(&self.path).map_err(|e| Error::io(&self.path, e))?;
                out.write_all(&content)?;
                writeln!(out, "{}", elapsed)?;
            }
            Mode::Status => {
                writeln!(out, "{}", bp.last_line.trim())?;
                writeln!(out, "{}", elapsed)?;
            }
            Mode::Record { finish, words } => {
                let marker = determine_command(&bp.last_line, *finish, &self.config);
                debug!(?marker, "recording");
                let comment = join_comment(words);
                write_record(&self.path, &self.config, marker, &comment, &elapsed, self.now)?;
                match marker {
                    Marker::Start => writeln!(out, "Started.")?,
                    Marker::Continue => writeln!(out, "Continuing. {}", elapsed)?,
                    Marker::Stop => writeln!(out, "Stopped. {}", elapsed)?,
                }
            }
        }
        Ok(())
    }
}

/// Creates the log file and its parent directories if missing. Never modifies content.
pub fn ensure_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Offset of the first TAB and the character right after it.
fn marker_field(line: &str) -> Option<(usize, char)> {
    let pos = line.find('\t')?;
    let c = line[pos + 1..].chars().next()?;
    Some((pos, c))
}

/// Scans the whole file; the last START or STOP record wins.
///
/// A TAB at offset 0 (empty timestamp) never counts as a match.
pub fn find_last_breakpoint(path: &Path, config: &Config) -> Result<Breakpoint> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    let content = String::from_utf8_lossy(&bytes);
    let mut bp = Breakpoint::default();

    for line in content.lines() {
        bp.last_line = line.to_string();
        let Some((pos, c)) = marker_field(line) else {
            continue;
        };
        if pos == 0 {
            continue;
        }
        match config.marker_for(c) {
            Some(Marker::Start) => {
                bp.last_timestamp = line[..pos].to_string();
                bp.last_was_stop = false;
            }
            Some(Marker::Stop) => {
                bp.last_timestamp = line[..pos].to_string();
                bp.last_was_stop = true;
            }
            Some(Marker::Continue) | None => {}
        }
    }
    debug!(
        timestamp = %bp.last_timestamp,
        stopped = bp.last_was_stop,
        "breakpoint"
    );
    Ok(bp)
}

/// Renders a span like Python's `timedelta`, floored to whole seconds:
/// `1:02:03`, `1 day, 0:00:05`, `-1 day, 23:59:59`.
fn format_span(span: TimeDelta) -> String {
    let mut secs = span.num_seconds();
    if span < TimeDelta::seconds(secs) {
        secs -= 1;
    }
    let days = secs.div_euclid(SECS_PER_DAY);
    let rem = secs.rem_euclid(SECS_PER_DAY);
    let hms = format!("{}:{:02}:{:02}", rem / 3600, rem % 3600 / 60, rem % 60);
    match days {
        0 => hms,
        1 | -1 => format!("{} day, {}", days, hms),
        _ => format!("{} days, {}", days, hms),
    }
}

/// `MTBW <span>.` between work periods, `Total of <span>.` inside one.
pub fn elapsed_display(
    last_timestamp: &str,
    between_periods: bool,
    config: &Config,
    now: NaiveDateTime,
) -> String {
    if last_timestamp.is_empty() {
        return ELAPSED_ERROR.to_string();
    }
    let then = match NaiveDateTime::parse_from_str(last_timestamp, &config.full_date_format()) {
        Ok(t) => t,
        Err(e) => {
            debug!(timestamp = %last_timestamp, error = %e, "unparsable breakpoint");
            return ELAPSED_ERROR.to_string();
        }
    };
    let prefix = if between_periods { "MTBW " } else { "Total of " };
    format!("{}{}.", prefix, format_span(now - then))
}

/// STOP when finishing; CONTINUE after a START or CONTINUE; START otherwise.
pub fn determine_command(last_line: &str, finish: bool, config: &Config) -> Marker {
    if finish {
        return Marker::Stop;
    }
    match marker_field(last_line).and_then(|(_, c)| config.marker_for(c)) {
        Some(Marker::Start) | Some(Marker::Continue) => Marker::Continue,
        _ => Marker::Start,
    }
}

/// Comment words joined by single spaces; TABs would break the record format.
pub fn join_comment(words: &[String]) -> String {
    words.join(" ").trim().replace('\t', " ")
}

/// Appends one record; a STOP record carries the elapsed text after the comment.
pub fn write_record(
    path: &Path,
    config: &Config,
    marker: Marker,
    comment: &str,
    elapsed: &str,
    now: NaiveDateTime,
) -> Result<()> {
    let mut line = format!(
        "{}\t{}\t{}",
        now.format(&config.full_date_format()),
        config.marker_char(marker),
        comment
    );
    if marker == Marker::Stop {
        line.push(' ');
        line.push_str(elapsed);
    }
    line.push('\n');
    let mut f = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    f.write_all(line.as_bytes()).map_err(|e| Error::io(path, e))?;
    Ok(())
}
