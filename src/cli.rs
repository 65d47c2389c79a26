// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

use crate::engine::Mode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "worklog")]
#[command(about = "Start, continue and finish work periods in a weekly log file", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Dump log file.
    #[arg(short, long)]
    pub dump: bool,

    /// Print working status and total time.
    #[arg(short, long)]
    pub status: bool,

    /// Finish working.
    #[arg(short, long)]
    pub finish: bool,

    /// Config file (default: worklog/config.toml in the user config directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Comment for the new record
    #[arg(value_name = "COMMENT")]
    pub comment: Vec<String>,
}

impl Cli {
    /// Dump takes precedence over status; anything else records.
    pub fn mode(&self) -> Mode {
        if self.dump {
            Mode::Dump
        } else if self.status {
            Mode::Status
        } else {
            Mode::Record {
                finish: self.finish,
                words: self.comment.clone(),
            }
        }
    }
}
