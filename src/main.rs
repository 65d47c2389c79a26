// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

use chrono::Local;
use clap::Parser;
#[cfg(unix)]
use libc::{signal, SIGPIPE, SIG_IGN};
use std::io::{self, Write};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use worklog::cli::Cli;
use worklog::{Config, Error, WorkLog};

/// Diagnostics go to stderr, filtered by `WORKLOG_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("WORKLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> worklog::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let log = WorkLog::new(config, Local::now().naive_local())?;
    let mode = cli.mode();
    debug!(?mode, "dispatching");
    let stdout = io::stdout();
    let mut out = stdout.lock();
    log.run(&mode, &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() {
    #[cfg(unix)]
    unsafe {
        signal(SIGPIPE, SIG_IGN);
    }
    init_logging();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => {}
        Err(Error::Output(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
        Err(e) => {
            eprintln!("worklog: {}", e);
            process::exit(1);
        }
    }
}
