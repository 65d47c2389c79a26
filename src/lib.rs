// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! # worklog — weekly work log
//!
//! Records when work starts, continues and finishes, and reports the time
//! since the last start or finish. Records go to one file per week under
//! `$HOME/Worklog/` by default (`%Y/Week %U/%Y-%m-%d.log`).
//!
//! ## Log format
//!
//! One record per line, TAB-separated:
//!
//! - `2024-01-01 09:00:00<TAB>S<TAB>comment` — start
//! - `2024-01-01 09:30:00<TAB>|<TAB>comment` — continue
//! - `2024-01-01 12:00:00<TAB>F<TAB>comment Total of 3:00:00.` — finish
//!
//! ## Usage
//!
//! | Invocation           | Effect |
//! |----------------------|--------|
//! | `worklog [comment]`  | Start a period, or continue the open one. |
//! | `worklog -f [comment]` | Finish the open period. |
//! | `worklog -s`         | Show the last record and the elapsed time. |
//! | `worklog -d`         | Print the whole week's log and the elapsed time. |

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;

pub use config::Config;
pub use engine::{Breakpoint, Marker, Mode, WorkLog};
pub use error::{Error, Result};
