//! jish-kernel (仕): The job-control core of jish.
//!
//! This crate provides:
//!
//! - **Parse**: A minimal pipeline parser (stages, redirections, `&`)
//! - **Jobs**: The fixed-capacity job table and job records
//! - **Terminal**: Terminal foreground-ownership handoff
//! - **Executor**: Process-group construction for pipelines
//! - **Reaper**: SIGCHLD-driven reconciliation of job state
//! - **Builtins**: `jobs`, `fg`, `bg`, `kill`, `which`, `exit`
//! - **Shell**: The control-loop component tying the above together

pub mod builtins;
pub mod error;
pub mod executor;
pub mod jobs;
pub mod lookup;
pub mod parse;
pub mod reaper;
pub mod shell;
pub mod signals;
pub mod terminal;

pub use builtins::Builtin;
pub use error::{ShellError, ShellResult};
pub use jobs::{Job, JobId, JobStatus, JobTable};
pub use parse::{parse_cmdline, Pipeline, Stage};
pub use shell::Shell;
pub use terminal::TerminalController;
