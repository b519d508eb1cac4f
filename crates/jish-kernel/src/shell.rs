//! The shell control-loop component.
//!
//! Owns the job table and terminal controller, validates parsed pipelines
//! before anything is spawned, dispatches job-control builtins, and
//! launches the executor. Every error is recovered here; only the `exit`
//! builtin leaves the process.

use std::fs::File;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::builtins::{self, Builtin};
use crate::error::{ShellError, ShellResult};
use crate::executor;
use crate::jobs::{self, JobTable};
use crate::lookup::command_found;
use crate::parse::{parse_cmdline, Pipeline};
use crate::reaper::Reaper;
use crate::signals;
use crate::terminal::TerminalController;

/// Outcome of pre-spawn validation.
enum Vetted {
    /// Every stage resolved; safe to allocate a job and spawn.
    Runnable,
    /// A job-control builtin consumed the line in-shell.
    Handled,
    /// A diagnostic was printed; drop the pipeline.
    Rejected,
}

pub struct Shell {
    jobs: Arc<Mutex<JobTable>>,
    terminal: TerminalController,
    _reaper: Reaper,
}

impl Shell {
    /// Build the shell: signal dispositions, job table, reaper thread.
    pub fn new() -> ShellResult<Self> {
        Self::with_terminal(TerminalController::new())
    }

    /// Build the shell around a specific terminal controller. Tests and
    /// embedders use a detached controller.
    pub fn with_terminal(terminal: TerminalController) -> ShellResult<Self> {
        signals::setup_shell_signals()?;

        let jobs = Arc::new(Mutex::new(JobTable::new()));
        let reaper = Reaper::spawn(Arc::clone(&jobs), terminal.clone())?;

        Ok(Self {
            jobs,
            terminal,
            _reaper: reaper,
        })
    }

    /// The shared job table, for callers that want to observe job state.
    pub fn jobs(&self) -> Arc<Mutex<JobTable>> {
        Arc::clone(&self.jobs)
    }

    /// Accept one command line: parse, validate, and launch.
    pub fn accept(&self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        let pipeline = match parse_cmdline(trimmed) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                println!("jish: {}", err);
                return;
            }
        };

        self.run_pipeline(trimmed, &pipeline);
    }

    fn run_pipeline(&self, cmdline: &str, pipeline: &Pipeline) {
        let mut table = jobs::lock(&self.jobs);

        match self.vet(pipeline, &mut table) {
            Vetted::Handled | Vetted::Rejected => return,
            Vetted::Runnable => {}
        }

        let job_id = match table.allocate(
            cmdline.to_string(),
            pipeline.stage_count(),
            !pipeline.background,
        ) {
            Ok(id) => id,
            Err(err) => {
                println!("jish: {}", err);
                return;
            }
        };

        // The table lock is held across the whole spawn so the reaper can
        // never observe a half-populated pid sequence.
        if let Err(err) = executor::execute_pipeline(pipeline, job_id, &mut table, &self.terminal) {
            eprintln!("jish: {}", err);
            // Already-spawned stages are never unwound; shrink the job to
            // the stages that exist so the reaper can still retire it.
            if let Some(job) = table.get_mut(job_id) {
                if job.pids.is_empty() {
                    table.release(job_id);
                } else {
                    job.stage_count = job.pids.len();
                }
            }
        }
    }

    /// Pre-spawn validation: the only point where a pipeline can still be
    /// stopped before any process exists.
    fn vet(&self, pipeline: &Pipeline, table: &mut JobTable) -> Vetted {
        for stage in &pipeline.stages {
            let builtin = Builtin::resolve(&stage.cmd);

            if builtin == Builtin::NotABuiltin && !command_found(&stage.cmd) {
                eprintln!("jish: {}", ShellError::CommandNotFound(stage.cmd.clone()));
                return Vetted::Rejected;
            }

            if builtin == Builtin::Exit {
                println!("Exiting...");
                std::process::exit(0);
            }

            if builtin.is_job_control() {
                builtins::dispatch(builtin, stage, table, &self.terminal);
                return Vetted::Handled;
            }
        }

        if let Some(path) = &pipeline.infile {
            if let Err(err) = File::open(path) {
                debug!(%err, %path, "input redirection unreadable");
                eprintln!("jish: {}", ShellError::InfileUnreadable(path.clone()));
                return Vetted::Rejected;
            }
        }

        if let Some(path) = &pipeline.outfile {
            // Created (and truncated) here, so the executor can reopen it
            // for writing without re-racing the permission check.
            if let Err(err) = File::create(path) {
                debug!(%err, %path, "output redirection uncreatable");
                eprintln!("jish: {}", ShellError::OutfileUncreatable(path.clone()));
                return Vetted::Rejected;
            }
        }

        Vetted::Runnable
    }
}
