//! Pipeline execution: process groups, pipes, and redirection.
//!
//! Turns a validated [`Pipeline`] into N processes sharing one process
//! group, wiring each stage's stdout to the next stage's stdin through
//! anonymous pipes. The shell never blocks on the pipeline here;
//! completion is observed asynchronously by the reaper.
//!
//! ```text
//! infile ──▶ stage[0] ──pipe──▶ stage[1] ──pipe──▶ stage[n-1] ──▶ outfile
//!               │                  │                   │
//!               └── setpgid ───────┴─── one group ─────┘
//! ```

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::os::fd::{IntoRawFd, RawFd};

use libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::errno::Errno;
use nix::unistd::{close, dup2, execvp, fork, getpid, pipe, setpgid, ForkResult, Pid};
use tracing::{debug, error};

use crate::builtins::{self, Builtin};
use crate::error::{ShellError, ShellResult};
use crate::jobs::{JobId, JobTable};
use crate::parse::{Pipeline, Stage};
use crate::signals;
use crate::terminal::TerminalController;

/// Duplicate `fd` onto `target` and close the original. Skipped when the
/// two already coincide, so an inherited standard descriptor stays open.
fn redirect(target: RawFd, fd: RawFd) -> nix::Result<()> {
    if fd != target {
        dup2(fd, target)?;
        close(fd)?;
    }
    Ok(())
}

/// Close `fd` unless it is the real stdin or stdout.
fn close_safe(fd: RawFd) {
    if fd != STDIN_FILENO && fd != STDOUT_FILENO {
        let _ = close(fd);
    }
}

/// One stage with its argv pre-converted, so the child side of fork does
/// no allocation.
struct PreparedStage<'a> {
    stage: &'a Stage,
    builtin: Builtin,
    argv: Vec<CString>,
}

fn prepare(stage: &Stage) -> ShellResult<PreparedStage<'_>> {
    let argv = stage
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ShellError::InvalidSyntax)?;

    Ok(PreparedStage {
        stage,
        builtin: Builtin::resolve(&stage.cmd),
        argv,
    })
}

fn open_infile(pipeline: &Pipeline) -> ShellResult<RawFd> {
    match &pipeline.infile {
        Some(path) => Ok(File::open(path)?.into_raw_fd()),
        None => Ok(STDIN_FILENO),
    }
}

fn open_outfile(pipeline: &Pipeline) -> ShellResult<RawFd> {
    match &pipeline.outfile {
        // Created and truncated during validation; reopened for writing.
        Some(path) => Ok(OpenOptions::new().write(true).open(path)?.into_raw_fd()),
        None => Ok(STDOUT_FILENO),
    }
}

/// Spawn every stage of `pipeline` into the job's process group.
///
/// The caller holds the job-table lock for the whole call: the reaper may
/// run the moment it is released, and must never observe a half-populated
/// pid sequence. Failures after the first fork are reported but never
/// unwind already-created siblings; those are reaped normally.
pub fn execute_pipeline(
    pipeline: &Pipeline,
    job_id: JobId,
    jobs: &mut JobTable,
    terminal: &TerminalController,
) -> ShellResult<()> {
    let stages = pipeline
        .stages
        .iter()
        .map(prepare)
        .collect::<ShellResult<Vec<_>>>()?;

    let mut input = open_infile(pipeline)?;
    let last = stages.len() - 1;
    let mut pgid: Option<Pid> = None;

    for (index, prepared) in stages.iter().enumerate() {
        let (output, next_input) = if index == last {
            (open_outfile(pipeline)?, None)
        } else {
            let (read_end, write_end) = pipe()?;
            (write_end.into_raw_fd(), Some(read_end.into_raw_fd()))
        };

        match unsafe { fork() }? {
            ForkResult::Child => {
                // Our copy of the next stage's stdin; the child has no use
                // for it.
                if let Some(fd) = next_input {
                    let _ = close(fd);
                }
                run_stage(prepared, pgid, input, output);
            }
            ForkResult::Parent { child } => {
                let group = pgid.unwrap_or(child);
                pgid = Some(group);

                // Parent and child race to assign the group; losing the
                // race shows up as EACCES once the child has exec'd.
                if let Err(err) = setpgid(child, group) {
                    if err != Errno::EACCES {
                        error!(%child, %err, "failed to assign process group");
                    }
                }

                if let Some(job) = jobs.get_mut(job_id) {
                    job.push_pid(child);
                }

                if !pipeline.background {
                    if let Err(err) = terminal.set_foreground(group) {
                        debug!(%err, "terminal handoff failed");
                    }
                }

                close_safe(output);
                close_safe(input);
                if let Some(fd) = next_input {
                    input = fd;
                }
            }
        }
    }

    if pipeline.background {
        if let Some(job) = jobs.get(job_id) {
            print_job_started(job_id, &job.pids);
        }
    }

    Ok(())
}

/// One-line start notice for a background job, printed before any member
/// necessarily finishes.
fn print_job_started(id: JobId, pids: &[Pid]) {
    let pids = pids
        .iter()
        .map(|pid| pid.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("[{}] {}", id, pids);
}

/// Child-side stage setup. Never returns.
fn run_stage(prepared: &PreparedStage<'_>, pgid: Option<Pid>, input: RawFd, output: RawFd) -> ! {
    signals::restore_child_signals();

    // Race the parent for group assignment so neither ordering leaves the
    // terminal handoff pointing at a group with no members.
    let pid = getpid();
    let _ = setpgid(pid, pgid.unwrap_or(pid));

    if redirect(STDIN_FILENO, input).is_err() || redirect(STDOUT_FILENO, output).is_err() {
        std::process::exit(1);
    }

    match prepared.builtin {
        Builtin::NotABuiltin => {
            let err = execvp(&prepared.argv[0], &prepared.argv);
            // Only reached when exec fails; the command vetted as present,
            // so this is a late disappearance or permission change.
            error!(cmd = %prepared.stage.cmd, ?err, "exec failed");
            std::process::exit(127);
        }
        builtin => {
            let code = builtins::run_in_child(builtin, prepared.stage);
            std::process::exit(code);
        }
    }
}
