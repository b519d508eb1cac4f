//! Asynchronous job reaping.
//!
//! A dedicated thread turns SIGCHLD into job-table updates: it drains
//! every pending child-state change without blocking, classifies each
//! report (continued / stopped / exited / signaled), fires the one-time
//! job notices, and releases a job once every member is accounted for.
//! The same thread fields SIGTTIN/SIGTTOU raised against the shell when a
//! background jish touches the terminal.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::thread;

use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::getpgrp;
use signal_hook::consts::signal::{SIGCHLD, SIGTTIN, SIGTTOU};
use signal_hook::iterator::backend::Handle;
use signal_hook::iterator::Signals;
use tracing::trace;

use crate::jobs::{self, JobId, JobStatus, JobTable};
use crate::terminal::TerminalController;

/// Handle to the reaper thread; dropping it closes the signal stream.
pub struct Reaper {
    handle: Handle,
}

impl Reaper {
    /// Install signal handling and spawn the reaping thread.
    pub fn spawn(
        jobs: Arc<Mutex<JobTable>>,
        terminal: TerminalController,
    ) -> std::io::Result<Self> {
        let mut signals = Signals::new([SIGCHLD, SIGTTIN, SIGTTOU])?;
        let handle = signals.handle();

        thread::Builder::new().name("reaper".into()).spawn(move || {
            for signal in signals.forever() {
                match signal {
                    SIGCHLD => reap(&jobs, &terminal),
                    SIGTTIN | SIGTTOU => wait_for_terminal(&terminal),
                    _ => {}
                }
            }
        })?;

        Ok(Self { handle })
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.handle.close();
    }
}

/// Drain every pending child-state change without blocking.
///
/// SIGCHLD coalesces, so one delivery may stand for several children;
/// poll until nothing more is pending.
fn reap(jobs: &Mutex<JobTable>, terminal: &TerminalController) {
    let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;

    loop {
        let status = match waitpid(None, Some(flags)) {
            Ok(WaitStatus::StillAlive) => break,
            Err(_) => break, // no children left
            Ok(status) => status,
        };

        let mut table = jobs::lock(jobs);
        handle_report(&mut table, terminal, status);
    }
}

/// Apply one child-state report to its owning job.
fn handle_report(table: &mut JobTable, terminal: &TerminalController, status: WaitStatus) {
    let Some(pid) = status.pid() else {
        return;
    };
    let Some(job_id) = table.find_by_pid(pid) else {
        // A child we no longer track; nothing to reconcile.
        trace!(%pid, "reaped unknown pid");
        return;
    };
    let shell = getpgrp();

    match status {
        WaitStatus::Continued(_) => {
            // Take the terminal just long enough to print, then hand it
            // back to whoever had it.
            let previous = terminal.current_foreground();
            let _ = terminal.set_foreground(shell);
            if let Some(job) = table.get_mut(job_id) {
                if job.note_continued() {
                    notify(job_id, "continued", &job.name);
                }
            }
            let _ = terminal.set_foreground(previous);
        }
        WaitStatus::Stopped(_, _) => {
            let _ = terminal.set_foreground(shell);
            if let Some(job) = table.get_mut(job_id) {
                job.status = JobStatus::Stopped;
                if job.note_suspended() {
                    notify(job_id, "suspended", &job.name);
                }
            }
        }
        WaitStatus::Exited(_, _) | WaitStatus::Signaled(_, _, _) => {
            let _ = terminal.set_foreground(shell);
            let mut finished = false;
            if let Some(job) = table.get_mut(job_id) {
                if matches!(status, WaitStatus::Signaled(_, _, _)) {
                    job.status = JobStatus::Terminated;
                }
                if job.note_completed() {
                    if job.status == JobStatus::Background {
                        notify(job_id, "done", &job.name);
                    }
                    finished = true;
                }
            }
            if finished {
                // The only deallocation path for a job.
                table.release(job_id);
            }
        }
        _ => {}
    }
}

/// One-line job notice on stdout, flushed immediately: these fire from
/// the reaper thread, usually over a pending prompt.
fn notify(id: JobId, transition: &str, name: &str) {
    let mut out = std::io::stdout();
    let _ = writeln!(out, "\n[{}] + {}   {}", id, transition, name);
    let _ = out.flush();
}

/// A background shell touched the terminal. Spin, yielding, until
/// ownership returns to our own process group; signal context must not
/// assume blocking is safe.
fn wait_for_terminal(terminal: &TerminalController) {
    while terminal.current_foreground() != getpgrp() {
        thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    fn table_with_job(stage_count: usize, foreground: bool) -> (Mutex<JobTable>, JobId) {
        let mut table = JobTable::with_capacity(4);
        let id = table
            .allocate("a | b".into(), stage_count, foreground)
            .unwrap();
        for raw in 0..stage_count {
            table
                .get_mut(id)
                .unwrap()
                .push_pid(Pid::from_raw(100 + raw as i32));
        }
        (Mutex::new(table), id)
    }

    #[test]
    fn exit_reports_release_the_job_exactly_once() {
        let (jobs, id) = table_with_job(2, false);
        let terminal = TerminalController::detached();

        {
            let mut table = jobs::lock(&jobs);
            handle_report(
                &mut table,
                &terminal,
                WaitStatus::Exited(Pid::from_raw(100), 0),
            );
            assert!(table.is_valid(id), "job must survive a partial reap");

            handle_report(
                &mut table,
                &terminal,
                WaitStatus::Exited(Pid::from_raw(101), 0),
            );
            assert!(!table.is_valid(id), "job released once all members exit");
        }
    }

    #[test]
    fn stop_reports_mark_the_job_stopped() {
        let (jobs, id) = table_with_job(2, true);
        let terminal = TerminalController::detached();

        let mut table = jobs::lock(&jobs);
        handle_report(
            &mut table,
            &terminal,
            WaitStatus::Stopped(Pid::from_raw(100), Signal::SIGTSTP),
        );
        assert_eq!(table.get(id).unwrap().status, JobStatus::Stopped);
        assert_eq!(table.get(id).unwrap().suspended, 1);
    }

    #[test]
    fn signaled_members_mark_the_job_terminated() {
        let (jobs, id) = table_with_job(2, false);
        let terminal = TerminalController::detached();

        let mut table = jobs::lock(&jobs);
        handle_report(
            &mut table,
            &terminal,
            WaitStatus::Signaled(Pid::from_raw(100), Signal::SIGKILL, false),
        );
        assert_eq!(table.get(id).unwrap().status, JobStatus::Terminated);
        assert!(table.is_valid(id));

        handle_report(
            &mut table,
            &terminal,
            WaitStatus::Signaled(Pid::from_raw(101), Signal::SIGKILL, false),
        );
        assert!(!table.is_valid(id));
    }

    #[test]
    fn unknown_pids_are_ignored() {
        let (jobs, id) = table_with_job(1, false);
        let terminal = TerminalController::detached();

        let mut table = jobs::lock(&jobs);
        handle_report(
            &mut table,
            &terminal,
            WaitStatus::Exited(Pid::from_raw(9999), 0),
        );
        assert!(table.is_valid(id));
        assert_eq!(table.get(id).unwrap().completed, 0);
    }
}
