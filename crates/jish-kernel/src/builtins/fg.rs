//! fg — move a job to the foreground, resuming it if stopped.

use nix::sys::signal::{kill, Signal};
use tracing::debug;

use crate::jobs::{JobStatus, JobTable};
use crate::terminal::TerminalController;

use super::parse_job_ref;

pub(super) fn run(argv: &[String], table: &mut JobTable, terminal: &TerminalController) {
    let Some(token) = argv.get(1) else {
        println!("Usage: fg %<job number>");
        return;
    };

    let id = match parse_job_ref(token, table) {
        Ok(id) => id,
        Err(err) => {
            println!("jish: {}", err);
            return;
        }
    };

    let Some(job) = table.get_mut(id) else {
        return;
    };

    if job.status == JobStatus::Stopped {
        for pid in &job.pids {
            if let Err(err) = kill(*pid, Signal::SIGCONT) {
                debug!(%pid, %err, "continue signal failed");
            }
        }
    }
    job.status = JobStatus::Foreground;

    let pgid = job.pgid;
    if let Err(err) = terminal.set_foreground(pgid) {
        debug!(%err, "terminal handoff failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foregrounds_a_stopped_job_without_terminal() {
        let mut table = JobTable::with_capacity(4);
        let id = table.allocate("sleep 100".into(), 1, false).unwrap();
        table.get_mut(id).unwrap().status = JobStatus::Stopped;

        // No pids recorded, so no signal is actually sent.
        let argv = vec!["fg".to_string(), "%0".to_string()];
        run(&argv, &mut table, &TerminalController::detached());

        assert_eq!(table.get(id).unwrap().status, JobStatus::Foreground);
    }

    #[test]
    fn invalid_reference_has_no_side_effect() {
        let mut table = JobTable::with_capacity(4);
        let id = table.allocate("sleep 100".into(), 1, false).unwrap();
        table.get_mut(id).unwrap().status = JobStatus::Stopped;

        let argv = vec!["fg".to_string(), "%7".to_string()];
        run(&argv, &mut table, &TerminalController::detached());

        assert_eq!(table.get(id).unwrap().status, JobStatus::Stopped);
    }
}
