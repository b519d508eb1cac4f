//! bg — resume a stopped job in the background.

use nix::sys::signal::{kill, Signal};
use tracing::debug;

use crate::jobs::{JobStatus, JobTable};

use super::parse_job_ref;

/// Resume every member of a stopped job without claiming the terminal;
/// ownership stays with the shell.
pub(super) fn run(argv: &[String], table: &mut JobTable) {
    let Some(token) = argv.get(1) else {
        println!("Usage: bg %<job number>");
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
        job.status = JobStatus::Background;
    }
}
