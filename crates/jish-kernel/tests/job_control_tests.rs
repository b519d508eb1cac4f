//! End-to-end job-control scenarios.
//!
//! These spawn real processes and rely on the reaper thread. Everything
//! shares one test body: the reaper waits on any child of the test
//! process, so parallel shells would steal each other's exit reports.

use std::time::{Duration, Instant};

use jish_kernel::jobs;
use jish_kernel::{JobStatus, Shell, TerminalController};

fn wait_until(mut pred: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn job_control_end_to_end() {
    let shell = Shell::with_terminal(TerminalController::detached()).expect("shell construction");
    let table = shell.jobs();

    // A background three-stage pipeline occupies one slot with three pids
    // sharing the first pid as process group.
    shell.accept("sleep 1 | sleep 1 | sleep 1 &");
    {
        let table = jobs::lock(&table);
        let (id, job) = table.iter().next().expect("job allocated");
        assert_eq!(id.0, 0);
        assert_eq!(job.stage_count, 3);
        assert_eq!(job.pids.len(), 3);
        assert_eq!(job.pgid, job.pids[0]);
        assert_eq!(job.status, JobStatus::Background);
    }
    assert!(
        wait_until(|| jobs::lock(&table).iter().next().is_none()),
        "pipeline should be reaped and its slot released"
    );

    // Stop a job with the kill builtin, then resume it with bg. The slot
    // was released above, so this job is %0 again.
    shell.accept("sleep 2 &");
    shell.accept(&format!("kill -s {} %0", libc::SIGSTOP));
    assert!(
        wait_until(|| {
            let table = jobs::lock(&table);
            let result = table
                .iter()
                .next()
                .is_some_and(|(_, job)| job.status == JobStatus::Stopped);
            result
        }),
        "stop report should mark the job Stopped"
    );

    shell.accept("bg %0");
    {
        let table = jobs::lock(&table);
        let (_, job) = table.iter().next().expect("job still live");
        assert_eq!(job.status, JobStatus::Background);
    }
    assert!(
        wait_until(|| jobs::lock(&table).iter().next().is_none()),
        "resumed job should finish and be released"
    );

    // An out-of-range signal number is rejected before anything is sent.
    shell.accept("sleep 5 &");
    shell.accept("kill -s 99 %0");
    {
        let table = jobs::lock(&table);
        let (_, job) = table.iter().next().expect("job untouched");
        assert_eq!(job.status, JobStatus::Background);
    }
    shell.accept(&format!("kill -s {} %0", libc::SIGTERM));
    assert!(
        wait_until(|| jobs::lock(&table).iter().next().is_none()),
        "terminated job should be released"
    );

    // Invalid references print a diagnostic and do nothing.
    shell.accept("fg %42");
    shell.accept("bg %notanumber");
    shell.accept("kill %99");
    assert!(jobs::lock(&table).iter().next().is_none());

    // An unresolvable command is rejected before any spawn.
    shell.accept("definitely_not_a_real_command_12345 | cat");
    assert!(jobs::lock(&table).iter().next().is_none());

    // Output redirection lands in the file once the job is reaped.
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("out.txt");
    shell.accept(&format!("echo hello | cat > {} &", out.display()));
    assert!(
        wait_until(|| jobs::lock(&table).iter().next().is_none()),
        "redirected pipeline should complete"
    );
    let contents = std::fs::read_to_string(&out).expect("redirected output");
    assert_eq!(contents, "hello\n");
}
