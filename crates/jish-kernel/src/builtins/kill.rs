//! kill — send a signal to processes or jobs.

use nix::sys::signal::{kill as send_signal, Signal};
use nix::unistd::Pid;
use tracing::debug;

use crate::error::ShellError;
use crate::jobs::{JobStatus, JobTable};

use super::parse_job_ref;

/// Highest signal number accepted by the `-s` flag.
const MAX_SIGNAL: i32 = 31;

/// Parsed form of a kill invocation.
#[derive(Debug)]
struct KillSpec<'a> {
    /// `None` is signal 0: an existence probe, nothing is delivered.
    signal: Option<Signal>,
    targets: Vec<&'a str>,
}

/// Parse `[-s <number>] target...`. The number must be a non-negative
/// integer in `[0, 31]`; the default signal is SIGTERM.
fn parse_args(argv: &[String]) -> Result<KillSpec<'_>, ShellError> {
    let mut rest = &argv[1..];
    let mut number = Signal::SIGTERM as i32;

    if rest.first().map(String::as_str) == Some("-s") {
        let Some(value) = rest.get(1) else {
            return Err(ShellError::InvalidSignalNumber("(missing)".into()));
        };
        number = value
            .parse::<i32>()
            .ok()
            .filter(|n| (0..=MAX_SIGNAL).contains(n))
            .ok_or_else(|| ShellError::InvalidSignalNumber(value.clone()))?;
        rest = &rest[2..];
    }

    let signal = if number == 0 {
        None
    } else {
        Some(
            Signal::try_from(number)
                .map_err(|_| ShellError::InvalidSignalNumber(number.to_string()))?,
        )
    };

    Ok(KillSpec {
        signal,
        targets: rest.iter().map(String::as_str).collect(),
    })
}

pub(super) fn run(argv: &[String], table: &mut JobTable) {
    if argv.len() < 2 {
        println!("Usage: kill [-s <signal number>] <pid> | %<job> ...");
        return;
    }

    let spec = match parse_args(argv) {
        Ok(spec) => spec,
        Err(err) => {
            println!("jish: {}", err);
            return;
        }
    };
    if spec.targets.is_empty() {
        println!("Usage: kill [-s <signal number>] <pid> | %<job> ...");
        return;
    }

    for target in &spec.targets {
        if target.starts_with('%') {
            // Job reference: signal every member process. A bad reference
            // aborts this argument only.
            let id = match parse_job_ref(target, table) {
                Ok(id) => id,
                Err(err) => {
                    println!("jish: {}", err);
                    continue;
                }
            };
            let Some(job) = table.get_mut(id) else {
                continue;
            };
            for pid in &job.pids {
                if let Err(err) = send_signal(*pid, spec.signal) {
                    debug!(%pid, %err, "signal delivery failed");
                }
            }
            if spec.signal == Some(Signal::SIGCONT) {
                job.status = JobStatus::Background;
            }
        } else {
            // Raw pid, no job-table involvement.
            let Ok(raw) = target.parse::<i32>() else {
                println!("jish: invalid pid: {}", target);
                continue;
            };
            if let Err(err) = send_signal(Pid::from_raw(raw), spec.signal) {
                println!("jish: kill {}: {}", raw, err);
            }
        }
    }
}
