//! Builtin commands and their dispatch.
//!
//! Builtins are a closed set resolved once from the command token. The
//! job-control builtins (`jobs`, `fg`, `bg`, `kill`) read or mutate the
//! job table and must run in the shell process before anything is
//! spawned; `which` does no process control and may run inside a
//! pipeline child like any other stage.

mod bg;
mod fg;
mod jobs;
mod kill;
mod which;

use crate::error::ShellError;
use crate::jobs::{JobId, JobTable};
use crate::parse::Stage;
use crate::terminal::TerminalController;

/// The closed set of builtin commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Which,
    Jobs,
    Fg,
    Bg,
    Kill,
    NotABuiltin,
}

impl Builtin {
    /// Resolve a command token. Anything unrecognised is `NotABuiltin`.
    pub fn resolve(cmd: &str) -> Builtin {
        match cmd {
            "exit" => Builtin::Exit,
            "which" => Builtin::Which,
            "jobs" => Builtin::Jobs,
            "fg" => Builtin::Fg,
            "bg" => Builtin::Bg,
            "kill" => Builtin::Kill,
            _ => Builtin::NotABuiltin,
        }
    }

    /// True for builtins that touch the job table and therefore run in
    /// the shell process, never in a pipeline child.
    pub fn is_job_control(&self) -> bool {
        matches!(
            self,
            Builtin::Jobs | Builtin::Fg | Builtin::Bg | Builtin::Kill
        )
    }
}

/// Dispatch a job-control builtin against the live table.
///
/// Diagnostics are printed; no error escapes to the caller.
pub fn dispatch(
    builtin: Builtin,
    stage: &Stage,
    table: &mut JobTable,
    terminal: &TerminalController,
) {
    match builtin {
        Builtin::Jobs => jobs::run(table),
        Builtin::Fg => fg::run(&stage.argv, table, terminal),
        Builtin::Bg => bg::run(&stage.argv, table),
        Builtin::Kill => kill::run(&stage.argv, table),
        _ => {}
    }
}

/// Run a builtin inside a pipeline child; returns the exit code.
///
/// Only `which` does real work here: the job-control builtins are
/// intercepted during validation, before any process is created.
pub fn run_in_child(builtin: Builtin, stage: &Stage) -> i32 {
    match builtin {
        Builtin::Which => which::run(&stage.argv),
        _ => {
            println!("jish: {}: cannot run inside a pipeline", stage.cmd);
            1
        }
    }
}

/// Parse a `%N` job token against the table.
pub(crate) fn parse_job_ref(token: &str, table: &JobTable) -> Result<JobId, ShellError> {
    let invalid = || ShellError::InvalidJobReference(token.to_string());

    let number = token.strip_prefix('%').ok_or_else(invalid)?;
    let index: usize = number.parse().map_err(|_| invalid())?;

    let id = JobId(index);
    if table.is_valid(id) {
        Ok(id)
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_covers_the_closed_set() {
        assert_eq!(Builtin::resolve("exit"), Builtin::Exit);
        assert_eq!(Builtin::resolve("which"), Builtin::Which);
        assert_eq!(Builtin::resolve("jobs"), Builtin::Jobs);
        assert_eq!(Builtin::resolve("fg"), Builtin::Fg);
        assert_eq!(Builtin::resolve("bg"), Builtin::Bg);
        assert_eq!(Builtin::resolve("kill"), Builtin::Kill);
        assert_eq!(Builtin::resolve("ls"), Builtin::NotABuiltin);
        assert_eq!(Builtin::resolve(""), Builtin::NotABuiltin);
    }

    #[test]
    fn job_control_predicate() {
        assert!(Builtin::Jobs.is_job_control());
        assert!(Builtin::Fg.is_job_control());
        assert!(Builtin::Bg.is_job_control());
        assert!(Builtin::Kill.is_job_control());
        assert!(!Builtin::Exit.is_job_control());
        assert!(!Builtin::Which.is_job_control());
        assert!(!Builtin::NotABuiltin.is_job_control());
    }

    #[test]
    fn job_refs_must_be_percent_prefixed_and_occupied() {
        let mut table = JobTable::with_capacity(4);
        let id = table.allocate("sleep 100".into(), 1, false).unwrap();

        assert_eq!(parse_job_ref("%0", &table).unwrap(), id);
        assert!(parse_job_ref("0", &table).is_err());
        assert!(parse_job_ref("%one", &table).is_err());
        assert!(parse_job_ref("%3", &table).is_err());

        table.release(id);
        assert!(parse_job_ref("%0", &table).is_err());
    }
}
