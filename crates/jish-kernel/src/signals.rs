//! Signal dispositions for the shell and its children.

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::error::ShellResult;

/// Make the shell immune to keyboard job-control signals.
///
/// Ctrl-C and Ctrl-Z must only reach the foreground job's process group,
/// never the shell itself. Installed once before the read-eval loop.
pub fn setup_shell_signals() -> ShellResult<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());

    unsafe {
        sigaction(Signal::SIGINT, &ignore)?;
        sigaction(Signal::SIGQUIT, &ignore)?;
        sigaction(Signal::SIGTSTP, &ignore)?;
    }
    Ok(())
}

/// Restore default dispositions in a child after fork, before exec.
///
/// Children inherit the shell's ignored signals and the reaper's handler
/// registrations; an exec'd command expects the defaults.
pub fn restore_child_signals() {
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());

    unsafe {
        let _ = sigaction(Signal::SIGINT, &default);
        let _ = sigaction(Signal::SIGQUIT, &default);
        let _ = sigaction(Signal::SIGTSTP, &default);
        let _ = sigaction(Signal::SIGTTIN, &default);
        let _ = sigaction(Signal::SIGTTOU, &default);
        let _ = sigaction(Signal::SIGCHLD, &default);
    }
}
