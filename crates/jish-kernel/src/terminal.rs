//! Terminal foreground ownership.
//!
//! Exactly one process group owns the terminal's input and keyboard
//! signals at a time. The controller hands ownership between the shell
//! and job process groups, and is a no-op when stdin is not a terminal so
//! the kernel stays usable under tests and pipes.

use nix::sys::signal::{sigprocmask, SigSet, SigmaskHow, Signal};
use nix::unistd::{getpgrp, tcgetpgrp, tcsetpgrp, Pid};

use crate::error::ShellResult;

#[derive(Debug, Clone)]
pub struct TerminalController {
    interactive: bool,
}

impl TerminalController {
    /// Controller for the process's stdin, detecting whether it is a tty.
    pub fn new() -> Self {
        let interactive = unsafe { libc::isatty(libc::STDIN_FILENO) == 1 };
        Self { interactive }
    }

    /// Controller that never touches the terminal.
    pub fn detached() -> Self {
        Self { interactive: false }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Assign `pgid` as the terminal's foreground process group.
    ///
    /// SIGTTOU is blocked for the duration of the call and the previous
    /// mask restored after: a background shell calling `tcsetpgrp` would
    /// otherwise stop itself. The caller must ensure the group already has
    /// at least one member process.
    pub fn set_foreground(&self, pgid: Pid) -> ShellResult<()> {
        if !self.interactive {
            return Ok(());
        }

        let mut ttou = SigSet::empty();
        ttou.add(Signal::SIGTTOU);
        let mut previous = SigSet::empty();

        sigprocmask(SigmaskHow::SIG_BLOCK, Some(&ttou), Some(&mut previous))?;
        let result = tcsetpgrp(std::io::stdin(), pgid);
        sigprocmask(SigmaskHow::SIG_SETMASK, Some(&previous), None)?;

        result?;
        Ok(())
    }

    /// The process group currently owning the terminal; the shell's own
    /// group when there is no terminal to ask.
    pub fn current_foreground(&self) -> Pid {
        if !self.interactive {
            return getpgrp();
        }
        tcgetpgrp(std::io::stdin()).unwrap_or_else(|_| getpgrp())
    }
}

impl Default for TerminalController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_controller_is_inert() {
        let terminal = TerminalController::detached();
        assert!(!terminal.is_interactive());
        // No terminal: handoff succeeds without side effects and the
        // foreground group is our own.
        terminal.set_foreground(Pid::from_raw(12345)).unwrap();
        assert_eq!(terminal.current_foreground(), getpgrp());
    }
}
