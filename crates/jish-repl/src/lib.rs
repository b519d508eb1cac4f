//! jish REPL — interactive front end for 仕sh.
//!
//! Reads lines with rustyline, keeps in-session history, and hands every
//! command to the kernel's `Shell`. The prompt shows the current working
//! directory. EOF (Ctrl-D) ends the loop; `exit` is handled by the
//! kernel and terminates the process with success.

use std::env;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use jish_kernel::Shell;

const BANNER: &str = "仕sh — jish. Type 'exit' or Ctrl-D to quit.\n";

/// Run the interactive loop until end-of-input.
pub fn run() -> Result<()> {
    let shell = Shell::new().context("failed to initialise shell")?;
    let mut editor: Editor<(), DefaultHistory> =
        Editor::new().context("failed to initialise line editor")?;

    print!("{BANNER}");

    loop {
        match editor.readline(&prompt()) {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                shell.accept(&line);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Cwd-based prompt, falling back to a bare `$` when the directory is
/// unreadable.
fn prompt() -> String {
    match env::current_dir() {
        Ok(cwd) => format!("{}$ ", cwd.display()),
        Err(_) => "$ ".to_string(),
    }
}
