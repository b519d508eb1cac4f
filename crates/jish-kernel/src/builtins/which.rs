//! which — display the full path to a command.

use std::path::Path;

use crate::lookup::{is_executable, resolve_in_path};

use super::Builtin;

/// Report where each argument resolves: builtins are named as such,
/// everything else gets its PATH candidate. Returns the exit code.
pub(super) fn run(argv: &[String]) -> i32 {
    if argv.len() < 2 {
        println!("Usage: which <command> ...");
        return 1;
    }

    let path_var = std::env::var("PATH").unwrap_or_default();
    let mut code = 0;

    for name in &argv[1..] {
        if Builtin::resolve(name) != Builtin::NotABuiltin {
            println!("{}: shell built-in command", name);
        } else if name.contains('/') && is_executable(Path::new(name)) {
            println!("{}", name);
        } else if let Some(path) = resolve_in_path(name, &path_var) {
            println!("{}", path);
        } else {
            code = 1;
        }
    }

    code
}
