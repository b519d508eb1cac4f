//! Executable resolution against PATH.

use std::path::Path;

/// Search each directory in `path_var` (colon-separated) for an executable
/// named `name`. Returns the full path of the first match.
pub fn resolve_in_path(name: &str, path_var: &str) -> Option<String> {
    for dir in path_var.split(':') {
        if dir.is_empty() {
            continue;
        }

        let candidate = format!("{}/{}", dir, name);
        if is_executable(Path::new(&candidate)) {
            return Some(candidate);
        }
    }

    None
}

/// True if `cmd` names something the executor could exec: a path to an
/// executable file, or a bare name found on PATH.
pub fn command_found(cmd: &str) -> bool {
    if cmd.contains('/') {
        return is_executable(Path::new(cmd));
    }

    let path_var = std::env::var("PATH").unwrap_or_default();
    resolve_in_path(cmd, &path_var).is_some()
}

/// Regular file with any execute bit set.
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.is_file()
        && path
            .metadata()
            .map(|meta| meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}
