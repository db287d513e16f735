use rayon::prelude::*;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Directory names never worth listing to a model
const SKIPPED_DIRS: &[&str] = &["node_modules", "vendor", ".git", "dist", "build", "target"];

/// Upper bound on directory entries sent in a prompt
pub const MAX_DIRECTORY_ENTRIES: usize = 50;

/// Looks at the machine the command will run on
pub struct SystemScanner;

impl SystemScanner {
    /// Every executable reachable through `PATH`, sorted and deduplicated
    pub fn available_commands() -> Vec<String> {
        let path = env::var_os("PATH").unwrap_or_default();
        let dirs: Vec<PathBuf> = env::split_paths(&path).collect();
        Self::commands_in(&dirs)
    }

    /// Executables found directly inside `dirs`
    pub fn commands_in(dirs: &[PathBuf]) -> Vec<String> {
        let found: BTreeSet<String> = dirs
            .par_iter()
            .flat_map_iter(|dir| executables_in(dir))
            .collect();

        debug!(dirs = dirs.len(), commands = found.len(), "scanned PATH");
        found.into_iter().collect()
    }

    /// Immediate entries of `dir`, directories marked with a trailing `/`.
    ///
    /// Hidden entries and build/dependency folders are left out, and the
    /// list is capped at [`MAX_DIRECTORY_ENTRIES`].
    pub fn directory_files(dir: &Path) -> Vec<String> {
        let mut entries: Vec<String> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
                    return None;
                }
                if entry.file_type().is_dir() {
                    Some(format!("{}/", name))
                } else {
                    Some(name)
                }
            })
            .take(MAX_DIRECTORY_ENTRIES)
            .collect();

        entries.sort();
        entries
    }

    /// `$SHELL`, or the platform's usual shell
    pub fn shell() -> String {
        Self::shell_from(env::var("SHELL").ok())
    }

    /// Shell named by `value`, falling back like [`SystemScanner::shell`]
    pub fn shell_from(value: Option<String>) -> String {
        match value {
            Some(shell) if !shell.is_empty() => shell,
            _ if cfg!(windows) => "powershell".to_string(),
            _ => "/bin/bash".to_string(),
        }
    }
}

fn executables_in(dir: &Path) -> Vec<String> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Vec::new();
    };

    read_dir
        .filter_map(|entry| entry.ok())
        .filter(|entry| is_executable(&entry.path()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
