//! Shell command execution and filesystem probes.
//!
//! Commands go through the platform shell (`/bin/sh -c` on unix, `cmd /C`
//! on Windows), so pipes and redirections in the command string work as they
//! would at a prompt.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

use crate::diag;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command is empty")]
    EmptyCommand,
    #[error("output capacity must be at least 1")]
    ZeroCapacity,
    #[error("failed to spawn shell: {0}")]
    Spawn(#[source] io::Error),
    #[error("failed to read command output: {0}")]
    Read(#[source] io::Error),
    #[error("failed to wait for command: {0}")]
    Wait(#[source] io::Error),
    #[error("command terminated without an exit status")]
    NoExitStatus,
}

fn shell(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut shell = Command::new("cmd");
        shell.arg("/C").arg(command);
        shell
    }
    #[cfg(not(windows))]
    {
        let mut shell = Command::new("/bin/sh");
        shell.arg("-c").arg(command);
        shell
    }
}

fn exit_code(status: ExitStatus) -> Result<i32, CommandError> {
    status.code().ok_or(CommandError::NoExitStatus)
}

fn report<T>(symbol: &'static str, result: Result<T, CommandError>) -> Result<T, CommandError> {
    if let Err(err) = &result {
        diag::error("command", symbol, format!("Error executing command: {err}"));
    }
    result
}

/// Run `command` through the shell and return its exit status.
pub fn run(command: &str) -> Result<i32, CommandError> {
    report("fossil_command", run_inner(command))
}

fn run_inner(command: &str) -> Result<i32, CommandError> {
    if command.is_empty() {
        return Err(CommandError::EmptyCommand);
    }
    let status = shell(command).status().map_err(CommandError::Spawn)?;
    exit_code(status)
}

/// [`run`], reporting whether the command exited with status 0.
pub fn run_checked(command: &str) -> Result<i32, CommandError> {
    let status = run(command)?;
    if status == 0 {
        diag::info(
            "command",
            "fossil_command_success",
            format!("Command '{command}' executed successfully."),
        );
    } else {
        diag::error(
            "command",
            "fossil_command_success",
            format!("Error executing command '{command}'."),
        );
    }
    Ok(status)
}

/// Run `command` and capture at most `capacity - 1` bytes of its stdout.
///
/// The limit mirrors a caller-provided buffer of `capacity` bytes that also
/// has to hold a terminator. Output beyond the limit is discarded; invalid
/// UTF-8 is replaced.
pub fn output(command: &str, capacity: usize) -> Result<String, CommandError> {
    report("fossil_command_output", output_inner(command, capacity))
}

fn output_inner(command: &str, capacity: usize) -> Result<String, CommandError> {
    if command.is_empty() {
        return Err(CommandError::EmptyCommand);
    }
    if capacity == 0 {
        return Err(CommandError::ZeroCapacity);
    }

    let mut child = shell(command)
        .stdout(Stdio::piped())
        .spawn()
        .map_err(CommandError::Spawn)?;

    let mut captured = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        let limit = (capacity - 1) as u64;
        let read = stdout.take(limit).read_to_end(&mut captured);
        if let Err(err) = read {
            let _ = child.wait();
            return Err(CommandError::Read(err));
        }
    }
    child.wait().map_err(CommandError::Wait)?;

    Ok(String::from_utf8_lossy(&captured).into_owned())
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

/// True if `path` names an executable regular file. Off unix a bare name is
/// also looked up in every `PATH` entry.
pub fn exists(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let found = is_executable_file(path) || (cfg!(not(unix)) && search_path(path).is_some());
    let message = if found {
        format!("Command '{}' exists and is executable.", path.display())
    } else {
        format!(
            "Command '{}' does not exist or is not executable.",
            path.display()
        )
    };
    diag::info("command", "fossil_command_exists", message);
    found
}

/// First `PATH` entry that holds an executable file called `name`.
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    search_path(Path::new(name))
}

fn search_path(name: &Path) -> Option<PathBuf> {
    if name.as_os_str().is_empty() {
        return None;
    }
    let paths = std::env::var_os("PATH")?;
    find_in_dirs(name, std::env::split_paths(&paths))
}

fn find_in_dirs(name: &Path, dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable_file(candidate))
}

/// True if `path` names a directory.
pub fn dir_exists(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let found = path.is_dir();
    let message = if found {
        format!("Directory '{}' exists.", path.display())
    } else {
        format!("Directory '{}' does not exist.", path.display())
    };
    diag::info("command", "fossil_command_erase_exists", message);
    found
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut index = index;
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Number of `src` bytes that fit after `dest_len` bytes in a `dest_size`
/// buffer that must keep one byte for the terminator.
#[must_use]
pub const fn append_len(dest_len: usize, src_len: usize, dest_size: usize) -> usize {
    let space = dest_size.saturating_sub(1).saturating_sub(dest_len);
    if src_len < space { src_len } else { space }
}

/// Append as much of `src` to `dest` as fits in a `dest_size`-byte buffer
/// that must keep room for a terminator.
///
/// `dest` never ends up longer than `dest_size - 1` bytes, and is cut back
/// if it already was. Truncation never splits a UTF-8 sequence.
pub fn strcat_safe(dest: &mut String, src: &str, dest_size: usize) {
    let limit = dest_size.saturating_sub(1);
    if dest.len() > limit {
        let cut = floor_char_boundary(dest, limit);
        dest.truncate(cut);
    }
    let take = floor_char_boundary(src, append_len(dest.len(), src.len(), dest_size));
    dest.push_str(&src[..take]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Severity;

    #[test]
    fn strcat_safe_fits() {
        let mut dest = String::from("Hello, ");
        strcat_safe(&mut dest, "world!", 20);
        assert_eq!(dest, "Hello, world!");
    }

    #[test]
    fn strcat_safe_truncates() {
        let mut dest = String::from("Hello, ");
        strcat_safe(&mut dest, "world!", 10);
        assert_eq!(dest, "Hello, wo");
        assert_eq!(dest.len(), 9);

        strcat_safe(&mut dest, "more", 10);
        assert_eq!(dest, "Hello, wo");
    }

    #[test]
    fn append_len_bounds() {
        assert_eq!(append_len(7, 6, 20), 6);
        assert_eq!(append_len(7, 6, 10), 2);
        assert_eq!(append_len(9, 6, 10), 0);
        assert_eq!(append_len(12, 6, 10), 0);
        assert_eq!(append_len(0, 6, 0), 0);
    }

    #[test]
    fn strcat_safe_respects_char_boundaries() {
        let mut dest = String::from("ab");
        strcat_safe(&mut dest, "\u{e9}\u{e9}", 6);
        assert_eq!(dest, "ab\u{e9}");
    }

    #[test]
    fn strcat_safe_cuts_oversized_dest() {
        let mut dest = String::from("abcdef");
        strcat_safe(&mut dest, "x", 4);
        assert_eq!(dest, "abc");

        let mut dest = String::from("abc");
        strcat_safe(&mut dest, "x", 0);
        assert_eq!(dest, "");
    }

    #[test]
    fn empty_command_is_rejected() {
        let (result, records) = diag::capture(|| run(""));
        assert!(matches!(result, Err(CommandError::EmptyCommand)));
        assert_eq!(records[0].symbol, "fossil_command");
        assert!(matches!(output("", 8), Err(CommandError::EmptyCommand)));
        assert!(matches!(output("echo hi", 0), Err(CommandError::ZeroCapacity)));
    }

    #[cfg(unix)]
    #[test]
    fn run_reports_exit_status() {
        assert_eq!(run("exit 0").unwrap(), 0);
        assert_eq!(run("exit 3").unwrap(), 3);

        let (status, records) = diag::capture(|| run_checked("exit 2"));
        assert_eq!(status.unwrap(), 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Error);
    }

    #[cfg(unix)]
    #[test]
    fn output_is_bounded_by_capacity() {
        assert_eq!(output("printf hello", 64).unwrap(), "hello");
        assert_eq!(output("printf hello", 4).unwrap(), "hel");
        assert_eq!(output("printf hello", 1).unwrap(), "");
    }

    #[cfg(unix)]
    #[test]
    fn output_survives_large_producers() {
        let text = output("yes | head -c 200000", 16).unwrap();
        assert_eq!(text, "y\ny\ny\ny\ny\ny\ny\ny");
    }

    #[cfg(unix)]
    #[test]
    fn probes() {
        assert!(exists("/bin/sh"));
        assert!(!exists("/definitely/not/here"));
        assert!(!exists("/"));
        assert!(dir_exists("/"));
        assert!(!dir_exists("/bin/sh"));
        assert!(find_in_path("sh").is_some());
        assert!(find_in_path("no-such-binary-fossil").is_none());
    }

    #[test]
    fn lookup_finds_tool_in_later_dir() {
        let root = std::env::temp_dir().join(format!("fossil-command-{}", std::process::id()));
        let first = root.join("first");
        let second = root.join("second");
        std::fs::create_dir_all(&first).expect("create first dir");
        std::fs::create_dir_all(&second).expect("create second dir");
        let tool = second.join("fossil-tool");
        std::fs::write(&tool, b"#!/bin/sh\n").expect("write tool");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755))
                .expect("chmod tool");
        }

        let dirs = || vec![root.join("missing"), first.clone(), second.clone()];
        assert_eq!(find_in_dirs(Path::new("fossil-tool"), dirs()), Some(tool.clone()));
        assert_eq!(find_in_dirs(Path::new("other-tool"), dirs()), None);
        assert_eq!(search_path(Path::new("")), None);

        std::fs::remove_dir_all(&root).expect("clean up");
    }

    #[cfg(windows)]
    #[test]
    fn exists_searches_path_for_bare_names() {
        assert!(exists("cmd.exe"));
        assert!(!exists("no-such-binary-fossil.exe"));
    }
}
