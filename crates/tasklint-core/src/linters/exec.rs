//! External linter process execution
//!
//! Each invocation gets its own temporary copy of the script. The copy is a
//! scoped guard: it is removed when the guard drops, whichever way the
//! invocation ends.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempPath;
use thiserror::Error;

const SCRIPT_FILE_PREFIX: &str = "tasklint-script-";
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Cannot create temporary file: {0}")]
    Create(#[source] io::Error),

    #[error("Cannot write to temporary file: {0}")]
    Write(#[source] io::Error),

    #[error("Cannot capture linter output: {0}")]
    Capture(#[source] io::Error),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// How a linter run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinterOutcome {
    Passed,
    /// Non-zero exit, with combined stdout and stderr
    Failed { output: String },
    TimedOut { after: Duration },
}

/// Script content on disk for the lifetime of one invocation.
#[derive(Debug)]
pub struct ScriptFile {
    path: TempPath,
}

impl ScriptFile {
    /// Write `contents` to a fresh, uniquely named file in `dir` (or the
    /// system temp dir). The file is closed before any linter sees it.
    pub fn create(contents: &str, dir: Option<&Path>) -> Result<Self, InvocationError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRIPT_FILE_PREFIX);
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(InvocationError::Create)?;

        file.write_all(contents.as_bytes())
            .and_then(|_| file.flush())
            .map_err(InvocationError::Write)?;

        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Find `command` on `PATH`. Commands containing a path separator are checked
/// as given.
pub fn resolve_command(command: &str) -> Option<PathBuf> {
    resolve_in(command, std::env::var_os("PATH"))
}

fn resolve_in(command: &str, search_path: Option<OsString>) -> Option<PathBuf> {
    if command.is_empty() {
        return None;
    }

    let candidate = Path::new(command);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let search_path = search_path?;
    std::env::split_paths(&search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| executable_names(command).map(move |name| dir.join(name)))
        .find(|path| is_executable(path))
}

#[cfg(windows)]
fn executable_names(command: &str) -> impl Iterator<Item = String> + '_ {
    ["", ".exe", ".cmd", ".bat"]
        .into_iter()
        .map(move |ext| format!("{}{}", command, ext))
}

#[cfg(not(windows))]
fn executable_names(command: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(command.to_string())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Run `program args... <script>` and capture its combined output.
///
/// Stdout and stderr share one anonymous capture file so their interleaving
/// is preserved. With a `timeout`, the child is killed once it overruns.
pub fn run_linter(
    program: &Path,
    args: &[String],
    script: &ScriptFile,
    timeout: Option<Duration>,
) -> Result<LinterOutcome, InvocationError> {
    let mut capture = tempfile::tempfile().map_err(InvocationError::Capture)?;
    let stdout = capture.try_clone().map_err(InvocationError::Capture)?;
    let stderr = capture.try_clone().map_err(InvocationError::Capture)?;

    let program_name = program.display().to_string();
    tracing::debug!(program = %program_name, ?args, script = %script.path().display(), "running linter");

    let mut child = Command::new(program)
        .args(args)
        .arg(script.path())
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .spawn()
        .map_err(|source| InvocationError::Spawn {
            program: program_name.clone(),
            source,
        })?;

    let status = match wait_with_budget(&mut child, timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let after = timeout.unwrap_or_default();
            tracing::warn!(program = %program_name, ?after, "linter timed out");
            return Ok(LinterOutcome::TimedOut { after });
        }
        Err(source) => {
            return Err(InvocationError::Wait {
                program: program_name,
                source,
            })
        }
    };

    if status.success() {
        return Ok(LinterOutcome::Passed);
    }

    let output = read_capture(&mut capture).map_err(InvocationError::Capture)?;
    tracing::debug!(program = %program_name, code = ?status.code(), "linter reported problems");
    Ok(LinterOutcome::Failed { output })
}

/// Wait for the child; `Ok(None)` means it overran and was killed.
fn wait_with_budget(
    child: &mut std::process::Child,
    timeout: Option<Duration>,
) -> io::Result<Option<ExitStatus>> {
    let Some(limit) = timeout else {
        return child.wait().map(Some);
    };

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() >= limit {
            // The child may have exited between try_wait and kill
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn read_capture(capture: &mut File) -> io::Result<String> {
    capture.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    capture.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
