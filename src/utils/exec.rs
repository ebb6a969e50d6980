//! External command execution utilities.
//!
//! Provides a Builder-based API for running compiler processes with stdin
//! piping, output filtering and a hard time limit.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Compiler reading a file and printing to stdout
//! let output = Cmd::new("lessc").arg("assets/styles/app.less").run()?;
//!
//! // Compiler reading stdin, killed after 30 seconds
//! let output = Cmd::from_slice(&["jade", "--client"])
//!     .stdin(source)
//!     .timeout(Duration::from_secs(30))
//!     .run()?;
//! ```

use crate::log;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    io::{Read, Write},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Output, Stdio},
    sync::OnceLock,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use thiserror::Error;

/// How often a time-limited child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Returned (inside `anyhow::Error`) when a command outlives its time limit.
///
/// Callers distinguish it with `err.downcast_ref::<TimedOut>()`.
#[derive(Debug, Error)]
#[error("`{program}` did not finish within {after:?} and was killed")]
pub struct TimedOut {
    pub program: String,
    pub after: Duration,
}

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    stdin_data: Option<Vec<u8>>,
    timeout: Option<Duration>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["lessc"]` or `["npx", "lessc"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set environment variables for the subprocess.
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in vars {
            self.envs.push((k.as_ref().to_owned(), v.as_ref().to_owned()));
        }
        self
    }

    /// Set stdin data to pipe to the process.
    pub fn stdin<D: AsRef<[u8]>>(mut self, data: D) -> Self {
        self.stdin_data = Some(data.as_ref().to_vec());
        self
    }

    /// Kill the process if it has not exited after `limit`.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Execute the command and return output.
    ///
    /// A non-zero exit status is an error carrying the command's stderr.
    pub fn run(self) -> Result<Output> {
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);
        let name = self.program_name();
        let output = self.run_piped(&name)?;
        log_output(&name, &output, filter)?;
        Ok(output)
    }

    /// Get the program name for error messages.
    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Spawn with piped stdio, feed stdin, drain stdout/stderr, wait.
    ///
    /// Pipes are drained on their own threads so a chatty child can never
    /// block on a full pipe while we wait for it. With a time limit the child
    /// leads its own process group, and the limit covers everything the group
    /// holds open: descendants still writing to our pipes after the child
    /// exits are killed at the deadline too.
    fn run_piped(self, name: &str) -> Result<Output> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.envs.iter().cloned())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if self.stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if self.timeout.is_some() {
                cmd.process_group(0);
            }
        }

        let limit = self.timeout.map(Limit::new);
        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn `{name}`"))?;

        let writer = match (child.stdin.take(), self.stdin_data) {
            (Some(mut stdin), Some(data)) => Some(thread::spawn(move || {
                // The child may exit without reading everything; that is its call.
                let _ = stdin.write_all(&data);
            })),
            _ => None,
        };
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match limit {
            Some(limit) => wait_with_limit(&mut child, limit, name)?,
            None => child
                .wait()
                .with_context(|| format!("Failed to wait for `{name}`"))?,
        };

        let stdout = join_within(stdout, limit, &mut child, name)?;
        let stderr = join_within(stderr, limit, &mut child, name)?;
        join_within(writer, limit, &mut child, name)?;

        Ok(Output {
            status,
            stdout: stdout.unwrap_or_default(),
            stderr: stderr.unwrap_or_default(),
        })
    }
}

/// Deadline of a time-limited command.
#[derive(Debug, Clone, Copy)]
struct Limit {
    deadline: Instant,
    after: Duration,
}

impl Limit {
    fn new(after: Duration) -> Self {
        Self {
            deadline: Instant::now() + after,
            after,
        }
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    fn timed_out(&self, name: &str) -> anyhow::Error {
        TimedOut {
            program: name.to_string(),
            after: self.after,
        }
        .into()
    }
}

/// Poll `child` until it exits or the limit expires; kill its group on expiry.
fn wait_with_limit(child: &mut Child, limit: Limit, name: &str) -> Result<ExitStatus> {
    loop {
        if let Some(status) = child
            .try_wait()
            .with_context(|| format!("Failed to wait for `{name}`"))?
        {
            return Ok(status);
        }
        if limit.expired() {
            kill_group(child);
            return Err(limit.timed_out(name));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Join a pipe thread, killing the child's group if the limit expires first.
fn join_within<T>(
    handle: Option<JoinHandle<T>>,
    limit: Option<Limit>,
    child: &mut Child,
    name: &str,
) -> Result<Option<T>> {
    let Some(handle) = handle else {
        return Ok(None);
    };
    if let Some(limit) = limit {
        while !handle.is_finished() {
            if limit.expired() {
                kill_group(child);
                let _ = handle.join();
                return Err(limit.timed_out(name));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
    handle
        .join()
        .map(Some)
        .map_err(|_| anyhow::anyhow!("Failed to join pipe thread for `{name}`"))
}

/// Kill the child and every process left in its group.
fn kill_group(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: plain signal delivery; the group was created for this child.
            unsafe {
                libc::killpg(pgid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    pub(crate) fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                let trimmed = plain.trim();
                !trimmed.is_empty() && !self.should_skip(trimmed)
            })
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

/// Log stderr of a successful command, returning error on failure.
fn log_output(name: &str, output: &Output, filter: &'static FilterRule) -> Result<()> {
    if !output.status.success() {
        anyhow::bail!(format_error(name, output, filter));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    filter.log(name, stderr.trim());
    Ok(())
}

/// Format error message for failed command.
fn format_error(name: &str, output: &Output, filter: &'static FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let stderr = strip_ansi(stderr.trim());
    let error_msg = filter
        .skip_prefixes
        .iter()
        .fold(stderr.as_ref(), |s, p| s.trim_start_matches(p).trim_start());

    let mut msg = format!("Command `{name}` failed with {}\n", output.status);
    if !error_msg.is_empty() {
        msg.push_str(error_msg);
    }

    // Compilers print diagnostics on either stream; keep stdout only when stderr is silent.
    let stdout_trimmed = stdout.trim();
    if error_msg.is_empty() && !stdout_trimmed.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(&strip_ansi(stdout_trimmed));
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("echo")
            .arg("hello")
            .args(["world", "!"])
            .cwd("/tmp")
            .timeout(Duration::from_secs(1));

        assert_eq!(cmd.program, OsString::from("echo"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(cmd.timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_from_slice() {
        let cmd = Cmd::from_slice(&["npx", "lessc", "app.less"]);
        assert_eq!(cmd.program, OsString::from("npx"));
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("echo").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["WARN:", "INFO:"]);
        assert!(filter.should_skip("WARN: something"));
        assert!(filter.should_skip("INFO: something"));
        assert!(!filter.should_skip("ERROR: something"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[test]
    fn test_simple_command() {
        let output = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[test]
    fn test_stdin_pipe() {
        let output = Cmd::new("cat").stdin(b"test data").run().unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"test data");
    }

    #[test]
    fn test_failure_carries_stderr() {
        let err = Cmd::from_slice(&["sh", "-c", "echo 'unexpected token' >&2; exit 3"])
            .run()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("`sh` failed"));
        assert!(msg.contains("unexpected token"));
    }

    #[test]
    fn test_timeout_kills_process() {
        let started = Instant::now();
        let err = Cmd::new("sleep")
            .arg("5")
            .timeout(Duration::from_millis(100))
            .run()
            .unwrap_err();
        let timed_out = err.downcast_ref::<TimedOut>().expect("timeout error");
        assert_eq!(timed_out.program, "sleep");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(target_os = "linux")]
    fn is_gone(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat.contains(") Z "),
            Err(_) => true,
        }
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_timeout_kills_whole_group() {
        let dir = tempfile::TempDir::new().unwrap();
        let pidfile = dir.path().join("worker.pid");
        let script = format!("sleep 30 & echo $! > '{}'; wait", pidfile.display());

        let err = Cmd::from_slice(&["sh", "-c", &script])
            .timeout(Duration::from_millis(300))
            .run()
            .unwrap_err();
        assert!(err.downcast_ref::<TimedOut>().is_some());

        let pid = std::fs::read_to_string(&pidfile).unwrap();
        let pid = pid.trim();
        let started = Instant::now();
        while !is_gone(pid) && started.elapsed() < Duration::from_secs(3) {
            thread::sleep(POLL_INTERVAL);
        }
        assert!(is_gone(pid), "worker {pid} survived the timeout");
    }

    #[test]
    fn test_timeout_covers_background_jobs() {
        let started = Instant::now();
        let err = Cmd::from_slice(&["sh", "-c", "echo out; sleep 5 &"])
            .timeout(Duration::from_millis(200))
            .run()
            .unwrap_err();
        assert!(err.downcast_ref::<TimedOut>().is_some());
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_timeout_not_hit_by_fast_command() {
        let output = Cmd::from_slice(&["sh", "-c", "echo done"])
            .timeout(Duration::from_secs(5))
            .run()
            .unwrap();
        assert_eq!(output.stdout, b"done\n");
    }

    #[test]
    fn test_missing_program() {
        let err = Cmd::new("rigging-no-such-compiler").run().unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"));
    }
}
