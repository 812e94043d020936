//! External process execution with enforced wall-clock timeouts.
//!
//! The runner owns spawning, bounded output collection, and termination.
//! It reports what the kernel observed (exit status, signal, timeout) and
//! leaves success/failure semantics to the language adapters.

use crate::config::types::{Result, SandboxError};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// One external toolchain process launch.
#[derive(Clone, Debug)]
pub struct ToolchainInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub timeout: Duration,
    pub environment: Vec<(String, String)>,
}

impl ToolchainInvocation {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        workdir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            workdir: workdir.into(),
            timeout,
            environment: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.push((key.into(), value.into()));
        self
    }
}

/// What one invocation actually did.
///
/// Interpretation (compile failure, runtime error, placeholder output)
/// belongs to the adapter that produced the invocation.
#[derive(Clone, Debug)]
pub struct RawOutcome {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Terminating signal, if any
    pub signal: Option<i32>,
    /// True when the wall-clock budget expired and the process group was killed
    pub timed_out: bool,
    /// Observed wall time for this invocation
    pub wall_time: Duration,
    /// The budget that applied to this invocation
    pub timeout: Duration,
}

impl RawOutcome {
    pub fn exited_zero(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Spawns toolchain processes and guarantees they do not outlive their budget.
#[derive(Clone, Debug)]
pub struct ProcessRunner {
    stdout_limit: usize,
    stderr_limit: usize,
}

impl ProcessRunner {
    pub fn new(stdout_limit: usize, stderr_limit: usize) -> Self {
        Self {
            stdout_limit,
            stderr_limit,
        }
    }

    /// Run one invocation to completion or to its deadline.
    ///
    /// The child is placed in its own process group so a timeout kills the
    /// entire tree, not just the direct child. Stdout and stderr are
    /// drained concurrently and never merged.
    pub fn run(&self, invocation: &ToolchainInvocation) -> Result<RawOutcome> {
        let start = Instant::now();

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        cmd.env_clear();
        cmd.env("PATH", "/usr/local/bin:/usr/bin:/bin");
        for (key, value) in &invocation.environment {
            cmd.env(key, value);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|e| {
            SandboxError::Process(format!("Failed to start {}: {}", invocation.program, e))
        })?;
        let pid = child.id();
        log::debug!(
            "spawned {} (pid {}) with {}s budget",
            invocation.program,
            pid,
            invocation.timeout.as_secs()
        );

        let mut stdout_handle = child.stdout.take().map(|stream| {
            let limit = self.stdout_limit;
            thread::spawn(move || collect_stream(stream, limit))
        });
        let mut stderr_handle = child.stderr.take().map(|stream| {
            let limit = self.stderr_limit;
            thread::spawn(move || collect_stream(stream, limit))
        });

        loop {
            match child.try_wait() {
                Ok(Some(exit_status)) => {
                    let stdout = join_collector(stdout_handle.take());
                    let stderr = join_collector(stderr_handle.take());

                    return Ok(RawOutcome {
                        stdout: String::from_utf8_lossy(&stdout).into_owned(),
                        stderr: String::from_utf8_lossy(&stderr).into_owned(),
                        exit_code: exit_status.code(),
                        signal: {
                            #[cfg(unix)]
                            {
                                use std::os::unix::process::ExitStatusExt;
                                exit_status.signal()
                            }
                            #[cfg(not(unix))]
                            {
                                None
                            }
                        },
                        timed_out: false,
                        wall_time: start.elapsed(),
                        timeout: invocation.timeout,
                    });
                }
                Ok(None) => {
                    if start.elapsed() >= invocation.timeout {
                        log::warn!(
                            "{} (pid {}) exceeded {}s budget, killing process group",
                            invocation.program,
                            pid,
                            invocation.timeout.as_secs()
                        );
                        terminate_group(pid);
                        let _ = child.wait();

                        let stdout = join_collector(stdout_handle.take());
                        let stderr = join_collector(stderr_handle.take());

                        return Ok(RawOutcome {
                            stdout: String::from_utf8_lossy(&stdout).into_owned(),
                            stderr: String::from_utf8_lossy(&stderr).into_owned(),
                            exit_code: None,
                            signal: Some(libc::SIGKILL),
                            timed_out: true,
                            wall_time: start.elapsed(),
                            timeout: invocation.timeout,
                        });
                    }

                    // Brief sleep while the process is still running to avoid busy waiting
                    thread::sleep(Duration::from_millis(1));
                }
                Err(e) => {
                    terminate_group(pid);
                    let _ = child.wait();
                    return Err(SandboxError::Process(format!(
                        "Process monitoring error: {}",
                        e
                    )));
                }
            }
        }
    }
}

/// Terminate a process group gracefully then forcefully.
fn terminate_group(pid: u32) {
    let pgid = Pid::from_raw(pid as i32);

    if let Err(e) = killpg(pgid, Signal::SIGTERM) {
        log::debug!("SIGTERM to group {} failed: {}", pid, e);
    }

    // Grace period for handlers before the hard kill
    thread::sleep(Duration::from_millis(100));

    if let Err(e) = killpg(pgid, Signal::SIGKILL) {
        // ESRCH here just means the group already exited
        log::debug!("SIGKILL to group {} failed: {}", pid, e);
    }
}

fn join_collector(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    match handle {
        Some(handle) => handle.join().unwrap_or_default(),
        None => Vec::new(),
    }
}

/// Drain a stream up to `limit` bytes, truncating beyond it.
fn collect_stream<R: Read>(mut stream: R, limit: usize) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if buffer.len() + n > limit {
                    let remaining = limit - buffer.len();
                    buffer.extend_from_slice(&chunk[..remaining]);
                    log::debug!("output stream truncated at {} bytes", limit);
                    break;
                }
                buffer.extend_from_slice(&chunk[..n]);
            }
            Err(_) => break,
        }
    }

    buffer
}
