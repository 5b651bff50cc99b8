//! Docker subprocess driver.
//!
//! Drives the `docker` binary directly: `build` from the workspace,
//! `run --rm -i` with memory and pid caps, `rmi` for cleanup. Wall-clock
//! enforcement lives here, not in the container: a deadline poll kills the
//! child once the submission's time limit expires.

use crate::config::types::{JudgeError, Result};
use crate::judge::Execution;
use crate::sandbox::{BuildOutcome, ContainerEngine, RunOutcome};
use std::fs::File;
use std::io::Read;
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// SIGKILL termination as seen through an exit code; docker reports it for
/// cgroup OOM kills.
const OOM_EXIT_CODE: i32 = 137;
/// `docker run` reserves 125 for daemon-side failures.
const ENGINE_FAILURE_EXIT_CODE: i32 = 125;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Container start-up overhead allowed on top of the submission limit.
const RUN_GRACE: Duration = Duration::from_secs(2);
/// Stderr is evidence for the classifier, not submission output; a small
/// fixed cap is enough.
const STDERR_CAP_BYTES: usize = 256 * 1024;

pub struct DockerEngine {
    output_cap_bytes: usize,
    build_budget: Duration,
}

impl DockerEngine {
    pub fn new(output_cap_bytes: usize, build_budget: Duration) -> Self {
        Self {
            output_cap_bytes,
            build_budget,
        }
    }
}

impl ContainerEngine for DockerEngine {
    fn build(&self, execution: &Execution) -> Result<BuildOutcome> {
        log::debug!(
            "building image {} from {}",
            execution.image_name(),
            execution.workspace_dir().display()
        );

        let mut child = Command::new("docker")
            .args(["build", "-t", execution.image_name(), "."])
            .current_dir(execution.workspace_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                JudgeError::SandboxUnavailable(format!("failed to spawn docker build: {}", e))
            })?;

        let stderr_reader = spawn_capped_reader(child.stderr.take(), STDERR_CAP_BYTES);

        let status = match wait_with_deadline(&mut child, self.build_budget)? {
            Some(status) => status,
            None => {
                kill_and_reap(&mut child);
                drain_reader(stderr_reader);
                return Ok(BuildOutcome {
                    ok: false,
                    stderr: format!("build timed out after {}s", self.build_budget.as_secs()),
                });
            }
        };

        let (stderr, _) = drain_reader(stderr_reader);
        Ok(BuildOutcome {
            ok: status.success(),
            stderr,
        })
    }

    fn run(&self, execution: &Execution) -> Result<RunOutcome> {
        let memory = format!("{}m", execution.memory_limit());
        let mut command = Command::new("docker");
        command
            .args(["run", "--rm", "-i", "--network", "none"])
            .args(["--name", execution.id()])
            .args(["--memory", &memory, "--memory-swap", &memory])
            .args(["--pids-limit", "64"])
            .arg(execution.image_name());

        let stdin = match execution.input_file() {
            Some(path) => Stdio::from(File::open(path)?),
            None => Stdio::null(),
        };

        let start = Instant::now();
        let mut child = command
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                JudgeError::SandboxUnavailable(format!("failed to spawn docker run: {}", e))
            })?;

        let stdout_reader = spawn_capped_reader(child.stdout.take(), self.output_cap_bytes);
        let stderr_reader = spawn_capped_reader(child.stderr.take(), STDERR_CAP_BYTES);

        let deadline = Duration::from_secs(execution.time_limit()) + RUN_GRACE;
        let (status, timed_out) = match wait_with_deadline(&mut child, deadline)? {
            Some(status) => (Some(status), false),
            None => {
                log::info!(
                    "{}: wall clock expired after {}s, killing container",
                    execution.id(),
                    execution.time_limit()
                );
                // Killing the client detaches it but leaves the container
                // running; the named force-remove takes the container down.
                remove_container(execution.id());
                kill_and_reap(&mut child);
                (None, true)
            }
        };
        let wall_clock = start.elapsed();

        let (stdout, stdout_truncated) = drain_reader(stdout_reader);
        let (stderr, _) = drain_reader(stderr_reader);

        let exit_code = status.map(exit_code).unwrap_or(OOM_EXIT_CODE);
        if exit_code == ENGINE_FAILURE_EXIT_CODE {
            return Err(JudgeError::SandboxUnavailable(format!(
                "docker run failed: {}",
                stderr.trim()
            )));
        }

        Ok(RunOutcome {
            exit_code,
            stdout,
            stderr,
            wall_clock,
            timed_out,
            // Fallback heuristic: without an explicit OOM signal from the
            // engine, SIGKILL outside the wall-clock window means the memory
            // controller fired.
            memory_killed: !timed_out && exit_code == OOM_EXIT_CODE,
            stdout_truncated,
        })
    }

    fn remove_image(&self, image_name: &str) -> Result<()> {
        let output = Command::new("docker")
            .args(["rmi", "-f", image_name])
            .output()
            .map_err(|e| {
                JudgeError::SandboxUnavailable(format!("failed to spawn docker rmi: {}", e))
            })?;
        if !output.status.success() {
            log::warn!(
                "failed to remove image {}: {}",
                image_name,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or_else(|| {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            status.signal().map(|s| 128 + s).unwrap_or(-1)
        }
        #[cfg(not(unix))]
        {
            -1
        }
    })
}

/// Poll for exit until `deadline`; `None` means the deadline expired with
/// the child still running.
fn wait_with_deadline(child: &mut Child, deadline: Duration) -> Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn remove_container(name: &str) {
    match Command::new("docker").args(["rm", "-f", name]).output() {
        Ok(output) if !output.status.success() => log::warn!(
            "failed to remove container {}: {}",
            name,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        Ok(_) => {}
        Err(e) => log::warn!("failed to spawn docker rm for {}: {}", name, e),
    }
}

fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::warn!("failed to kill container process: {}", e);
    }
    let _ = child.wait();
}

trait CapturedStream: Read + Send + 'static {}
impl CapturedStream for ChildStdout {}
impl CapturedStream for ChildStderr {}

/// Read a stream up to `cap` bytes on a dedicated thread. Past the cap the
/// stream keeps draining so the child never blocks on a full pipe.
fn spawn_capped_reader<R: CapturedStream>(
    stream: Option<R>,
    cap: usize,
) -> Option<JoinHandle<(String, bool)>> {
    let mut stream = stream?;
    Some(thread::spawn(move || {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8192];
        let mut truncated = false;
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    if buffer.len() < cap {
                        let take = n.min(cap - buffer.len());
                        buffer.extend_from_slice(&chunk[..take]);
                        truncated |= take < n;
                    } else {
                        truncated = true;
                    }
                }
                Err(_) => break,
            }
        }
        (String::from_utf8_lossy(&buffer).into_owned(), truncated)
    }))
}

fn drain_reader(handle: Option<JoinHandle<(String, bool)>>) -> (String, bool) {
    match handle {
        Some(handle) => handle.join().unwrap_or_else(|_| (String::new(), false)),
        None => (String::new(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    impl CapturedStream for Cursor<Vec<u8>> {}

    #[test]
    fn capped_reader_truncates_and_flags() {
        let stream = Cursor::new(vec![b'x'; 100]);
        let (data, truncated) = drain_reader(spawn_capped_reader(Some(stream), 10));
        assert_eq!(data.len(), 10);
        assert!(truncated);
    }

    #[test]
    fn capped_reader_passes_small_output_through() {
        let stream = Cursor::new(b"hello\n".to_vec());
        let (data, truncated) = drain_reader(spawn_capped_reader(Some(stream), 1024));
        assert_eq!(data, "hello\n");
        assert!(!truncated);
    }

    #[test]
    fn missing_stream_yields_empty_output() {
        let (data, truncated) = drain_reader(spawn_capped_reader(None::<ChildStdout>, 1024));
        assert!(data.is_empty());
        assert!(!truncated);
    }
}
