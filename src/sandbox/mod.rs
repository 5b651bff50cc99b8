//! Sandbox driver.
//!
//! The container engine is opaque to the pipeline: anything that can build
//! an image from a workspace, run it under CPU-time and memory caps, and
//! report exit status plus OOM evidence satisfies `ContainerEngine`.

pub mod docker;

use crate::config::types::Result;
use crate::judge::Execution;
use std::time::Duration;

/// Outcome of the build phase. `ok == false` with captured stderr is a
/// compilation failure, not an infrastructure fault.
#[derive(Clone, Debug)]
pub struct BuildOutcome {
    pub ok: bool,
    pub stderr: String,
}

/// Outcome of the run phase.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Meaningful only when `timed_out` is false.
    pub wall_clock: Duration,
    pub timed_out: bool,
    pub memory_killed: bool,
    pub stdout_truncated: bool,
}

/// Contract between the pipeline and the container engine.
///
/// Engine-level failures (daemon unreachable, spawn failure) surface as
/// `JudgeError::SandboxUnavailable`; the classifier is never invoked on them.
pub trait ContainerEngine: Send + Sync {
    /// Build an isolated image from the execution's workspace.
    fn build(&self, execution: &Execution) -> Result<BuildOutcome>;

    /// Run the built image with the execution's caps, stdin piped from the
    /// input file when present.
    fn run(&self, execution: &Execution) -> Result<RunOutcome>;

    /// Remove the built image by name. Failures are logged, not fatal.
    fn remove_image(&self, image_name: &str) -> Result<()>;
}
