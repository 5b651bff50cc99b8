// Service configuration loaded from the environment.
// Validation is strict at startup: an invalid ceiling or an inverted limit
// range must fail fast with an actionable error, never surface mid-request.

use crate::config::types::{JudgeError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MIN_TIME_LIMIT: u64 = 1;
const DEFAULT_MAX_TIME_LIMIT: u64 = 15;
const DEFAULT_MIN_MEMORY_LIMIT: u64 = 1;
const DEFAULT_MAX_MEMORY_LIMIT: u64 = 10_000;
const DEFAULT_OUTPUT_CAP_BYTES: usize = 1024 * 1024;
const DEFAULT_BUILD_BUDGET_SECS: u64 = 60;

/// Service-wide judge settings.
#[derive(Clone, Debug)]
pub struct JudgeConfig {
    /// Admission ceiling: maximum concurrently judged submissions.
    pub max_requests: u64,
    /// Bounds on the per-submission time limit, seconds.
    pub min_time_limit: u64,
    pub max_time_limit: u64,
    /// Bounds on the per-submission memory limit, MB.
    pub min_memory_limit: u64,
    pub max_memory_limit: u64,
    /// Remove the built sandbox image after judgment.
    pub delete_image: bool,
    /// Root directory holding per-execution workspaces.
    pub workspace_root: PathBuf,
    /// Captured-stdout cap for the run phase, bytes.
    pub output_cap_bytes: usize,
    /// Fixed budget for the build phase.
    pub build_budget: Duration,
}

impl JudgeConfig {
    /// Load settings from the environment.
    ///
    /// `COMPILER_MAX_REQUESTS` is required; everything else falls back to
    /// defaults. The returned config has already passed `validate`.
    pub fn from_env() -> Result<Self> {
        let max_requests = std::env::var("COMPILER_MAX_REQUESTS")
            .map_err(|_| {
                JudgeError::Config("COMPILER_MAX_REQUESTS must be set (positive integer)".to_string())
            })
            .and_then(|raw| parse_var("COMPILER_MAX_REQUESTS", &raw))?;

        let config = Self {
            max_requests,
            min_time_limit: env_or("COMPILER_EXECUTION_MIN_TIME", DEFAULT_MIN_TIME_LIMIT)?,
            max_time_limit: env_or("COMPILER_EXECUTION_MAX_TIME", DEFAULT_MAX_TIME_LIMIT)?,
            min_memory_limit: env_or("COMPILER_EXECUTION_MIN_MEMORY", DEFAULT_MIN_MEMORY_LIMIT)?,
            max_memory_limit: env_or("COMPILER_EXECUTION_MAX_MEMORY", DEFAULT_MAX_MEMORY_LIMIT)?,
            delete_image: env_or("COMPILER_DELETE_DOCKER_IMAGE", true)?,
            workspace_root: std::env::var_os("COMPILER_WORKSPACE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(default_workspace_root),
            output_cap_bytes: env_or("COMPILER_OUTPUT_CAP_BYTES", DEFAULT_OUTPUT_CAP_BYTES)?,
            build_budget: Duration::from_secs(env_or(
                "COMPILER_BUILD_BUDGET_SECS",
                DEFAULT_BUILD_BUDGET_SECS,
            )?),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the settings, collecting every problem before failing.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.max_requests == 0 {
            errors.push("max_requests must be a positive integer".to_string());
        }
        if self.min_time_limit == 0 {
            errors.push("min time limit cannot be zero".to_string());
        }
        if self.min_time_limit > self.max_time_limit {
            errors.push(format!(
                "time limit range is inverted: min {} > max {}",
                self.min_time_limit, self.max_time_limit
            ));
        }
        if self.min_memory_limit == 0 {
            errors.push("min memory limit cannot be zero".to_string());
        }
        if self.min_memory_limit > self.max_memory_limit {
            errors.push(format!(
                "memory limit range is inverted: min {} > max {}",
                self.min_memory_limit, self.max_memory_limit
            ));
        }
        if self.output_cap_bytes == 0 {
            errors.push("output cap cannot be zero".to_string());
        }
        if self.build_budget.is_zero() {
            errors.push("build budget cannot be zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(JudgeError::Config(errors.join("; ")))
        }
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            min_time_limit: DEFAULT_MIN_TIME_LIMIT,
            max_time_limit: DEFAULT_MAX_TIME_LIMIT,
            min_memory_limit: DEFAULT_MIN_MEMORY_LIMIT,
            max_memory_limit: DEFAULT_MAX_MEMORY_LIMIT,
            delete_image: true,
            workspace_root: default_workspace_root(),
            output_cap_bytes: DEFAULT_OUTPUT_CAP_BYTES,
            build_budget: Duration::from_secs(DEFAULT_BUILD_BUDGET_SECS),
        }
    }
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir().join("judgebox")
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => parse_var(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| JudgeError::Config(format!("{} has invalid value {:?}", key, raw)))
}
