//! The judge service: composition root and pipeline.
//!
//! Wires the validator, registry, admission controller, sandbox driver, and
//! metric sinks into one object. `judge` is the single entry point: one
//! request in, one reply out, with the slot and workspace released on every
//! exit path.

pub mod admission;
pub mod validate;

use crate::config::settings::JudgeConfig;
use crate::config::types::{JudgeError, Result};
use crate::judge::workspace::WorkspaceManager;
use crate::judge::{Execution, ExecutionRegistry, Request};
use crate::observability::MetricsRegistry;
use crate::sandbox::ContainerEngine;
use crate::verdict::{classifier, Response};
use admission::AdmissionController;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fixed body served with HTTP 429.
pub const THROTTLED_MESSAGE: &str = "Request throttled, service reached max allowed requests";

/// Everything the HTTP collaborator needs to answer one request.
#[derive(Clone, Debug)]
pub enum JudgeReply {
    /// A completed judgment, any verdict. HTTP 200.
    Completed(Response),
    /// Request rejected before admission. HTTP 400.
    BadRequest(String),
    /// Admission ceiling reached. HTTP 429, fixed body.
    Throttled,
    /// Infrastructure fault; the submission was not judged. HTTP 500.
    Unavailable(String),
}

impl JudgeReply {
    pub fn http_status(&self) -> u16 {
        match self {
            JudgeReply::Completed(_) => 200,
            JudgeReply::BadRequest(_) => 400,
            JudgeReply::Throttled => 429,
            JudgeReply::Unavailable(_) => 500,
        }
    }
}

pub struct JudgeService {
    config: JudgeConfig,
    registry: ExecutionRegistry,
    engine: Arc<dyn ContainerEngine>,
    admission: AdmissionController,
    workspaces: WorkspaceManager,
    metrics: Arc<MetricsRegistry>,
}

impl JudgeService {
    pub fn new(
        config: JudgeConfig,
        engine: Arc<dyn ContainerEngine>,
        metrics: Arc<MetricsRegistry>,
    ) -> Result<Self> {
        config.validate()?;
        let workspaces = WorkspaceManager::new(config.workspace_root.clone())?;
        let registry = ExecutionRegistry::with_defaults(config.workspace_root.clone());
        let admission = AdmissionController::new(config.max_requests, Arc::clone(&metrics));
        Ok(Self {
            config,
            registry,
            engine,
            admission,
            workspaces,
            metrics,
        })
    }

    pub fn registry(&self) -> &ExecutionRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn in_flight(&self) -> u64 {
        self.admission.in_flight()
    }

    /// Judge one submission end to end.
    pub fn judge(&self, request: Request) -> JudgeReply {
        if let Err(e) = validate::validate(&request, &self.config) {
            return JudgeReply::BadRequest(e.to_string());
        }

        let execution = match self.registry.create(request) {
            Ok(execution) => execution,
            Err(e) if e.is_infrastructure() => return JudgeReply::Unavailable(e.to_string()),
            Err(e) => return JudgeReply::BadRequest(e.to_string()),
        };

        let _slot = match self.admission.try_acquire() {
            Some(slot) => slot,
            None => {
                log::info!(
                    "{}: throttled, {} requests in flight",
                    execution.image_name(),
                    self.admission.in_flight()
                );
                return JudgeReply::Throttled;
            }
        };

        log::info!(
            "new request: {}, in flight: {}",
            execution.image_name(),
            self.admission.in_flight()
        );

        let started = Instant::now();
        let reply = self.run_pipeline(&execution);

        if self.config.delete_image {
            if let Err(e) = self.engine.remove_image(execution.image_name()) {
                log::warn!("{}: image removal failed: {}", execution.id(), e);
            }
        }

        if let JudgeReply::Completed(response) = &reply {
            self.metrics.judgment_duration.observe(started.elapsed());
            log::info!(
                "{}: verdict {} in {:?}",
                execution.id(),
                response.status,
                started.elapsed()
            );
        }

        reply
    }

    /// Remove workspaces left behind by a previous process. Run at startup.
    pub fn sweep_stale_workspaces(&self, max_age: Duration) -> Result<usize> {
        self.workspaces.sweep_stale(max_age)
    }

    fn run_pipeline(&self, execution: &Execution) -> JudgeReply {
        let build = match self.engine.build(execution) {
            Ok(build) => build,
            Err(e) => return self.sandbox_failure(execution, "build", e),
        };
        if !build.ok {
            log::info!("{}: build failed", execution.id());
        }

        let run = if build.ok {
            match self.engine.run(execution) {
                Ok(run) => Some(run),
                Err(e) => return self.sandbox_failure(execution, "run", e),
            }
        } else {
            None
        };

        let expected = match execution.read_expected_output() {
            Ok(expected) => expected,
            Err(e) => return self.sandbox_failure(execution, "expected output read", e),
        };

        let judgment = classifier::classify(&build, run.as_ref(), &expected);
        self.metrics.record_verdict(judgment.verdict);
        JudgeReply::Completed(Response::from(judgment))
    }

    fn sandbox_failure(&self, execution: &Execution, phase: &str, error: JudgeError) -> JudgeReply {
        self.metrics.sandbox_failures.inc();
        log::error!("{}: {} phase failed: {}", execution.id(), phase, error);
        JudgeReply::Unavailable(error.to_string())
    }
}

