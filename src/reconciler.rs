//! Readiness wait and model reconciliation
//!
//! The core of a provisioning run: wait for the daemon to answer a list
//! call (bounded retries, fixed delay), diff installed models against the
//! required set, and pull whatever is missing. A single pull failure aborts
//! the run; reconciliation only ever adds models, never removes one.

use crate::client::ModelService;
use crate::error::InitError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

/// Readiness retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            delay: Duration::from_secs(2),
        }
    }
}

/// Delay between readiness probes, injectable so tests run without wall-clock waits
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real delay backed by the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How a single required model was accounted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    AlreadyInstalled,
    Pulled,
}

impl std::fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInstalled => write!(f, "already installed"),
            Self::Pulled => write!(f, "pulled"),
        }
    }
}

/// Per-model record of a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReport {
    pub model: String,
    pub status: ModelStatus,
}

/// Outcome of a full provisioning run
///
/// A tagged result rather than an error chain: callers branch on the
/// variant to pick exit codes and messages.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every required model is accounted for
    Success(Vec<ModelReport>),
    /// The readiness probe exhausted its retry budget
    ServiceUnreachable { attempts: u32 },
    /// A pull errored; `completed` holds the models handled before the abort
    PullFailed {
        model: String,
        reason: String,
        completed: Vec<ModelReport>,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Convert into a `Result`, surfacing the fatal variants as [`InitError`]
    pub fn into_result(self) -> Result<Vec<ModelReport>, InitError> {
        match self {
            Self::Success(reports) => Ok(reports),
            Self::ServiceUnreachable { attempts } => {
                Err(InitError::ServiceUnreachable { attempts })
            }
            Self::PullFailed { model, reason, .. } => Err(InitError::PullFailed { model, reason }),
        }
    }
}

/// Waits for the model service and installs missing required models
pub struct Reconciler<S: ModelService> {
    service: S,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
}

impl<S: ModelService> Reconciler<S> {
    /// Create a reconciler using the real tokio timer between probes
    pub fn new(service: S, policy: RetryPolicy) -> Self {
        Self::with_sleeper(service, policy, Box::new(TokioSleeper))
    }

    /// Create a reconciler with an injected delay implementation
    pub fn with_sleeper(service: S, policy: RetryPolicy, sleeper: Box<dyn Sleeper>) -> Self {
        Self {
            service,
            policy,
            sleeper,
        }
    }

    /// Access the underlying service, mainly for test assertions on fakes
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Probe the service until it answers a list call or the budget runs out
    ///
    /// The first success short-circuits remaining attempts. The fixed delay
    /// runs between failed attempts only, never after the final one.
    pub async fn wait_for_service(&self) -> Result<(), InitError> {
        for attempt in 1..=self.policy.max_attempts {
            tracing::debug!(attempt, "Probing model service");
            match self.service.list().await {
                Ok(models) => {
                    tracing::info!(
                        attempt,
                        models = models.len(),
                        "Model service is ready"
                    );
                    return Ok(());
                }
                Err(e) if attempt < self.policy.max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %e,
                        "Waiting for model service"
                    );
                    self.sleeper.sleep(self.policy.delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        attempts = self.policy.max_attempts,
                        error = %e,
                        "Giving up on model service"
                    );
                }
            }
        }

        Err(InitError::ServiceUnreachable {
            attempts: self.policy.max_attempts,
        })
    }

    /// Full run: readiness wait, then reconcile the required set
    ///
    /// If the readiness probe never succeeds, reconciliation is not
    /// attempted at all.
    pub async fn run(&self, required: &[String]) -> RunOutcome {
        if let Err(InitError::ServiceUnreachable { attempts }) = self.wait_for_service().await {
            return RunOutcome::ServiceUnreachable { attempts };
        }

        self.reconcile(required).await
    }

    /// Diff installed models against `required` and pull the difference, in order
    async fn reconcile(&self, required: &[String]) -> RunOutcome {
        let installed = match self.service.list().await {
            Ok(models) => models,
            Err(e) => {
                tracing::error!(error = %e, "Model service dropped out before reconciliation");
                return RunOutcome::ServiceUnreachable { attempts: 1 };
            }
        };

        let installed: HashSet<&str> = installed.iter().map(|m| m.name.as_str()).collect();
        let mut reports = Vec::with_capacity(required.len());

        for model in required {
            if installed.contains(model.as_str()) {
                tracing::info!(model = %model, "Model is already installed");
                reports.push(ModelReport {
                    model: model.clone(),
                    status: ModelStatus::AlreadyInstalled,
                });
                continue;
            }

            tracing::info!(model = %model, "Pulling model");
            match self.service.pull(model).await {
                Ok(()) => {
                    tracing::info!(model = %model, "Successfully pulled model");
                    reports.push(ModelReport {
                        model: model.clone(),
                        status: ModelStatus::Pulled,
                    });
                }
                Err(e) => {
                    tracing::error!(model = %model, error = %e, "Failed to pull model");
                    return RunOutcome::PullFailed {
                        model: model.clone(),
                        reason: format!("{:#}", e),
                        completed: reports,
                    };
                }
            }
        }

        RunOutcome::Success(reports)
    }
}
