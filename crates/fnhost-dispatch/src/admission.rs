//! Invocation admission gate.
//!
//! Every invocation passes through [`AdmissionGate`] before it is handed
//! to a language worker. The gate admits immediately while the
//! dispatcher is `Initialized`. Otherwise it suspends until the
//! dispatcher becomes ready or the admission timeout elapses. A timeout
//! means no worker came up in time; the gate then asks the hosting
//! runtime to stop the process so it restarts with fresh workers. The
//! caller only sees that the invocation was not admitted.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use fnhost_core::HostConfig;

use crate::cancellation::{compose, InvocationCancellation};
use crate::error::DispatchResult;
use crate::lifetime::ApplicationLifetime;
use crate::state::{DispatcherState, DispatcherStateReader};

/// One unit of work on its way to a worker.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub function_name: String,
    pub invocation_id: String,
    /// Cancellation from the invoking framework.
    pub cancellation: Option<CancellationToken>,
    /// Cancellation from the transport request, e.g. a client disconnect.
    pub request_cancellation: Option<CancellationToken>,
}

impl InvocationRequest {
    pub fn new(function_name: impl Into<String>, invocation_id: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            invocation_id: invocation_id.into(),
            cancellation: None,
            request_cancellation: None,
        }
    }

    /// Builder method: set the framework cancellation token.
    pub fn with_cancellation(self, token: CancellationToken) -> Self {
        Self {
            cancellation: Some(token),
            ..self
        }
    }

    /// Builder method: set the request-scoped cancellation token.
    pub fn with_request_cancellation(self, token: CancellationToken) -> Self {
        Self {
            request_cancellation: Some(token),
            ..self
        }
    }
}

/// Outcome of a single admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The dispatcher is ready; run the invocation.
    Admitted,
    /// The dispatcher never became ready. A host stop has been requested.
    TimedOut,
    /// The host is shutting down; the invocation will never run.
    HostStopping(DispatcherState),
}

/// An invocation that made it through the gate.
#[derive(Debug)]
pub struct AdmittedInvocation {
    pub function_name: String,
    pub invocation_id: String,
    cancellation: InvocationCancellation,
    waited: Duration,
}

impl AdmittedInvocation {
    /// Combined framework and request cancellation.
    pub fn cancellation(&self) -> &InvocationCancellation {
        &self.cancellation
    }

    /// How long the invocation was held at the gate.
    pub fn waited(&self) -> Duration {
        self.waited
    }
}

/// Gates invocations on dispatcher readiness.
///
/// Cheap to clone; every clone observes the same dispatcher state and
/// escalates to the same host lifetime.
#[derive(Clone)]
pub struct AdmissionGate {
    state: DispatcherStateReader,
    lifetime: Arc<dyn ApplicationLifetime>,
    timeout: Duration,
}

impl AdmissionGate {
    pub fn new(
        state: DispatcherStateReader,
        lifetime: Arc<dyn ApplicationLifetime>,
        timeout: Duration,
    ) -> Self {
        Self {
            state,
            lifetime,
            timeout,
        }
    }

    /// Build a gate using `[dispatcher] admission_timeout` from `config`.
    pub fn from_config(
        state: DispatcherStateReader,
        lifetime: Arc<dyn ApplicationLifetime>,
        config: &HostConfig,
    ) -> DispatchResult<Self> {
        Ok(Self::new(state, lifetime, config.admission_timeout()?))
    }

    /// The admission wait budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait until `function` may run.
    ///
    /// Returns an error only if the dispatcher state can no longer be
    /// observed, which means the lifecycle manager is gone.
    pub async fn admit(&self, function: &str) -> DispatchResult<Admission> {
        let current = self.state.current();
        if current.is_ready() {
            return Ok(Admission::Admitted);
        }
        if current.is_stopping() {
            debug!(%function, state = %current, "host stopping, invocation withheld");
            return Ok(Admission::HostStopping(current));
        }

        debug!(
            %function,
            state = %current,
            timeout = ?self.timeout,
            "dispatcher not ready, delaying invocation"
        );
        let started = Instant::now();

        match tokio::time::timeout(self.timeout, self.state.settled()).await {
            Ok(Ok(state)) if state.is_ready() => {
                info!(
                    %function,
                    waited = ?started.elapsed(),
                    "dispatcher ready, invocation admitted"
                );
                Ok(Admission::Admitted)
            }
            Ok(Ok(state)) => {
                debug!(%function, %state, "host stopping, invocation withheld");
                Ok(Admission::HostStopping(state))
            }
            Ok(Err(e)) => {
                error!(%function, error = %e, "lost dispatcher state while waiting for admission");
                Err(e)
            }
            Err(_) => {
                error!(
                    %function,
                    state = %self.state.current(),
                    timeout = ?self.timeout,
                    "dispatcher not ready within admission timeout, stopping host"
                );
                self.stop_host();
                Ok(Admission::TimedOut)
            }
        }
    }

    /// Admit `request` and link its cancellation sources.
    ///
    /// `None` means the invocation was withheld and must not run.
    pub async fn enter(
        &self,
        request: InvocationRequest,
    ) -> DispatchResult<Option<AdmittedInvocation>> {
        let started = Instant::now();
        match self.admit(&request.function_name).await? {
            Admission::Admitted => {}
            outcome => {
                debug!(
                    function = %request.function_name,
                    invocation_id = %request.invocation_id,
                    ?outcome,
                    "invocation not admitted"
                );
                return Ok(None);
            }
        }

        Ok(Some(AdmittedInvocation {
            cancellation: compose(request.cancellation, request.request_cancellation),
            function_name: request.function_name,
            invocation_id: request.invocation_id,
            waited: started.elapsed(),
        }))
    }

    fn stop_host(&self) {
        // Stop failures never reach the invocation's caller.
        if let Err(e) = self.lifetime.stop_application() {
            error!(error = %e, "failed to request host stop");
        }
    }
}
