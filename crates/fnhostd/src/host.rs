//! Host assembly and lifecycle.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use fnhost_core::{Environment, HostConfig};
use fnhost_dispatch::{
    state_cell, AdmissionGate, DispatcherState, DispatcherStateWriter, HostLifetime,
};
use fnhost_scale::{resolve, ScaleMonitorService, ScaleOptions};

/// Why [`Host::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostExit {
    /// The external shutdown signal fired.
    Shutdown,
    /// The admission gate gave up on the dispatcher and asked for a stop.
    StopRequested,
}

pub struct Host {
    state: DispatcherStateWriter,
    gate: AdmissionGate,
    lifetime: Arc<HostLifetime>,
    scale_monitor: ScaleMonitorService,
}

impl Host {
    pub fn build(config: &HostConfig, env: &dyn Environment) -> anyhow::Result<Self> {
        let options = resolve(config.scale_section(), env)?;
        let scale_monitor = ScaleMonitorService::new(Arc::new(options), env);

        let (state, reader) = state_cell();
        let lifetime = Arc::new(HostLifetime::new());
        let gate = AdmissionGate::from_config(reader, lifetime.clone(), config)?;

        Ok(Self {
            state,
            gate,
            lifetime,
            scale_monitor,
        })
    }

    /// Run until `shutdown` resolves or a host stop is requested, then
    /// dispose the dispatcher.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> anyhow::Result<HostExit> {
        self.scale_monitor.start();
        self.state.transition(DispatcherState::Initializing)?;
        info!(
            admission_timeout = ?self.gate.timeout(),
            target_scaling = self.scale_monitor.options().is_target_scaling_enabled,
            "host started, waiting for workers"
        );

        let exit = tokio::select! {
            _ = shutdown => HostExit::Shutdown,
            _ = self.lifetime.stop_requested() => {
                warn!("admission gate requested a host stop");
                HostExit::StopRequested
            }
        };

        self.state.transition(DispatcherState::Disposing)?;
        self.scale_monitor.stop();
        self.state.transition(DispatcherState::Disposed)?;
        info!(?exit, "host stopped");
        Ok(exit)
    }
}

/// Resolve scale options and start the scale monitor once so the
/// decision shows up in the log.
pub fn report_scale(config: &HostConfig, env: &dyn Environment) -> anyhow::Result<ScaleOptions> {
    let options = resolve(config.scale_section(), env)?;
    let monitor = ScaleMonitorService::new(Arc::new(options.clone()), env);
    monitor.start();
    monitor.stop();
    Ok(options)
}
