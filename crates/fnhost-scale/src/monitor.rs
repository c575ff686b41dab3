//! Scale monitor service — reports the active scaling mode.
//!
//! When runtime scale monitoring is off the service stays silent. When
//! it is on, starting the service writes exactly one line saying
//! whether target-based scaling is enabled, so operators can tell the
//! scaling mode apart from the host log alone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use fnhost_core::Environment;

use crate::options::ScaleOptions;

pub const STARTED_TARGET_SCALING_ENABLED: &str =
    "Scale monitor service started. Target base scaling is enabled.";
pub const STARTED_TARGET_SCALING_DISABLED: &str =
    "Scale monitor service started. Target base scaling is disabled.";

pub struct ScaleMonitorService {
    options: Arc<ScaleOptions>,
    monitoring_enabled: bool,
    running: AtomicBool,
}

impl ScaleMonitorService {
    /// Create a service, reading whether runtime scale monitoring is on
    /// from `env`.
    pub fn new(options: Arc<ScaleOptions>, env: &dyn Environment) -> Self {
        Self::with_monitoring(options, env.is_runtime_scale_monitoring_enabled())
    }

    pub fn with_monitoring(options: Arc<ScaleOptions>, monitoring_enabled: bool) -> Self {
        Self {
            options,
            monitoring_enabled,
            running: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &ScaleOptions {
        &self.options
    }

    pub fn is_monitoring_enabled(&self) -> bool {
        self.monitoring_enabled
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start the service. Returns whether it is running afterwards.
    ///
    /// Starting twice does not log twice.
    pub fn start(&self) -> bool {
        if !self.monitoring_enabled {
            return false;
        }
        if self.running.swap(true, Ordering::AcqRel) {
            return true;
        }

        if self.options.is_target_scaling_enabled {
            info!("{STARTED_TARGET_SCALING_ENABLED}");
        } else {
            info!("{STARTED_TARGET_SCALING_DISABLED}");
        }
        true
    }

    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            debug!("scale monitor service stopped");
        }
    }
}
