//! Scale options and their resolution from config or environment.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use fnhost_core::{parse_duration_field, ConfigResult, Environment, ScaleSection};

/// Scaling behaviour for the whole host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaleOptions {
    /// Oldest scale metric sample still considered.
    pub scale_metrics_max_age: Duration,
    /// How often scale metrics are sampled.
    pub scale_metrics_sample_interval: Duration,
    /// Whether expired metric samples are purged.
    pub metrics_purge_enabled: bool,
    /// Target-based (proactive) scaling instead of monitor-based scaling.
    pub is_target_scaling_enabled: bool,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            scale_metrics_max_age: Duration::from_secs(2 * 60),
            scale_metrics_sample_interval: Duration::from_secs(10),
            metrics_purge_enabled: true,
            is_target_scaling_enabled: true,
        }
    }
}

impl ScaleOptions {
    /// Bind every field present in `section` onto the defaults.
    pub fn from_section(section: &ScaleSection) -> ConfigResult<Self> {
        let mut options = Self::default();
        if let Some(enabled) = section.is_target_scaling_enabled {
            options.is_target_scaling_enabled = enabled;
        }
        if let Some(max_age) = section.scale_metrics_max_age.as_deref() {
            options.scale_metrics_max_age = parse_duration_field("scale_metrics_max_age", max_age)?;
        }
        if let Some(interval) = section.scale_metrics_sample_interval.as_deref() {
            options.scale_metrics_sample_interval =
                parse_duration_field("scale_metrics_sample_interval", interval)?;
        }
        if let Some(purge) = section.metrics_purge_enabled {
            options.metrics_purge_enabled = purge;
        }
        Ok(options)
    }

    /// Defaults, with target-based scaling taken from the environment.
    pub fn from_environment(env: &dyn Environment) -> Self {
        Self {
            is_target_scaling_enabled: env.is_target_based_scaling_enabled(),
            ..Self::default()
        }
    }
}

/// Resolve the host's scale options.
///
/// An explicit section always wins; the environment is not consulted
/// at all in that case.
pub fn resolve(
    explicit: Option<&ScaleSection>,
    env: &dyn Environment,
) -> ConfigResult<ScaleOptions> {
    let (options, source) = match explicit {
        Some(section) => (ScaleOptions::from_section(section)?, "configuration"),
        None => (ScaleOptions::from_environment(env), "environment"),
    };
    debug!(
        source,
        target_scaling = options.is_target_scaling_enabled,
        "scale options resolved"
    );
    Ok(options)
}
