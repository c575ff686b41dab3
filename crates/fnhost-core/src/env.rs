//! Environment flags.
//!
//! The host reads a handful of process environment variables to decide
//! how scaling behaves when `host.toml` is silent. Access goes through
//! the [`Environment`] trait so tests can supply their own values.

use std::collections::HashMap;

use tracing::warn;

/// Enables runtime scale monitoring (`1`/`true`).
pub const RUNTIME_SCALE_MONITORING_ENABLED: &str = "FUNCTIONS_RUNTIME_SCALE_MONITORING_ENABLED";
/// Explicit override for target-based scaling (`0`/`false` disables it).
pub const TARGET_BASED_SCALING_ENABLED: &str = "TARGET_BASED_SCALING_ENABLED";
/// Comma-separated list of feature flags.
pub const FEATURE_FLAGS: &str = "FUNCTIONS_FEATURE_FLAGS";
/// Feature flag that turns target-based scaling off.
pub const FEATURE_FLAG_DISABLE_TARGET_BASED_SCALING: &str = "DisableTargetBasedScaling";

/// Read-only view of the process environment.
pub trait Environment: Send + Sync {
    /// Look up a single variable.
    fn var(&self, name: &str) -> Option<String>;

    /// Whether runtime scale monitoring is enabled for this host.
    fn is_runtime_scale_monitoring_enabled(&self) -> bool {
        flag(self, RUNTIME_SCALE_MONITORING_ENABLED).unwrap_or(false)
    }

    /// Whether `name` appears in the feature flag list.
    fn has_feature_flag(&self, name: &str) -> bool {
        self.var(FEATURE_FLAGS).is_some_and(|flags| {
            flags
                .split(',')
                .any(|f| f.trim().eq_ignore_ascii_case(name))
        })
    }

    /// Whether target-based scaling is enabled.
    ///
    /// An explicit `TARGET_BASED_SCALING_ENABLED` wins, then the
    /// `DisableTargetBasedScaling` feature flag; otherwise target-based
    /// scaling follows runtime scale monitoring.
    fn is_target_based_scaling_enabled(&self) -> bool {
        if let Some(enabled) = flag(self, TARGET_BASED_SCALING_ENABLED) {
            return enabled;
        }
        if self.has_feature_flag(FEATURE_FLAG_DISABLE_TARGET_BASED_SCALING) {
            return false;
        }
        self.is_runtime_scale_monitoring_enabled()
    }
}

fn flag<E: Environment + ?Sized>(env: &E, name: &str) -> Option<bool> {
    let value = env.var(name)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "" => None,
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => {
            warn!(variable = name, %value, "ignoring unrecognized boolean flag");
            None
        }
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEnvironment {
    vars: HashMap<String, String>,
}

impl InMemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set a variable.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
    }
}

impl Environment for InMemoryEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
