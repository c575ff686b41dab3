//! fnhost-scale — which scaling mode is active.
//!
//! Resolved once at host start:
//!
//! ```text
//! [job_host.scale] present  → bind its fields onto ScaleOptions::default()
//! otherwise                 → is_target_scaling_enabled =
//!                                 environment.is_target_based_scaling_enabled()
//! ```
//!
//! The resulting [`ScaleOptions`] never change afterwards. The
//! [`ScaleMonitorService`] reports the decision in the host log when
//! runtime scale monitoring is enabled.

pub mod monitor;
pub mod options;

pub use monitor::ScaleMonitorService;
pub use options::{resolve, ScaleOptions};
