//! fnhost-core — shared configuration and environment plumbing.
//!
//! Everything the host reads at startup lives here: the `host.toml`
//! schema, duration strings, and the environment flags that decide
//! whether runtime scale monitoring and target-based scaling are on.

pub mod config;
pub mod duration;
pub mod env;
pub mod error;

pub use config::{DispatcherConfig, HostConfig, JobHostConfig, ScaleSection};
pub use duration::{parse_duration, parse_duration_field};
pub use env::{Environment, InMemoryEnvironment, SystemEnvironment};
pub use error::{ConfigError, ConfigResult};
