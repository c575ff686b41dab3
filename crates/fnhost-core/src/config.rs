//! host.toml configuration parser.
//!
//! ```toml
//! [job_host.scale]
//! is_target_scaling_enabled = true
//! scale_metrics_max_age = "2m"
//! scale_metrics_sample_interval = "10s"
//! metrics_purge_enabled = true
//!
//! [dispatcher]
//! admission_timeout = "60s"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::parse_duration_field;
use crate::error::{ConfigError, ConfigResult};

/// How long an invocation may wait for a ready dispatcher when
/// `[dispatcher] admission_timeout` is not set.
pub const DEFAULT_ADMISSION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    pub job_host: Option<JobHostConfig>,
    pub dispatcher: Option<DispatcherConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobHostConfig {
    pub scale: Option<ScaleSection>,
}

/// The operator-supplied `[job_host.scale]` section.
///
/// Every field is optional; only the fields that are present get bound
/// onto the scale options. Unknown keys are rejected so a misspelled key
/// cannot pass for an empty section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScaleSection {
    pub is_target_scaling_enabled: Option<bool>,
    pub scale_metrics_max_age: Option<String>,
    pub scale_metrics_sample_interval: Option<String>,
    pub metrics_purge_enabled: Option<bool>,
}

impl ScaleSection {
    /// A section with no keys counts as not configured.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherConfig {
    pub admission_timeout: Option<String>,
}

impl HostConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`, or fall back to an empty config when no path is given.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => {
                let config = Self::from_file(path)?;
                tracing::debug!(path = %path.display(), "host config loaded");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The explicit scale section, if the operator set one.
    pub fn scale_section(&self) -> Option<&ScaleSection> {
        self.job_host
            .as_ref()
            .and_then(|job_host| job_host.scale.as_ref())
            .filter(|section| !section.is_empty())
    }

    /// The admission wait budget for invocations.
    pub fn admission_timeout(&self) -> ConfigResult<Duration> {
        match self
            .dispatcher
            .as_ref()
            .and_then(|d| d.admission_timeout.as_deref())
        {
            Some(value) => parse_duration_field("admission_timeout", value),
            None => Ok(DEFAULT_ADMISSION_TIMEOUT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_has_no_scale_section() {
        let config = HostConfig::from_toml_str("").unwrap();
        assert!(config.scale_section().is_none());
        assert_eq!(config.admission_timeout().unwrap(), DEFAULT_ADMISSION_TIMEOUT);
    }

    #[test]
    fn parses_nested_scale_section() {
        let toml_str = r#"
[job_host.scale]
is_target_scaling_enabled = false
scale_metrics_max_age = "5m"
"#;
        let config = HostConfig::from_toml_str(toml_str).unwrap();
        let section = config.scale_section().unwrap();
        assert_eq!(section.is_target_scaling_enabled, Some(false));
        assert_eq!(section.scale_metrics_max_age.as_deref(), Some("5m"));
        assert_eq!(section.metrics_purge_enabled, None);
    }

    #[test]
    fn empty_scale_table_counts_as_absent() {
        let config = HostConfig::from_toml_str("[job_host.scale]\n").unwrap();
        assert!(config.job_host.as_ref().unwrap().scale.is_some());
        assert!(config.scale_section().is_none());
    }

    #[test]
    fn misspelled_scale_key_is_rejected() {
        let err = HostConfig::from_toml_str("[job_host.scale]\nis_target_scaling_enable = false\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("is_target_scaling_enable"), "{err}");
    }

    #[test]
    fn misspelled_dispatcher_key_is_rejected() {
        let result = HostConfig::from_toml_str("[dispatcher]\nadmission_timout = \"5s\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn admission_timeout_is_parsed() {
        let config = HostConfig::from_toml_str("[dispatcher]\nadmission_timeout = \"250ms\"\n").unwrap();
        assert_eq!(config.admission_timeout().unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn bad_admission_timeout_is_rejected() {
        let config = HostConfig::from_toml_str("[dispatcher]\nadmission_timeout = \"never\"\n").unwrap();
        assert!(matches!(
            config.admission_timeout(),
            Err(ConfigError::InvalidDuration { field: "admission_timeout", .. })
        ));
    }

    #[test]
    fn load_reads_file_and_defaults_without_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[job_host.scale]\nmetrics_purge_enabled = false").unwrap();

        let config = HostConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config.scale_section().unwrap().metrics_purge_enabled,
            Some(false)
        );

        assert_eq!(HostConfig::load(None).unwrap(), HostConfig::default());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = HostConfig::from_file(Path::new("/nonexistent/host.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/host.toml"));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = HostConfig {
            job_host: Some(JobHostConfig {
                scale: Some(ScaleSection {
                    is_target_scaling_enabled: Some(true),
                    ..ScaleSection::default()
                }),
            }),
            dispatcher: None,
        };
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("is_target_scaling_enabled = true"));
        assert_eq!(HostConfig::from_toml_str(&toml_str).unwrap(), config);
    }
}
