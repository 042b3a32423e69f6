use gcp_compute::DEFAULT_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ProviderError, Result};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// CredentialsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsSource {
    /// Unauthenticated; only useful against emulators and test servers.
    #[default]
    None,
    /// OAuth2 access token read from an environment variable.
    Env,
    /// OAuth2 access token read from a file.
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub source: CredentialsSource,
    #[serde(default = "default_token_env")]
    pub env_var: String,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_token_env() -> String {
    "GOOGLE_OAUTH_ACCESS_TOKEN".to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            source: CredentialsSource::None,
            env_var: default_token_env(),
            path: None,
        }
    }
}

impl CredentialsConfig {
    /// Resolve the bearer token. Re-read on every call so a rotated token
    /// is picked up by the next connect.
    pub fn access_token(&self) -> Result<Option<String>> {
        let token = match self.source {
            CredentialsSource::None => return Ok(None),
            CredentialsSource::Env => std::env::var(&self.env_var).map_err(|_| {
                ProviderError::Credentials(format!(
                    "environment variable {} is not set",
                    self.env_var
                ))
            })?,
            CredentialsSource::File => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ProviderError::Credentials("credentials.path is required".to_string())
                })?;
                std::fs::read_to_string(path).map_err(|e| {
                    ProviderError::Credentials(format!("cannot read {}: {e}", path.display()))
                })?
            }
        };
        let token = token.trim();
        if token.is_empty() {
            return Err(ProviderError::Credentials("access token is empty".to_string()));
        }
        Ok(Some(token.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ProviderConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_region")]
    pub default_region: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_region() -> String {
    "us-central1".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ProviderConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            default_region: default_region(),
            endpoint: default_endpoint(),
            credentials: CredentialsConfig::default(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ProviderError::InvalidConfig(format!(
                "{} does not exist",
                path.display()
            )));
        }
        let data = std::fs::read_to_string(path)?;
        let config: ProviderConfig = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::store::atomic_write(path, data.as_bytes())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the config for mistakes that would only show up at connect time.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut push = |level, message: String| warnings.push(ConfigWarning { level, message });

        if self.project_id.trim().is_empty() {
            push(WarnLevel::Error, "project_id is required".to_string());
        }
        if self.default_region.trim().is_empty() {
            push(WarnLevel::Error, "default_region must not be empty".to_string());
        }
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            push(
                WarnLevel::Error,
                format!("endpoint '{}' is not an http(s) URL", self.endpoint),
            );
        } else if self.endpoint.starts_with("http://") {
            push(
                WarnLevel::Warning,
                format!("endpoint '{}' is not using TLS", self.endpoint),
            );
        }
        if self.timeout_secs == 0 {
            push(WarnLevel::Error, "timeout_secs must be positive".to_string());
        }
        match self.credentials.source {
            CredentialsSource::None if self.endpoint == DEFAULT_ENDPOINT => push(
                WarnLevel::Warning,
                "no credentials configured; the public endpoint will reject requests"
                    .to_string(),
            ),
            CredentialsSource::File if self.credentials.path.is_none() => push(
                WarnLevel::Error,
                "credentials.source is 'file' but credentials.path is unset".to_string(),
            ),
            _ => {}
        }
        warnings
    }

    pub fn has_errors(&self) -> bool {
        self.validate()
            .iter()
            .any(|w| w.level == WarnLevel::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn minimal_yaml_gets_defaults() {
        let config: ProviderConfig = serde_yaml::from_str("project_id: my-project\n").unwrap();
        assert_eq!(config.project_id, "my-project");
        assert_eq!(config.default_region, "us-central1");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.credentials.source, CredentialsSource::None);
        assert_eq!(config.credentials.env_var, "GOOGLE_OAUTH_ACCESS_TOKEN");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("provider.yaml");
        let mut config = ProviderConfig::new("p");
        config.default_region = "asia-east1".into();
        config.save(&path).unwrap();
        let loaded = ProviderConfig::load(&path).unwrap();
        assert_eq!(loaded.project_id, "p");
        assert_eq!(loaded.default_region, "asia-east1");
    }

    #[test]
    fn load_missing_file_is_invalid_config() {
        let dir = TempDir::new().unwrap();
        let err = ProviderConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidConfig(_)));
    }

    #[test]
    fn validate_flags_missing_project() {
        let config = ProviderConfig::new("");
        assert!(config.has_errors());
        assert!(config
            .validate()
            .iter()
            .any(|w| w.message.contains("project_id")));
    }

    #[test]
    fn validate_warns_on_anonymous_public_endpoint() {
        let warnings = ProviderConfig::new("p").validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
    }

    #[test]
    fn validate_rejects_file_source_without_path() {
        let mut config = ProviderConfig::new("p");
        config.credentials.source = CredentialsSource::File;
        assert!(config.has_errors());
    }

    #[test]
    fn token_from_file_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "ya29.token\n").unwrap();
        let creds = CredentialsConfig {
            source: CredentialsSource::File,
            path: Some(path),
            ..Default::default()
        };
        assert_eq!(creds.access_token().unwrap().as_deref(), Some("ya29.token"));
    }

    #[test]
    fn empty_token_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  \n").unwrap();
        let creds = CredentialsConfig {
            source: CredentialsSource::File,
            path: Some(path),
            ..Default::default()
        };
        assert!(matches!(
            creds.access_token(),
            Err(ProviderError::Credentials(_))
        ));
    }

    #[test]
    fn missing_env_token_is_an_error() {
        let creds = CredentialsConfig {
            source: CredentialsSource::Env,
            env_var: "PROVIDER_GCP_TEST_TOKEN_THAT_IS_NEVER_SET".into(),
            path: None,
        };
        assert!(creds.access_token().is_err());
    }

    #[test]
    fn no_credentials_means_no_token() {
        assert_eq!(CredentialsConfig::default().access_token().unwrap(), None);
    }
}
