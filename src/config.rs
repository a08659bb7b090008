//! Configuration structures and loading logic

use crate::reconciler::RetryPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a provisioning run
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InitConfig {
    /// Base URL of the Ollama daemon
    pub host: String,

    /// Models that must be available, pulled in this order
    pub required_models: Vec<String>,

    /// Readiness probe attempts before giving up
    pub max_attempts: u32,

    /// Delay between failed readiness probes
    pub retry_delay_secs: u64,

    /// Interpreter used for package importability probes
    pub python: String,

    /// Python modules the workshop expects to be importable
    pub required_packages: Vec<String>,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            required_models: default_required_models(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay(),
            python: default_python(),
            required_packages: default_required_packages(),
        }
    }
}

impl InitConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            config.host = host;
        }
        if let Ok(attempts) = std::env::var("OLLAMA_INIT_MAX_ATTEMPTS") {
            config.max_attempts = attempts
                .parse()
                .context("Invalid OLLAMA_INIT_MAX_ATTEMPTS value")?;
        }
        if let Ok(delay) = std::env::var("OLLAMA_INIT_RETRY_DELAY") {
            config.retry_delay_secs = delay
                .parse()
                .context("Invalid OLLAMA_INIT_RETRY_DELAY value")?;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.host.starts_with("http://") && !self.host.starts_with("https://") {
            anyhow::bail!("Host must be an http(s) URL (got '{}')", self.host);
        }

        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be >= 1");
        }

        let mut seen = HashSet::new();
        for model in &self.required_models {
            if model.is_empty() {
                anyhow::bail!("Required model name cannot be empty");
            }
            if !seen.insert(model) {
                anyhow::bail!("Duplicate required model: {}", model);
            }
        }

        if self.python.is_empty() {
            anyhow::bail!("Python interpreter cannot be empty");
        }

        Ok(())
    }

    /// Readiness retry policy derived from this config
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_secs(self.retry_delay_secs),
        }
    }
}

// Default functions
fn default_host() -> String {
    "http://localhost:11434".to_string()
}
fn default_required_models() -> Vec<String> {
    vec![
        "gemma2:2b".to_string(),
        "gemma2:2b-instruct-fp16".to_string(),
        "gemma2:2b-instruct-q2_K".to_string(),
    ]
}
fn default_max_attempts() -> u32 {
    30
}
fn default_retry_delay() -> u64 {
    2
}
fn default_python() -> String {
    "python3".to_string()
}
fn default_required_packages() -> Vec<String> {
    vec![
        "numpy".to_string(),
        "ollama".to_string(),
        "gradio".to_string(),
        "jupyter_core".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            std::env::remove_var("OLLAMA_HOST");
            std::env::remove_var("OLLAMA_INIT_MAX_ATTEMPTS");
            std::env::remove_var("OLLAMA_INIT_RETRY_DELAY");
        }
    }

    #[test]
    #[serial]
    fn test_default_config() {
        clear_env();
        let config = InitConfig::load(None).unwrap();
        assert_eq!(config.host, "http://localhost:11434");
        assert_eq!(config.max_attempts, 30);
        assert_eq!(config.retry_delay_secs, 2);
        assert_eq!(config.required_models.len(), 3);
        assert_eq!(config.required_models[0], "gemma2:2b");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("OLLAMA_HOST", "http://ollama:11434");
            std::env::set_var("OLLAMA_INIT_MAX_ATTEMPTS", "5");
            std::env::set_var("OLLAMA_INIT_RETRY_DELAY", "1");
        }

        let config = InitConfig::load(None).unwrap();
        assert_eq!(config.host, "http://ollama:11434");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.retry_delay_secs, 1);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_override_rejected() {
        clear_env();
        unsafe {
            std::env::set_var("OLLAMA_INIT_MAX_ATTEMPTS", "not-a-number");
        }
        assert!(InitConfig::load(None).is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("init.toml");
        std::fs::write(
            &path,
            r#"
host = "http://127.0.0.1:11434"
required_models = ["llama3.2:1b"]
max_attempts = 10
"#,
        )
        .unwrap();

        let config = InitConfig::load(Some(path)).unwrap();
        assert_eq!(config.host, "http://127.0.0.1:11434");
        assert_eq!(config.required_models, vec!["llama3.2:1b"]);
        assert_eq!(config.max_attempts, 10);
        // Unspecified fields keep their defaults
        assert_eq!(config.retry_delay_secs, 2);
        assert_eq!(config.python, "python3");
    }

    #[test]
    fn test_host_validation() {
        let config = InitConfig {
            host: "localhost:11434".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = InitConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_model_detection() {
        let config = InitConfig {
            required_models: vec!["gemma2:2b".to_string(), "gemma2:2b".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_model_name_rejected() {
        let config = InitConfig {
            required_models: vec![String::new()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_policy_conversion() {
        let config = InitConfig {
            max_attempts: 7,
            retry_delay_secs: 3,
            ..Default::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 7);
        assert_eq!(policy.delay, Duration::from_secs(3));
    }
}
