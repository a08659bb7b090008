//! Fatal error kinds for a provisioning run

use thiserror::Error;

/// The two conditions that abort a provisioning run.
///
/// Everything else (model already present, package not importable) is
/// informational and never surfaces as an error.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Ollama service unreachable after {attempts} attempts")]
    ServiceUnreachable { attempts: u32 },

    #[error("Failed to pull model '{model}': {reason}")]
    PullFailed { model: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InitError::ServiceUnreachable { attempts: 30 };
        assert_eq!(
            err.to_string(),
            "Ollama service unreachable after 30 attempts"
        );

        let err = InitError::PullFailed {
            model: "gemma2:2b".to_string(),
            reason: "connection reset".to_string(),
        };
        assert!(err.to_string().contains("gemma2:2b"));
        assert!(err.to_string().contains("connection reset"));
    }
}
