//! Environment verification
//!
//! Read-only checks behind the `verify` subcommand: probe the workshop's
//! Python packages for importability and report which required models the
//! daemon already has. Never pulls anything and never fails the process.

use crate::client::ModelService;
use tokio::process::Command;

/// Importability/version status of one Python package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageStatus {
    pub name: String,
    /// Version string, `"installed"` for packages without `__version__`,
    /// `None` when the import failed
    pub version: Option<String>,
}

impl PackageStatus {
    pub fn found(&self) -> bool {
        self.version.is_some()
    }
}

/// Presence of one required model on the daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPresence {
    pub model: String,
    pub installed: bool,
}

/// Probe one Python module by spawning the interpreter
///
/// Prints `__version__` when the module exposes one, otherwise a bare
/// "installed" marker. Any spawn or import failure maps to not-found.
pub async fn probe_package(python: &str, module: &str) -> PackageStatus {
    let script = format!(
        "import {m}; print(getattr({m}, '__version__', 'installed'))",
        m = module
    );

    let output = Command::new(python).arg("-c").arg(&script).output().await;

    let version = match output {
        Ok(out) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            let version = stdout.trim();
            if version.is_empty() {
                None
            } else {
                Some(version.to_string())
            }
        }
        Ok(out) => {
            tracing::debug!(
                module = %module,
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "Package import failed"
            );
            None
        }
        Err(e) => {
            tracing::debug!(module = %module, error = %e, "Failed to spawn interpreter");
            None
        }
    };

    PackageStatus {
        name: module.to_string(),
        version,
    }
}

/// Probe every required package in sequence
pub async fn check_packages(python: &str, packages: &[String]) -> Vec<PackageStatus> {
    let mut statuses = Vec::with_capacity(packages.len());
    for package in packages {
        statuses.push(probe_package(python, package).await);
    }
    statuses
}

/// Check which required models the daemon reports as installed
///
/// A failed list call marks every model as missing rather than erroring:
/// this path is informational only.
pub async fn check_models<S: ModelService>(service: &S, required: &[String]) -> Vec<ModelPresence> {
    let installed: Vec<String> = match service.list().await {
        Ok(models) => models.into_iter().map(|m| m.name).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not check installed models");
            Vec::new()
        }
    };

    required
        .iter()
        .map(|model| ModelPresence {
            model: model.clone(),
            installed: installed.iter().any(|name| name == model),
        })
        .collect()
}
