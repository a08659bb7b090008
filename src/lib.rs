//! ollama-init - Workshop environment provisioning for Ollama
//!
//! A small CLI that waits for a local Ollama daemon to become reachable,
//! pulls whichever required models are missing, and reports whether the
//! workshop's package environment is complete.

pub mod client;
pub mod config;
pub mod error;
pub mod reconciler;
pub mod report;
pub mod verify;

pub use client::{InstalledModel, ModelService, OllamaClient};
pub use config::InitConfig;
pub use error::InitError;
pub use reconciler::{ModelReport, ModelStatus, Reconciler, RetryPolicy, RunOutcome};
pub use verify::{ModelPresence, PackageStatus};
