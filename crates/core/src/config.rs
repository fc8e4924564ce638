use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Top-level application configuration.
///
/// Each component receives its own section at construction; there are no
/// process-wide mutable singletons.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub orchestrator: OrchestratorConfig,
    pub registry: RegistryConfig,
    pub dispatch: DispatchConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrchestratorConfig {
    /// Operational mode name (`no_llm`, `assisted`, `agent`, `hybrid`).
    pub mode: String,
    /// Reasoning strategy selected at startup.
    pub default_strategy: String,
    /// Per-registry search timeout.
    pub search_timeout_ms: u64,
    /// Per-task invocation timeout.
    pub invoke_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    /// When set, a failed probe recorded via `record_test` deactivates the
    /// resource.
    pub enable_testing: bool,
    /// Minimum capability-string similarity for a fuzzy tag match (0..=1).
    pub similarity_threshold: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    /// Default invocation timeout applied when the caller does not supply one.
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelemetryConfig {
    /// Emit JSON-formatted log lines.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("TASKMESH_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__ORCHESTRATOR__MODE=agent to app.orchestrator.mode
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorConfig {
                mode: "agent".into(),
                default_strategy: "react".into(),
                search_timeout_ms: 5000,
                invoke_timeout_ms: 10000,
            },
            registry: RegistryConfig {
                enable_testing: true,
                similarity_threshold: 0.6,
            },
            dispatch: DispatchConfig {
                request_timeout_ms: 10000,
            },
            telemetry: TelemetryConfig { json_logs: false },
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        AppConfig::default().orchestrator
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        AppConfig::default().registry
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        AppConfig::default().dispatch
    }
}
