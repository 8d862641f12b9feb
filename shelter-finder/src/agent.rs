//! Optional assistant agent descriptor.
//!
//! The server can advertise an LLM-backed routing assistant. Whether one is
//! available is decided once at startup from configuration and passed around
//! as an [`AgentSlot`]; ranking never depends on it.

use serde::Serialize;
use tracing::info;

/// Agent name advertised to clients.
pub const AGENT_NAME: &str = "eta_route_agent";

/// Agent description advertised to clients.
pub const AGENT_DESCRIPTION: &str = "An agent that provides ETA and route info.";

/// Default model identifier.
const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

/// Agent settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Model identifier
    pub model: String,
    /// Credential for the model provider; no agent without one
    pub api_key: Option<String>,
}

impl AgentConfig {
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentHandle {
    pub name: String,
    pub description: String,
    pub model: String,
}

/// Whether an agent is available to this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentSlot {
    Unavailable,
    Ready(AgentHandle),
}

impl AgentSlot {
    /// Build the slot from configuration.
    ///
    /// A missing or blank credential or model leaves the slot unavailable.
    pub fn from_config(config: &AgentConfig) -> Self {
        let has_key = config.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
        if !has_key || config.model.trim().is_empty() {
            info!("assistant agent unavailable");
            return AgentSlot::Unavailable;
        }

        info!(model = %config.model, "assistant agent ready");
        AgentSlot::Ready(AgentHandle {
            name: AGENT_NAME.to_string(),
            description: AGENT_DESCRIPTION.to_string(),
            model: config.model.clone(),
        })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AgentSlot::Ready(_))
    }

    pub fn handle(&self) -> Option<&AgentHandle> {
        match self {
            AgentSlot::Ready(handle) => Some(handle),
            AgentSlot::Unavailable => None,
        }
    }

    /// Short status string for health checks.
    pub fn status(&self) -> &'static str {
        match self {
            AgentSlot::Ready(_) => "ready",
            AgentSlot::Unavailable => "unavailable",
        }
    }
}
