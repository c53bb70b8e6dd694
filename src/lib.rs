// agentlink - Agent identity and topology maintenance for Linux monitoring agents
// Copyright (C) 2025 agentlink Team
// Licensed under GPL-3.0

//! agentlink maintains the trust relationship between a Linux monitoring
//! agent and its remote management service: it issues and renews the agent's
//! self-signed identity certificate, performs the authenticated topology
//! heartbeat over mutual TLS, and folds service-directed endpoint
//! configuration back into the local agent configuration file.

pub mod certificates;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod system;
pub mod topology;
pub mod transport;

// Re-export commonly used types
pub use crate::cli::Args;
pub use crate::config::{AgentConfig, ConfigStore};
pub use crate::error::MaintenanceError;
pub use crate::topology::TopologyClient;

/// Result type for agentlink operations
pub type Result<T> = std::result::Result<T, MaintenanceError>;
