// agentlink - Agent identity and topology maintenance for Linux monitoring agents
// Copyright (C) 2025 agentlink Team
// Licensed under GPL-3.0

//! Protocol and identity constants
//!
//! Centralized constants for the agent maintenance operations, eliminating
//! magic values throughout the codebase.

use std::time::Duration;

// =============================================================================
// Configuration file keys
// =============================================================================

/// Workspace identifier the agent is onboarded to
pub const KEY_WORKSPACE_ID: &str = "WORKSPACE_ID";

/// Unique identifier of this agent installation
pub const KEY_AGENT_GUID: &str = "AGENT_GUID";

/// Top-level domain of the management service (e.g. `opinsights.azure.com`)
pub const KEY_URL_TLD: &str = "URL_TLD";

/// Syslog facility used by the agent's own logging
pub const KEY_LOG_FACILITY: &str = "LOG_FACILITY";

/// Service-directed certificate renewal endpoint
pub const KEY_CERTIFICATE_UPDATE_ENDPOINT: &str = "CERTIFICATE_UPDATE_ENDPOINT";

/// Service-directed DSC configuration endpoint
pub const KEY_DSC_ENDPOINT: &str = "DSC_ENDPOINT";

// =============================================================================
// Identity certificate parameters
// =============================================================================

/// RSA modulus size for the agent identity key
pub const RSA_KEY_BITS: u32 = 2048;

/// Identity certificate validity window in days
pub const CERT_VALIDITY_DAYS: u32 = 365;

/// Upper bound (inclusive) for the random certificate serial number
pub const CERT_SERIAL_MAX: u32 = u16::MAX as u32;

/// Organizational unit attribute of the identity certificate subject
pub const CERT_SUBJECT_OU: &str = "Linux Monitoring Agent";

/// Organization attribute of the identity certificate subject
pub const CERT_SUBJECT_O: &str = "Microsoft";

// =============================================================================
// Wire protocol
// =============================================================================

/// Path of the topology heartbeat endpoint, relative to the workspace host
pub const TOPOLOGY_REQUEST_PATH: &str = "/AgentService.svc/LinuxAgentTopologyRequest";

/// Product token of the derived User-Agent header
pub const USER_AGENT_PRODUCT: &str = "LinuxMonitoringAgent";

/// Fixed locale advertised on every service request
pub const ACCEPT_LANGUAGE: &str = "en-US";

/// Content type of topology and renewal request bodies
pub const CONTENT_TYPE_XML: &str = "application/xml";

/// XML namespace of the certificate renewal envelope
pub const RENEWAL_XMLNS: &str =
    "http://schemas.microsoft.com/WorkloadMonitoring/HealthServiceProtocol/2014/09/";

/// Explicit timeout applied to every service request. The transport default
/// is unbounded, which stalls cron-driven invocations indefinitely on a hung
/// connection.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

// =============================================================================
// Service account
// =============================================================================

/// Default system account owning agent certificate material
pub const DEFAULT_SERVICE_ACCOUNT: &str = "omsagent";

/// Default system group owning agent certificate material
pub const DEFAULT_SERVICE_GROUP: &str = "omiusers";

// =============================================================================
// Environment
// =============================================================================

/// Environment variables whose presence marks a test-mode invocation,
/// bypassing the privileged-user requirement
pub const TEST_MODE_ENV_VARS: [&str; 2] = ["TEST_WORKSPACE_ID", "TEST_SHARED_KEY"];
