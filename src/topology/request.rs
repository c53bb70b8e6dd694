// Request-side collaborator seams: topology request body, telemetry,
// request-interval handling
//
// The heartbeat treats the request body as an opaque XML document. The
// default implementations here produce a minimal, well-formed body from
// local install metadata; deployments with richer inventory plug in their
// own sources.

use crate::config::AgentConfig;
use crate::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Produces the topology request body for a heartbeat
pub trait TopologyRequestSource: Send + Sync {
    fn build(&self, config: &AgentConfig) -> Result<String>;
}

/// Optional telemetry appended to the request body. Collection failures are
/// logged by the caller and never fail the heartbeat.
pub trait TelemetrySource: Send + Sync {
    fn collect(&self) -> anyhow::Result<String>;
}

/// Applies a service-directed request interval from the heartbeat response
pub trait IntervalApplier: Send + Sync {
    fn apply(&self, response: &str) -> Result<()>;
}

/// Default request source: fills the topology envelope from the os-info
/// file (flat `KEY=value` lines, as shipped by the agent installer).
///
/// Missing or unreadable os-info degrades to an envelope without operating
/// system details; building never fails.
pub struct OsInfoRequestSource {
    os_info: PathBuf,
}

impl OsInfoRequestSource {
    pub fn new<P: Into<PathBuf>>(os_info: P) -> Self {
        Self {
            os_info: os_info.into(),
        }
    }

    fn os_fields(&self) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        if let Ok(contents) = fs::read_to_string(&self.os_info) {
            for line in contents.lines() {
                if let Some((key, value)) = line.split_once('=') {
                    let value = value.trim().trim_matches('\'').trim_matches('"');
                    if !value.is_empty() {
                        fields.insert(key.trim().to_string(), value.to_string());
                    }
                }
            }
        }
        fields
    }
}

impl TopologyRequestSource for OsInfoRequestSource {
    fn build(&self, config: &AgentConfig) -> Result<String> {
        let fields = self.os_fields();
        let hostname = nix::unistd::gethostname()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_default();

        let mut body = String::from("<?xml version=\"1.0\"?>\n<LinuxAgentTopologyRequest>");
        if let Some(guid) = config.agent_guid.as_deref() {
            push_element(&mut body, "AgentGuid", guid);
        }
        if !hostname.is_empty() {
            push_element(&mut body, "FullyQualifiedDomainName", &hostname);
        }
        if let Some(name) = fields.get("OSName") {
            push_element(&mut body, "OperatingSystemName", name);
        }
        if let Some(version) = fields.get("OSVersion") {
            push_element(&mut body, "OperatingSystemVersion", version);
        }
        if let Some(full_name) = fields.get("OSFullName") {
            push_element(&mut body, "OperatingSystemFullName", full_name);
        }
        body.push_str("</LinuxAgentTopologyRequest>");

        debug!(bytes = body.len(), "built topology request body");
        Ok(body)
    }
}

fn push_element(body: &mut String, tag: &str, value: &str) {
    body.push('<');
    body.push_str(tag);
    body.push('>');
    body.push_str(&escape_xml(value));
    body.push_str("</");
    body.push_str(tag);
    body.push('>');
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Insert `fragment` immediately before the closing root tag, keeping the
/// body a single well-formed document
pub fn append_fragment(body: &mut String, fragment: &str) {
    match body.rfind("</") {
        Some(pos) => body.insert_str(pos, fragment),
        None => body.push_str(fragment),
    }
}

/// Telemetry source that contributes nothing
pub struct NoTelemetry;

impl TelemetrySource for NoTelemetry {
    fn collect(&self) -> anyhow::Result<String> {
        Ok(String::new())
    }
}

lazy_static! {
    static ref REQUEST_INTERVAL_RE: Regex =
        Regex::new(r"<RequestInterval>\s*([^<]+?)\s*</RequestInterval>").unwrap();
}

/// Default interval applier: surfaces the service-directed interval in the
/// log. Scheduling itself is owned by the host's cron configuration.
pub struct LoggingIntervalApplier;

impl IntervalApplier for LoggingIntervalApplier {
    fn apply(&self, response: &str) -> Result<()> {
        match REQUEST_INTERVAL_RE.captures(response) {
            Some(caps) => {
                info!(interval = &caps[1], "service requested topology interval");
            }
            None => debug!("no request interval in response"),
        }
        Ok(())
    }
}
