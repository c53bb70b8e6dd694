// Agent configuration store - flat KEY=value file holding workspace identity
// and service-directed endpoints

use crate::constants::{
    KEY_AGENT_GUID, KEY_CERTIFICATE_UPDATE_ENDPOINT, KEY_DSC_ENDPOINT, KEY_LOG_FACILITY,
    KEY_URL_TLD, KEY_WORKSPACE_ID,
};
use crate::error::MaintenanceError;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Immutable snapshot of the agent configuration file.
///
/// `ConfigStore::load` returns a fresh snapshot; callers pass it explicitly
/// to subsequent operations instead of holding mutable shared state, so a
/// multi-step flow (renewal, heartbeat) always knows which configuration it
/// is acting on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentConfig {
    pub workspace_id: Option<String>,
    pub agent_guid: Option<String>,
    pub url_tld: Option<String>,
    pub log_facility: Option<String>,
    pub certificate_update_endpoint: Option<String>,
    pub dsc_endpoint: Option<String>,
}

impl AgentConfig {
    /// Workspace id and agent guid, or `MissingConfig` when either is unset
    /// or empty
    pub fn require_identity(&self) -> Result<(&str, &str)> {
        let workspace_id = require_field(&self.workspace_id, KEY_WORKSPACE_ID)?;
        let agent_guid = require_field(&self.agent_guid, KEY_AGENT_GUID)?;
        Ok((workspace_id, agent_guid))
    }

    /// Service top-level domain, or `MissingConfig` when unset or empty
    pub fn require_url_tld(&self) -> Result<&str> {
        require_field(&self.url_tld, KEY_URL_TLD)
    }

    /// Certificate renewal endpoint, or `MissingConfig` when unset or empty
    pub fn require_certificate_update_endpoint(&self) -> Result<&str> {
        require_field(
            &self.certificate_update_endpoint,
            KEY_CERTIFICATE_UPDATE_ENDPOINT,
        )
    }
}

fn require_field<'a>(field: &'a Option<String>, key: &str) -> Result<&'a str> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(MaintenanceError::MissingConfig {
            detail: key.to_string(),
        }),
    }
}

/// Reads and rewrites the flat `KEY=value` agent configuration file.
///
/// The store owns all access to the file; configuration changes go through
/// `update`, which rewrites the file in place and leaves unrelated lines
/// byte-identical.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load a configuration snapshot from the file.
    ///
    /// Each non-empty occurrence of a recognized `KEY=` prefix overwrites the
    /// prior value, so the last matching line wins when a key is duplicated.
    /// Absent keys remain unset; validation of required fields is left to the
    /// caller.
    pub fn load(&self) -> Result<AgentConfig> {
        if !self.path.exists() {
            return Err(MaintenanceError::MissingConfigFile {
                path: self.path.clone(),
            });
        }

        let contents = fs::read_to_string(&self.path).map_err(|_| {
            MaintenanceError::MissingConfigFile {
                path: self.path.clone(),
            }
        })?;

        let mut config = AgentConfig::default();
        for line in contents.lines() {
            assign_if_present(line, KEY_WORKSPACE_ID, &mut config.workspace_id);
            assign_if_present(line, KEY_AGENT_GUID, &mut config.agent_guid);
            assign_if_present(line, KEY_URL_TLD, &mut config.url_tld);
            assign_if_present(line, KEY_LOG_FACILITY, &mut config.log_facility);
            assign_if_present(
                line,
                KEY_CERTIFICATE_UPDATE_ENDPOINT,
                &mut config.certificate_update_endpoint,
            );
            assign_if_present(line, KEY_DSC_ENDPOINT, &mut config.dsc_endpoint);
        }

        debug!(path = %self.path.display(), "loaded agent configuration");
        Ok(config)
    }

    /// Replace the first `key=...` line with `key=value` and rewrite the file.
    ///
    /// Known quirk: the file is rewritten even when no line matched, leaving
    /// the content unchanged; callers must not rely on an unmatched update
    /// being a true no-op on the filesystem.
    pub fn update(&self, key: &str, value: &str) -> Result<()> {
        if !self.path.exists() {
            return Err(MaintenanceError::MissingConfigFile {
                path: self.path.clone(),
            });
        }

        let contents = fs::read_to_string(&self.path).map_err(|_| {
            MaintenanceError::MissingConfigFile {
                path: self.path.clone(),
            }
        })?;

        let prefix = format!("{key}=");
        let mut replaced = false;
        let mut lines: Vec<String> = Vec::new();
        for line in contents.lines() {
            if !replaced && line.starts_with(&prefix) {
                lines.push(format!("{key}={value}"));
                replaced = true;
            } else {
                lines.push(line.to_string());
            }
        }

        let mut rewritten = lines.join("\n");
        if contents.ends_with('\n') {
            rewritten.push('\n');
        }

        fs::write(&self.path, rewritten).map_err(|e| MaintenanceError::ErrorWritingToFile {
            path: self.path.clone(),
            detail: e.to_string(),
        })?;

        debug!(key, replaced, "updated agent configuration");
        Ok(())
    }
}

fn assign_if_present(line: &str, key: &str, field: &mut Option<String>) {
    if let Some(rest) = line.strip_prefix(key) {
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim_end();
            if !value.is_empty() {
                *field = Some(value.to_string());
            }
        }
    }
}
