// System glue - privilege detection, file ownership, install metadata

use crate::constants::{DEFAULT_SERVICE_ACCOUNT, DEFAULT_SERVICE_GROUP, TEST_MODE_ENV_VARS};
use nix::unistd::{chown, geteuid, Group, User};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// System account and group that own agent certificate material.
///
/// Passed explicitly to the components that apply ownership, so tests can
/// substitute an identity instead of relying on compiled-in literals.
#[derive(Debug, Clone)]
pub struct ServiceIdentity {
    pub account: String,
    pub group: String,
}

impl Default for ServiceIdentity {
    fn default() -> Self {
        Self {
            account: DEFAULT_SERVICE_ACCOUNT.to_string(),
            group: DEFAULT_SERVICE_GROUP.to_string(),
        }
    }
}

/// Whether the process runs with elevated privilege
pub fn is_privileged() -> bool {
    geteuid().is_root()
}

/// Whether a test-mode invocation bypasses the privileged-user requirement
pub fn test_mode() -> bool {
    TEST_MODE_ENV_VARS
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Apply service account ownership to `path`.
///
/// Skipped with a debug log when the process is unprivileged; chown would
/// fail anyway and unprivileged invocations are the test-mode path.
pub fn apply_ownership(path: &Path, identity: &ServiceIdentity) -> io::Result<()> {
    if !is_privileged() {
        debug!(path = %path.display(), "not privileged, skipping ownership change");
        return Ok(());
    }

    let user = User::from_name(&identity.account)
        .map_err(io::Error::from)?
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such user: {}", identity.account),
            )
        })?;
    let group = Group::from_name(&identity.group)
        .map_err(io::Error::from)?
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such group: {}", identity.group),
            )
        })?;

    chown(path, Some(user.uid), Some(group.gid)).map_err(io::Error::from)?;
    debug!(
        path = %path.display(),
        account = %identity.account,
        group = %identity.group,
        "applied ownership"
    );
    Ok(())
}

/// Agent version: the first whitespace-delimited token of the install-info
/// file, or `None` when the file is absent or empty.
pub fn agent_version(install_info: &Path) -> Option<String> {
    let contents = fs::read_to_string(install_info).ok()?;
    contents
        .split_whitespace()
        .next()
        .map(|token| token.to_string())
}

/// Record this process id in the pid file. Best-effort: a failure is logged
/// and never fails the maintenance operation itself.
pub fn write_pid_file(path: &Path) {
    if let Err(e) = fs::write(path, format!("{}\n", std::process::id())) {
        warn!(path = %path.display(), error = %e, "could not write pid file");
    }
}
