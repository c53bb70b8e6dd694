// Error types for agentlink
//
// This module provides the fixed error taxonomy for all maintenance
// operations. Every public operation returns one of these variants; no
// transport, parse, or filesystem fault crosses a public boundary uncaught.
// Each variant maps to a stable process exit code, which is the authoritative
// machine-readable result of an invocation.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for agentlink operations
#[derive(Debug, Error)]
pub enum MaintenanceError {
    /// The agent configuration file does not exist
    #[error("configuration file not found: {path}")]
    MissingConfigFile { path: PathBuf },

    /// A required configuration field is absent or empty
    #[error("required configuration missing: {detail}")]
    MissingConfig { detail: String },

    /// The agent certificate or private key is absent or empty
    #[error("agent certificate or key unavailable: {detail}")]
    MissingCerts { detail: String },

    /// The server response carried no certificate update endpoint
    #[error("no certificate update endpoint in server response")]
    MissingCertUpdateEndpoint,

    /// A server response field could not be extracted
    #[error("failed to extract attributes: {detail}")]
    ErrorExtractingAttributes { detail: String },

    /// Certificate or key generation failed
    #[error("failed to generate agent certificates: {detail}")]
    ErrorGeneratingCerts { detail: String },

    /// The HTTP request could not be sent or completed
    #[error("failed to send HTTP request: {detail}")]
    ErrorSendingHttp { detail: String },

    /// The service answered with a non-200 status
    #[error("service returned HTTP {status}")]
    HttpNon200 { status: u16 },

    /// A local file could not be written
    #[error("failed to write {path}: {detail}")]
    ErrorWritingToFile { path: PathBuf, detail: String },

    /// Invalid command line options
    #[error("invalid option: {detail}")]
    InvalidOptionProvided { detail: String },

    /// The process is not running as the required privileged user
    #[error("this operation must run as a privileged user")]
    NonPrivilegedUser,
}

impl MaintenanceError {
    /// Stable process exit code for this error kind
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingConfigFile { .. } => 1,
            Self::MissingConfig { .. } => 2,
            Self::MissingCerts { .. } => 3,
            Self::MissingCertUpdateEndpoint => 4,
            Self::ErrorExtractingAttributes { .. } => 5,
            Self::ErrorGeneratingCerts { .. } => 6,
            Self::ErrorSendingHttp { .. } => 7,
            Self::HttpNon200 { .. } => 8,
            Self::ErrorWritingToFile { .. } => 9,
            Self::InvalidOptionProvided { .. } => 10,
            Self::NonPrivilegedUser => 11,
        }
    }
}

impl From<openssl::error::ErrorStack> for MaintenanceError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        MaintenanceError::ErrorGeneratingCerts {
            detail: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for MaintenanceError {
    fn from(err: reqwest::Error) -> Self {
        MaintenanceError::ErrorSendingHttp {
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            MaintenanceError::MissingConfigFile {
                path: PathBuf::from("/etc/agent.conf"),
            },
            MaintenanceError::MissingConfig {
                detail: "WORKSPACE_ID".to_string(),
            },
            MaintenanceError::MissingCerts {
                detail: "oms.crt".to_string(),
            },
            MaintenanceError::MissingCertUpdateEndpoint,
            MaintenanceError::ErrorExtractingAttributes {
                detail: "DscConfiguration".to_string(),
            },
            MaintenanceError::ErrorGeneratingCerts {
                detail: "rsa".to_string(),
            },
            MaintenanceError::ErrorSendingHttp {
                detail: "refused".to_string(),
            },
            MaintenanceError::HttpNon200 { status: 500 },
            MaintenanceError::ErrorWritingToFile {
                path: PathBuf::from("/tmp/out"),
                detail: "denied".to_string(),
            },
            MaintenanceError::InvalidOptionProvided {
                detail: "no action".to_string(),
            },
            MaintenanceError::NonPrivilegedUser,
        ];

        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|&c| c > 0));
    }

    #[test]
    fn test_missing_config_file_message() {
        let err = MaintenanceError::MissingConfigFile {
            path: PathBuf::from("/etc/omsagent/conf/omsadmin.conf"),
        };
        let msg = err.to_string();
        assert!(msg.contains("configuration file not found"));
        assert!(msg.contains("omsadmin.conf"));
    }

    #[test]
    fn test_http_non_200_message() {
        let err = MaintenanceError::HttpNon200 { status: 403 };
        assert!(err.to_string().contains("403"));
        assert_eq!(err.exit_code(), 8);
    }
}
