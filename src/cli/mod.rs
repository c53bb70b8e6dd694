// CLI module - command line interface and argument parsing
// Copyright (C) 2025 agentlink Team
// Licensed under GPL-3.0

use clap::Parser;
use std::path::PathBuf;

/// agentlink - agent identity and topology maintenance
///
/// One maintenance action per invocation, selected by flag. The seven
/// positional arguments name the agent's on-disk collateral and are shared
/// by every action.
///
/// The conventional `-h` short flag belongs to `--heartbeat` here; `--help`
/// remains available.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "agentlink")]
#[command(about = "Agent identity and topology maintenance for Linux monitoring agents")]
#[command(disable_help_flag = true)]
pub struct Args {
    /// Agent configuration file (flat KEY=value)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Agent identity certificate
    #[arg(value_name = "CERT")]
    pub cert: PathBuf,

    /// Agent identity private key
    #[arg(value_name = "KEY")]
    pub key: PathBuf,

    /// Pid file recording this invocation
    #[arg(value_name = "PID")]
    pub pid: PathBuf,

    /// Proxy configuration file (absent or empty for direct connections)
    #[arg(value_name = "PROXY")]
    pub proxy: PathBuf,

    /// Operating system info file (flat KEY=value)
    #[arg(value_name = "OS_INFO")]
    pub os_info: PathBuf,

    /// Install info file; first token is the agent version
    #[arg(value_name = "INSTALL_INFO")]
    pub install_info: PathBuf,

    #[command(flatten)]
    pub action: ActionArgs,

    #[command(flatten)]
    pub identity: IdentityArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Print help
    #[arg(long = "help", action = clap::ArgAction::Help)]
    pub help: Option<bool>,
}

/// Maintenance action selection (exactly one per invocation)
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ActionArgs {
    /// Run the topology heartbeat
    #[arg(short = 'h', long = "heartbeat")]
    pub heartbeat: bool,

    /// Generate the agent identity certificate and key
    #[arg(short = 'c', long = "generate-certs")]
    pub generate_certs: bool,

    /// Renew the agent identity against the service
    #[arg(short = 'r', long = "renew-certs")]
    pub renew_certs: bool,

    /// Apply endpoints from a pre-fetched XML document (format: XML,OUT)
    #[arg(long = "endpoints", value_name = "XML,OUT")]
    pub endpoints: Option<String>,
}

/// Workspace identity for certificate generation
#[derive(clap::Args, Debug, Clone, Default)]
pub struct IdentityArgs {
    /// Workspace id the agent is onboarded to
    #[arg(short = 'w', long = "workspace-id", value_name = "WORKSPACE_ID")]
    pub workspace_id: Option<String>,

    /// Unique id of this agent installation
    #[arg(short = 'a', long = "agent-guid", value_name = "AGENT_GUID")]
    pub agent_guid: Option<String>,
}

/// Output verbosity
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Suppress all but error output
    #[arg(short = 's', long = "suppress-verbose")]
    pub suppress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITIONALS: [&str; 8] = [
        "agentlink",
        "/etc/agent/omsadmin.conf",
        "/etc/agent/certs/oms.crt",
        "/etc/agent/certs/oms.key",
        "/var/run/agent.pid",
        "/etc/agent/proxy.conf",
        "/etc/agent/scx-release",
        "/etc/agent/installinfo.txt",
    ];

    fn parse(extra: &[&str]) -> Args {
        let argv: Vec<&str> = POSITIONALS.iter().copied().chain(extra.iter().copied()).collect();
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_heartbeat_short_flag() {
        let args = parse(&["-h"]);
        assert!(args.action.heartbeat);
        assert!(!args.action.generate_certs);
    }

    #[test]
    fn test_generate_certs_with_identity() {
        let args = parse(&["-c", "-w", "ws-1", "-a", "guid-1"]);
        assert!(args.action.generate_certs);
        assert_eq!(args.identity.workspace_id.as_deref(), Some("ws-1"));
        assert_eq!(args.identity.agent_guid.as_deref(), Some("guid-1"));
    }

    #[test]
    fn test_renew_certs_flag() {
        let args = parse(&["--renew-certs"]);
        assert!(args.action.renew_certs);
    }

    #[test]
    fn test_endpoints_pair() {
        let args = parse(&["--endpoints", "/tmp/in.xml,/tmp/out.txt"]);
        assert_eq!(
            args.action.endpoints.as_deref(),
            Some("/tmp/in.xml,/tmp/out.txt")
        );
    }

    #[test]
    fn test_positionals_are_required() {
        assert!(Args::try_parse_from(["agentlink", "-h"]).is_err());
    }

    #[test]
    fn test_verbosity_flags() {
        let args = parse(&["-h", "-v"]);
        assert!(args.output.verbose);
        let args = parse(&["-h", "-s"]);
        assert!(args.output.suppress);
    }
}
