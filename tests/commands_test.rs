// Copyright (C) 2025 agentlink Team
// Licensed under GPL-3.0. See LICENSE file for details.

//! Commands Module Integration Tests
//!
//! Validates the command-pattern dispatch for agentlink's maintenance
//! actions: command creation and naming, router logic, and argument
//! validation. All tests use real Args structures and actual command
//! implementations.

use agentlink::commands::{
    Command, CommandRouter, EndpointsCommand, GenerateCertsCommand, HeartbeatCommand,
    RenewCertsCommand,
};
use agentlink::error::MaintenanceError;
use agentlink::Args;

#[test]
fn test_heartbeat_command_creation_and_name() {
    let mut args = Args::default();
    args.action.heartbeat = true;
    let cmd = HeartbeatCommand::new(args);
    assert_eq!(cmd.name(), "HeartbeatCommand");
}

#[test]
fn test_generate_certs_command_creation_and_name() {
    let mut args = Args::default();
    args.action.generate_certs = true;
    let cmd = GenerateCertsCommand::new(args);
    assert_eq!(cmd.name(), "GenerateCertsCommand");
}

#[test]
fn test_renew_certs_command_creation_and_name() {
    let mut args = Args::default();
    args.action.renew_certs = true;
    let cmd = RenewCertsCommand::new(args);
    assert_eq!(cmd.name(), "RenewCertsCommand");
}

#[test]
fn test_endpoints_command_creation_and_name() {
    let mut args = Args::default();
    args.action.endpoints = Some("/tmp/in.xml,/tmp/out.txt".to_string());
    let cmd = EndpointsCommand::new(args);
    assert_eq!(cmd.name(), "EndpointsCommand");
}

#[test]
fn test_router_requires_an_action() {
    let err = CommandRouter::route(Args::default()).unwrap_err();
    assert!(matches!(
        err,
        MaintenanceError::InvalidOptionProvided { .. }
    ));
}

#[test]
fn test_router_rejects_combined_actions() {
    let mut args = Args::default();
    args.action.heartbeat = true;
    args.action.generate_certs = true;
    let err = CommandRouter::route(args).unwrap_err();
    assert_eq!(err.exit_code(), 10);
}

#[tokio::test]
async fn test_heartbeat_command_fails_without_config_file() {
    let mut args = Args::default();
    args.action.heartbeat = true;
    args.config = "/nonexistent/omsadmin.conf".into();

    let cmd = CommandRouter::route(args).unwrap();
    let err = cmd.execute().await.unwrap_err();
    assert!(matches!(err, MaintenanceError::MissingConfigFile { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_generate_certs_command_requires_identity_args() {
    let mut args = Args::default();
    args.action.generate_certs = true;

    let cmd = CommandRouter::route(args).unwrap();
    let err = cmd.execute().await.unwrap_err();
    assert!(matches!(err, MaintenanceError::MissingConfig { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_endpoints_command_rejects_malformed_pair() {
    let mut args = Args::default();
    args.action.endpoints = Some("only-one-path".to_string());

    let cmd = CommandRouter::route(args).unwrap();
    let err = cmd.execute().await.unwrap_err();
    assert!(matches!(
        err,
        MaintenanceError::InvalidOptionProvided { .. }
    ));
}
