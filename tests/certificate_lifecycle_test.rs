// Copyright (C) 2025 agentlink Team
// Licensed under GPL-3.0. See LICENSE file for details.

//! Certificate Lifecycle Integration Tests
//!
//! Exercises the identity pair end to end through the public API:
//! generation invariants, the renewal rollback guarantee under transport
//! failure, and the endpoints-from-file onboarding flow.

use agentlink::certificates::{CertificateManager, NoConfirmation};
use agentlink::config::ConfigStore;
use agentlink::error::MaintenanceError;
use agentlink::system::ServiceIdentity;
use agentlink::topology::{EndpointExtractor, RenewalTrigger};
use agentlink::transport::MtlsTransport;
use std::fs;
use std::io::Write;
use tempfile::TempDir;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

fn manager_in(dir: &TempDir) -> CertificateManager {
    CertificateManager::new(
        dir.path().join("oms.crt"),
        dir.path().join("oms.key"),
        ServiceIdentity::default(),
    )
}

fn write_config(dir: &TempDir, contents: &str) -> ConfigStore {
    let conf = dir.path().join("omsadmin.conf");
    let mut file = fs::File::create(&conf).unwrap();
    write!(file, "{}", contents).unwrap();
    ConfigStore::new(conf)
}

#[test]
fn test_generated_certificate_carries_both_common_names() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);
    manager
        .generate("ws-e3b0c442", "9f86d081-8841-4c97-9afa-000000000001")
        .unwrap();

    let pem_bytes = fs::read(manager.cert_path()).unwrap();
    let (_, pem) = parse_x509_pem(&pem_bytes).unwrap();
    let cert = pem.parse_x509().unwrap();

    let cns: Vec<&str> = cert
        .subject()
        .iter_common_name()
        .filter_map(|cn| cn.as_str().ok())
        .collect();
    assert_eq!(
        cns,
        vec!["ws-e3b0c442", "9f86d081-8841-4c97-9afa-000000000001"]
    );

    let validity = cert.validity();
    let lifetime = validity.not_after.timestamp() - validity.not_before.timestamp();
    assert_eq!(lifetime, 365 * 24 * 60 * 60);

    assert!(cert.is_ca());
}

#[tokio::test]
async fn test_renewal_rolls_back_and_surfaces_transport_error() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);
    manager.generate("ws", "guid").unwrap();

    let store = write_config(
        &dir,
        "WORKSPACE_ID=ws\nAGENT_GUID=guid\nURL_TLD=example.com\n\
         CERTIFICATE_UPDATE_ENDPOINT=https://127.0.0.1:1/RenewCertificate\n",
    );

    let cert_before = fs::read(manager.cert_path()).unwrap();
    let key_before = fs::read(manager.key_path()).unwrap();

    let transport = MtlsTransport::new(None);
    let err = manager
        .renew(&store, &transport, &NoConfirmation)
        .await
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::ErrorSendingHttp { .. }));
    assert_eq!(err.exit_code(), 7);

    assert_eq!(fs::read(manager.cert_path()).unwrap(), cert_before);
    assert_eq!(fs::read(manager.key_path()).unwrap(), key_before);
}

#[tokio::test]
async fn test_renewal_preconditions_surface_before_any_side_effect() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);
    manager.generate("ws", "guid").unwrap();
    let cert_before = fs::read(manager.cert_path()).unwrap();

    // Endpoint not yet configured
    let store = write_config(&dir, "WORKSPACE_ID=ws\nAGENT_GUID=guid\n");
    let transport = MtlsTransport::new(None);
    let err = manager
        .renew(&store, &transport, &NoConfirmation)
        .await
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::MissingConfig { .. }));

    // Identity pair untouched by the failed precondition
    assert_eq!(fs::read(manager.cert_path()).unwrap(), cert_before);
}

#[tokio::test]
async fn test_endpoints_file_flow_writes_both_endpoints() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);
    let store = write_config(
        &dir,
        "WORKSPACE_ID=ws\nCERTIFICATE_UPDATE_ENDPOINT=placeholder\nDSC_ENDPOINT=placeholder\n",
    );
    let transport = MtlsTransport::new(None);

    let xml_path = dir.path().join("endpoints.xml");
    fs::write(
        &xml_path,
        r#"<Response>
  <CertificateUpdateEndpoint updateCertificate="true">https://svc.example.com/RenewCertificate</CertificateUpdateEndpoint>
  <DscConfiguration><Endpoint>https://dsc.example.com/Accounts(1)</Endpoint></DscConfiguration>
</Response>"#,
    )
    .unwrap();
    let out_path = dir.path().join("endpoints.out");

    let extractor = EndpointExtractor::new(&store, &manager, &transport);
    extractor
        .apply_endpoints_file(&xml_path, &out_path, &ServiceIdentity::default())
        .await
        .unwrap();

    // Renewal is suppressed in this flow even though the service asked for
    // an update; only the endpoints are recorded.
    let written = fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        written,
        "https://svc.example.com/RenewCertificate\nhttps://dsc.example.com/Accounts\\(1\\)\n"
    );

    let config = store.load().unwrap();
    assert_eq!(
        config.certificate_update_endpoint.as_deref(),
        Some("https://svc.example.com/RenewCertificate")
    );
    assert_eq!(
        config.dsc_endpoint.as_deref(),
        Some("https://dsc.example.com/Accounts\\(1\\)")
    );
}

#[tokio::test]
async fn test_extraction_triggers_renewal_whose_code_propagates() {
    let dir = TempDir::new().unwrap();
    let manager = manager_in(&dir);
    manager.generate("ws", "guid").unwrap();

    let store = write_config(
        &dir,
        "WORKSPACE_ID=ws\nAGENT_GUID=guid\n\
         CERTIFICATE_UPDATE_ENDPOINT=https://127.0.0.1:1/RenewCertificate\n",
    );
    let transport = MtlsTransport::new(None);

    let response = r#"<Response>
  <CertificateUpdateEndpoint updateCertificate="true">https://127.0.0.1:1/RenewCertificate</CertificateUpdateEndpoint>
</Response>"#;

    let cert_before = fs::read(manager.cert_path()).unwrap();

    let extractor = EndpointExtractor::new(&store, &manager, &transport);
    let err = extractor
        .apply_certificate_update_endpoint(response, RenewalTrigger::Enabled, &NoConfirmation)
        .await
        .unwrap_err();

    // The triggered renewal hit a dead endpoint; its code surfaces and the
    // identity is rolled back.
    assert!(matches!(err, MaintenanceError::ErrorSendingHttp { .. }));
    assert_eq!(fs::read(manager.cert_path()).unwrap(), cert_before);
}
