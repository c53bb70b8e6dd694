// Endpoint extraction - recovers service-directed configuration from
// topology responses and folds it into the agent configuration file

use crate::certificates::{CertificateManager, NoConfirmation, RenewalConfirmer};
use crate::config::ConfigStore;
use crate::constants::{KEY_CERTIFICATE_UPDATE_ENDPOINT, KEY_DSC_ENDPOINT};
use crate::error::MaintenanceError;
use crate::system::{self, ServiceIdentity};
use crate::transport::MtlsTransport;
use crate::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Whether a server-requested certificate update may start a renewal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalTrigger {
    Enabled,
    Suppressed,
}

lazy_static! {
    // One pattern captures the update attribute and the endpoint together;
    // a response matches as a unit or not at all.
    static ref CERT_UPDATE_ENDPOINT_RE: Regex = Regex::new(
        r#"(?s)<CertificateUpdateEndpoint[^>]*updateCertificate="(true|false)"[^>]*>\s*([^<]*?)\s*</CertificateUpdateEndpoint>"#
    )
    .unwrap();
    static ref DSC_ENDPOINT_RE: Regex = Regex::new(
        r#"(?s)<DscConfiguration>.*?<Endpoint>\s*([^<]*?)\s*</Endpoint>.*?</DscConfiguration>"#
    )
    .unwrap();
}

/// Parses topology responses and persists the recovered endpoints.
///
/// Extraction results are never held independently; they are written through
/// the config store as soon as they are recovered.
pub struct EndpointExtractor<'a> {
    store: &'a ConfigStore,
    certs: &'a CertificateManager,
    transport: &'a MtlsTransport,
}

impl<'a> EndpointExtractor<'a> {
    pub fn new(
        store: &'a ConfigStore,
        certs: &'a CertificateManager,
        transport: &'a MtlsTransport,
    ) -> Self {
        Self {
            store,
            certs,
            transport,
        }
    }

    /// Recover the certificate renewal endpoint and the update-requested
    /// attribute, persist the endpoint, and start a renewal when the service
    /// asked for one and `trigger` allows it.
    pub async fn apply_certificate_update_endpoint(
        &self,
        response: &str,
        trigger: RenewalTrigger,
        confirmer: &dyn RenewalConfirmer,
    ) -> Result<String> {
        let caps = CERT_UPDATE_ENDPOINT_RE
            .captures(response)
            .ok_or(MaintenanceError::MissingCertUpdateEndpoint)?;

        let endpoint = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        if endpoint.is_empty() {
            return Err(MaintenanceError::MissingCertUpdateEndpoint);
        }

        // The pattern requires both groups, so a match without the attribute
        // cannot currently occur; the branch stays for when the pattern is
        // ever relaxed.
        let update_requested = match caps.get(1) {
            Some(attr) => attr.as_str() == "true",
            None => {
                return Err(MaintenanceError::ErrorExtractingAttributes {
                    detail: "updateCertificate attribute absent".to_string(),
                })
            }
        };

        self.store.update(KEY_CERTIFICATE_UPDATE_ENDPOINT, endpoint)?;
        debug!(endpoint, update_requested, "certificate update endpoint applied");

        if update_requested && trigger == RenewalTrigger::Enabled {
            info!("service requested certificate renewal");
            self.certs
                .renew(self.store, self.transport, confirmer)
                .await?;
        }

        Ok(endpoint.to_string())
    }

    /// Recover the DSC endpoint, escape literal parentheses (the consumer
    /// treats unescaped ones specially), and persist it
    pub fn apply_dsc_endpoint(&self, response: &str) -> Result<String> {
        let caps = DSC_ENDPOINT_RE.captures(response).ok_or_else(|| {
            MaintenanceError::ErrorExtractingAttributes {
                detail: "DscConfiguration endpoint".to_string(),
            }
        })?;

        let endpoint = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        if endpoint.is_empty() {
            return Err(MaintenanceError::ErrorExtractingAttributes {
                detail: "DscConfiguration endpoint empty".to_string(),
            });
        }

        let escaped = endpoint.replace('(', "\\(").replace(')', "\\)");
        self.store.update(KEY_DSC_ENDPOINT, &escaped)?;
        debug!(endpoint = %escaped, "DSC endpoint applied");
        Ok(escaped)
    }

    /// Apply both extractions from a pre-fetched XML document (onboarding
    /// flow) and write the recovered endpoints, one per line, to
    /// `output_path`. Renewal is never triggered from this flow.
    pub async fn apply_endpoints_file(
        &self,
        xml_path: &Path,
        output_path: &Path,
        owner: &ServiceIdentity,
    ) -> Result<()> {
        let xml = fs::read_to_string(xml_path).map_err(|e| {
            MaintenanceError::ErrorExtractingAttributes {
                detail: format!("{}: {}", xml_path.display(), e),
            }
        })?;

        let cert_endpoint = self
            .apply_certificate_update_endpoint(&xml, RenewalTrigger::Suppressed, &NoConfirmation)
            .await?;
        let dsc_endpoint = self.apply_dsc_endpoint(&xml)?;

        fs::write(output_path, format!("{cert_endpoint}\n{dsc_endpoint}\n")).map_err(|e| {
            MaintenanceError::ErrorWritingToFile {
                path: output_path.to_path_buf(),
                detail: e.to_string(),
            }
        })?;
        system::apply_ownership(output_path, owner).map_err(|e| {
            MaintenanceError::ErrorWritingToFile {
                path: output_path.to_path_buf(),
                detail: e.to_string(),
            }
        })?;

        info!(output = %output_path.display(), "endpoints applied from file");
        Ok(())
    }
}
