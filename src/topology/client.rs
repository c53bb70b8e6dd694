// Topology heartbeat client - authenticated liveness exchange with the
// management service over mutual TLS

use super::endpoints::{EndpointExtractor, RenewalTrigger};
use super::request::{
    append_fragment, IntervalApplier, LoggingIntervalApplier, NoTelemetry, TelemetrySource,
    TopologyRequestSource,
};
use crate::certificates::{CertificateManager, RenewalConfirmer};
use crate::config::ConfigStore;
use crate::constants::{
    ACCEPT_LANGUAGE, CONTENT_TYPE_XML, TOPOLOGY_REQUEST_PATH, USER_AGENT_PRODUCT,
};
use crate::error::MaintenanceError;
use crate::system;
use crate::transport::{ClientIdentity, MtlsTransport};
use crate::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Drives the topology heartbeat: reload configuration, send the request
/// with the current identity, then fold the response back into local state.
pub struct TopologyClient {
    store: ConfigStore,
    certs: CertificateManager,
    transport: MtlsTransport,
    request_source: Box<dyn TopologyRequestSource>,
    telemetry: Box<dyn TelemetrySource>,
    interval: Box<dyn IntervalApplier>,
    install_info: PathBuf,
}

impl TopologyClient {
    pub fn new(
        store: ConfigStore,
        certs: CertificateManager,
        transport: MtlsTransport,
        request_source: Box<dyn TopologyRequestSource>,
        install_info: PathBuf,
    ) -> Self {
        Self {
            store,
            certs,
            transport,
            request_source,
            telemetry: Box::new(NoTelemetry),
            interval: Box::new(LoggingIntervalApplier),
            install_info,
        }
    }

    pub fn with_telemetry(mut self, telemetry: Box<dyn TelemetrySource>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_interval_applier(mut self, interval: Box<dyn IntervalApplier>) -> Self {
        self.interval = interval;
        self
    }

    /// Extractor over this client's store, certificates and transport
    pub fn extractor(&self) -> EndpointExtractor<'_> {
        EndpointExtractor::new(&self.store, &self.certs, &self.transport)
    }

    /// Run one topology heartbeat. A server-requested certificate update
    /// starts a renewal.
    pub async fn heartbeat(&self) -> Result<()> {
        self.run_heartbeat(RenewalTrigger::Enabled).await
    }

    /// Renew the identity pair, confirming with a heartbeat
    pub async fn renew_certs(&self) -> Result<()> {
        self.certs.renew(&self.store, &self.transport, self).await
    }

    async fn run_heartbeat(&self, trigger: RenewalTrigger) -> Result<()> {
        // Always a fresh snapshot; a renewal in the same invocation may have
        // rewritten the file since the last load.
        let config = self.store.load()?;
        let (workspace_id, _agent_guid) = config.require_identity()?;
        let url_tld = config.require_url_tld()?;

        if !self.certs.pair_present() {
            return Err(MaintenanceError::MissingCerts {
                detail: format!(
                    "{} or {}",
                    self.certs.cert_path().display(),
                    self.certs.key_path().display()
                ),
            });
        }
        let identity =
            ClientIdentity::from_files(self.certs.cert_path(), self.certs.key_path())?;

        let mut body = self.request_source.build(&config)?;
        match self.telemetry.collect() {
            Ok(fragment) if !fragment.is_empty() => append_fragment(&mut body, &fragment),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "telemetry collection failed, continuing without it"),
        }

        let url = format!("https://{workspace_id}.oms.{url_tld}{TOPOLOGY_REQUEST_PATH}");
        debug!(url = %url, "sending topology request");

        let client = self.transport.client(&identity)?;
        let response = client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_XML)
            .header(reqwest::header::USER_AGENT, self.user_agent())
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .header("x-ms-date", Utc::now().to_rfc3339())
            .body(body)
            .send()
            .await
            .map_err(|e| MaintenanceError::ErrorSendingHttp {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(MaintenanceError::HttpNon200 {
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| MaintenanceError::ErrorSendingHttp {
                detail: format!("failed to read response body: {e}"),
            })?;

        let extractor = self.extractor();
        extractor
            .apply_certificate_update_endpoint(&text, trigger, self)
            .await?;
        extractor.apply_dsc_endpoint(&text)?;
        self.interval.apply(&text)?;

        info!(workspace_id, "topology heartbeat completed");
        Ok(())
    }

    /// Derived User-Agent; the version suffix comes from the install-info
    /// file and is omitted when that file is absent or empty
    fn user_agent(&self) -> String {
        match system::agent_version(&self.install_info) {
            Some(version) => format!("{USER_AGENT_PRODUCT}/{version}"),
            None => USER_AGENT_PRODUCT.to_string(),
        }
    }
}

#[async_trait]
impl RenewalConfirmer for TopologyClient {
    /// Confirmation is a regular heartbeat with renewal re-triggering
    /// suppressed, so one renewal cannot start another.
    async fn confirm(&self) -> Result<()> {
        self.run_heartbeat(RenewalTrigger::Suppressed).await
    }
}
