// Transactional certificate renewal - snapshot, replace, confirm, roll back
//
// Renewal replaces the on-disk identity pair before the service has accepted
// it, so every failure path from that point on must restore the previous
// pair. The rollback is a guarded scope: the snapshot is restored on any exit
// that does not explicitly disarm the guard.

use super::generator::CertificateManager;
use crate::constants::{CONTENT_TYPE_XML, RENEWAL_XMLNS};
use crate::error::MaintenanceError;
use crate::transport::{ClientIdentity, MtlsTransport};
use crate::{ConfigStore, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use openssl::x509::X509;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, error, info};

/// Confirms a completed renewal exchange with the service.
///
/// Implemented by the topology client: the confirmation is a regular
/// heartbeat with renewal re-triggering suppressed, so a renewal can never
/// re-enter itself.
#[async_trait]
pub trait RenewalConfirmer: Send + Sync {
    async fn confirm(&self) -> Result<()>;
}

/// Confirmer for flows where renewal is suppressed and confirmation can
/// never be reached
pub struct NoConfirmation;

#[async_trait]
impl RenewalConfirmer for NoConfirmation {
    async fn confirm(&self) -> Result<()> {
        Ok(())
    }
}

/// In-memory copy of the identity pair taken before renewal starts
#[derive(Debug)]
pub struct CertSnapshot {
    cert: Vec<u8>,
    key: Vec<u8>,
}

impl CertSnapshot {
    /// Capture the current pair, failing with `MissingCerts` when either
    /// file is absent or empty
    pub fn capture(cert_path: &Path, key_path: &Path) -> Result<Self> {
        let cert = read_non_empty(cert_path)?;
        let key = read_non_empty(key_path)?;
        Ok(Self { cert, key })
    }

    /// Write the captured bytes back to disk
    pub fn restore(&self, cert_path: &Path, key_path: &Path) -> io::Result<()> {
        fs::write(cert_path, &self.cert)?;
        fs::write(key_path, &self.key)
    }

    /// TLS client identity built from the captured pair
    pub fn identity(&self) -> ClientIdentity {
        ClientIdentity::from_pem_pair(&self.cert, &self.key)
    }
}

fn read_non_empty(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).map_err(|e| MaintenanceError::MissingCerts {
        detail: format!("{}: {}", path.display(), e),
    })?;
    if bytes.is_empty() {
        return Err(MaintenanceError::MissingCerts {
            detail: format!("{} is empty", path.display()),
        });
    }
    Ok(bytes)
}

/// Restores the snapshot on every exit path that has not disarmed it.
///
/// Restoration is content-only: the previous key and certificate bytes go
/// back to their paths, leaving the identity exactly as it was before the
/// renewal began.
pub struct RollbackGuard<'a> {
    snapshot: &'a CertSnapshot,
    cert_path: &'a Path,
    key_path: &'a Path,
    armed: bool,
}

impl<'a> RollbackGuard<'a> {
    pub fn arm(snapshot: &'a CertSnapshot, cert_path: &'a Path, key_path: &'a Path) -> Self {
        Self {
            snapshot,
            cert_path,
            key_path,
            armed: true,
        }
    }

    /// The new pair is confirmed; keep it
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RollbackGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.snapshot.restore(self.cert_path, self.key_path) {
            Ok(()) => info!("renewal failed, previous agent identity restored"),
            Err(e) => error!(error = %e, "could not restore previous agent identity"),
        }
    }
}

impl CertificateManager {
    /// Renew the agent identity against the service.
    ///
    /// The new pair is generated on disk immediately, but the renewal request
    /// itself authenticates with the old pair: the service authorizes the
    /// change using the currently-trusted identity. A confirmation heartbeat
    /// must succeed before the old pair is discarded; until then any failure
    /// restores it.
    pub async fn renew(
        &self,
        store: &ConfigStore,
        transport: &MtlsTransport,
        confirmer: &dyn RenewalConfirmer,
    ) -> Result<()> {
        let config = store.load()?;
        let (workspace_id, agent_guid) = config.require_identity()?;
        let endpoint = config.require_certificate_update_endpoint()?;

        let snapshot = CertSnapshot::capture(self.cert_path(), self.key_path())?;
        let guard = RollbackGuard::arm(&snapshot, self.cert_path(), self.key_path());

        // The pair on disk is replaced from here on; the guard covers every
        // failure path below.
        self.generate(workspace_id, agent_guid)?;

        let new_cert_pem = fs::read(self.cert_path()).map_err(|e| {
            MaintenanceError::ErrorGeneratingCerts {
                detail: format!("{}: {}", self.cert_path().display(), e),
            }
        })?;
        let body = renewal_request_body(&new_cert_pem)?;

        debug!(endpoint, "sending certificate renewal request");
        let client = transport.client(&snapshot.identity())?;
        let response = client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_XML)
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

        // The service accepted the new certificate; it becomes authoritative
        // only once a heartbeat with the new identity succeeds.
        confirmer.confirm().await?;

        guard.disarm();
        info!("agent identity certificate renewed");
        Ok(())
    }
}

/// Fixed renewal envelope carrying the new certificate's DER, base64-encoded
fn renewal_request_body(cert_pem: &[u8]) -> Result<String> {
    let cert = X509::from_pem(cert_pem)?;
    let der = cert.to_der()?;
    Ok(format!(
        "<?xml version=\"1.0\"?>\n<CertificateUpdateRequest xmlns=\"{}\"><NewCertificate>{}</NewCertificate></CertificateUpdateRequest>",
        RENEWAL_XMLNS,
        BASE64.encode(der)
    ))
}
