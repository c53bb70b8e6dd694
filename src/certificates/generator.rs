// Identity certificate generation - 2048-bit RSA, self-signed X.509 bound to
// the (workspace id, agent guid) pair

use crate::constants::{
    CERT_SERIAL_MAX, CERT_SUBJECT_O, CERT_SUBJECT_OU, CERT_VALIDITY_DAYS, RSA_KEY_BITS,
};
use crate::error::MaintenanceError;
use crate::system::{self, ServiceIdentity};
use crate::Result;
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::{
    AuthorityKeyIdentifier, BasicConstraints, SubjectKeyIdentifier,
};
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use rand::Rng;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Generates and persists the agent's identity key pair.
///
/// The certificate and key files live and die together: after any completed
/// operation either both exist with matching key material or neither does.
pub struct CertificateManager {
    cert_path: PathBuf,
    key_path: PathBuf,
    owner: ServiceIdentity,
}

impl CertificateManager {
    pub fn new<P: Into<PathBuf>>(cert_path: P, key_path: P, owner: ServiceIdentity) -> Self {
        Self {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
            owner,
        }
    }

    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Whether both identity files exist and are non-empty
    pub fn pair_present(&self) -> bool {
        file_non_empty(&self.cert_path) && file_non_empty(&self.key_path)
    }

    /// Generate a fresh identity pair and write it to the configured paths.
    ///
    /// The target files are created with mode 0600 before any key material is
    /// written, so the key is never briefly world-readable. Ownership is
    /// handed to the service account when running privileged.
    pub fn generate(&self, workspace_id: &str, agent_guid: &str) -> Result<()> {
        if workspace_id.is_empty() || agent_guid.is_empty() {
            return Err(MaintenanceError::MissingConfig {
                detail: "workspace id and agent guid are required for certificate generation"
                    .to_string(),
            });
        }

        let rsa = Rsa::generate(RSA_KEY_BITS)?;
        let pkey = PKey::from_rsa(rsa)?;
        let cert = build_self_signed(&pkey, workspace_id, agent_guid)?;

        let key_pem = pkey.private_key_to_pem_pkcs8()?;
        let cert_pem = cert.to_pem()?;

        write_restricted(&self.key_path, &key_pem).map_err(|e| generation_error(&self.key_path, e))?;
        write_restricted(&self.cert_path, &cert_pem)
            .map_err(|e| generation_error(&self.cert_path, e))?;

        if !self.pair_present() {
            return Err(MaintenanceError::ErrorGeneratingCerts {
                detail: "certificate or key file empty after generation".to_string(),
            });
        }

        for path in [&self.key_path, &self.cert_path] {
            if let Err(e) = system::apply_ownership(path, &self.owner) {
                warn!(path = %path.display(), error = %e, "could not apply ownership");
            }
        }

        info!(
            workspace_id,
            agent_guid,
            cert = %self.cert_path.display(),
            "generated agent identity certificate"
        );
        Ok(())
    }
}

/// Build the self-signed identity certificate for the agent.
///
/// The subject carries two independent CN attributes (workspace id and agent
/// guid), which is how the service correlates the identity on its side.
fn build_self_signed(
    pkey: &PKey<Private>,
    workspace_id: &str,
    agent_guid: &str,
) -> std::result::Result<X509, openssl::error::ErrorStack> {
    let mut name = X509NameBuilder::new()?;
    name.append_entry_by_text("CN", workspace_id)?;
    name.append_entry_by_text("CN", agent_guid)?;
    name.append_entry_by_text("OU", CERT_SUBJECT_OU)?;
    name.append_entry_by_text("O", CERT_SUBJECT_O)?;
    let name = name.build();

    let mut builder = X509Builder::new()?;
    builder.set_version(2)?;

    let serial: u32 = rand::thread_rng().gen_range(1..=CERT_SERIAL_MAX);
    let serial = BigNum::from_u32(serial)?.to_asn1_integer()?;
    builder.set_serial_number(&serial)?;

    builder.set_subject_name(&name)?;
    builder.set_issuer_name(&name)?;

    // Anchor both ends to one timestamp so the window is exactly 365 days
    let now = chrono::Utc::now().timestamp();
    let not_before = Asn1Time::from_unix(now)?;
    let not_after = Asn1Time::from_unix(now + i64::from(CERT_VALIDITY_DAYS) * 86_400)?;
    builder.set_not_before(&not_before)?;
    builder.set_not_after(&not_after)?;

    builder.set_pubkey(pkey)?;

    let skid = SubjectKeyIdentifier::new().build(&builder.x509v3_context(None, None))?;
    builder.append_extension(skid)?;
    let akid = AuthorityKeyIdentifier::new()
        .keyid(true)
        .issuer(true)
        .build(&builder.x509v3_context(None, None))?;
    builder.append_extension(akid)?;
    builder.append_extension(BasicConstraints::new().ca().build()?)?;

    builder.sign(pkey, MessageDigest::sha256())?;
    Ok(builder.build())
}

/// Create `path` with mode 0600 and write `contents` into it. The permissions
/// are in place before the first byte of key material lands on disk.
fn write_restricted(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::fs::PermissionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies at creation; clamp pre-existing files too
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)?;
    file.flush()
}

fn generation_error(path: &Path, e: io::Error) -> MaintenanceError {
    MaintenanceError::ErrorGeneratingCerts {
        detail: format!("{}: {}", path.display(), e),
    }
}

fn file_non_empty(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}
