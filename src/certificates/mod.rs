// Agent identity certificate lifecycle - generation and transactional renewal

mod generator;
mod renewal;

pub use generator::CertificateManager;
pub use renewal::{CertSnapshot, NoConfirmation, RenewalConfirmer, RollbackGuard};
