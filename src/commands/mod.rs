// Commands module - one Command per maintenance action, routed from CLI
// arguments

mod command;
mod endpoints;
mod generate_certs;
mod heartbeat;
mod renew_certs;
mod router;

pub use command::Command;
pub use endpoints::EndpointsCommand;
pub use generate_certs::GenerateCertsCommand;
pub use heartbeat::HeartbeatCommand;
pub use renew_certs::RenewCertsCommand;
pub use router::CommandRouter;

use crate::certificates::CertificateManager;
use crate::cli::Args;
use crate::config::ConfigStore;
use crate::system::ServiceIdentity;
use crate::topology::{OsInfoRequestSource, TopologyClient};
use crate::transport::{MtlsTransport, ProxyConfig};
use crate::Result;

/// Build the topology client from the invocation's positional arguments
pub(crate) fn build_topology_client(args: &Args) -> Result<TopologyClient> {
    let store = ConfigStore::new(&args.config);
    let certs = CertificateManager::new(&args.cert, &args.key, ServiceIdentity::default());
    let proxy = ProxyConfig::from_file(&args.proxy)?;
    let transport = MtlsTransport::new(proxy);
    let request_source = Box::new(OsInfoRequestSource::new(&args.os_info));

    Ok(TopologyClient::new(
        store,
        certs,
        transport,
        request_source,
        args.install_info.clone(),
    ))
}
