// Renew-certs command - transactional replacement of the identity pair

use super::{build_topology_client, Command};
use crate::cli::Args;
use crate::Result;
use async_trait::async_trait;

/// Renews the agent identity against the service, rolling back on failure
pub struct RenewCertsCommand {
    args: Args,
}

impl RenewCertsCommand {
    pub fn new(args: Args) -> Self {
        Self { args }
    }
}

#[async_trait]
impl Command for RenewCertsCommand {
    async fn execute(&self) -> Result<()> {
        let client = build_topology_client(&self.args)?;
        client.renew_certs().await
    }

    fn name(&self) -> &'static str {
        "RenewCertsCommand"
    }
}
