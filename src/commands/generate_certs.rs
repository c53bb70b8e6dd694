// Generate-certs command - mint the agent's self-signed identity pair

use super::Command;
use crate::certificates::CertificateManager;
use crate::cli::Args;
use crate::system::ServiceIdentity;
use crate::Result;
use async_trait::async_trait;

/// Generates the identity certificate and key for the given workspace
pub struct GenerateCertsCommand {
    args: Args,
}

impl GenerateCertsCommand {
    pub fn new(args: Args) -> Self {
        Self { args }
    }
}

#[async_trait]
impl Command for GenerateCertsCommand {
    async fn execute(&self) -> Result<()> {
        let manager = CertificateManager::new(
            &self.args.cert,
            &self.args.key,
            ServiceIdentity::default(),
        );
        let workspace_id = self.args.identity.workspace_id.as_deref().unwrap_or("");
        let agent_guid = self.args.identity.agent_guid.as_deref().unwrap_or("");
        manager.generate(workspace_id, agent_guid)
    }

    fn name(&self) -> &'static str {
        "GenerateCertsCommand"
    }
}
