// Heartbeat command - one topology exchange with the management service

use super::{build_topology_client, Command};
use crate::cli::Args;
use crate::Result;
use async_trait::async_trait;

/// Runs the topology heartbeat
pub struct HeartbeatCommand {
    args: Args,
}

impl HeartbeatCommand {
    pub fn new(args: Args) -> Self {
        Self { args }
    }
}

#[async_trait]
impl Command for HeartbeatCommand {
    async fn execute(&self) -> Result<()> {
        let client = build_topology_client(&self.args)?;
        client.heartbeat().await
    }

    fn name(&self) -> &'static str {
        "HeartbeatCommand"
    }
}
