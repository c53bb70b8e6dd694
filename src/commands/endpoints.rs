// Endpoints command - apply endpoints from a pre-fetched XML document
// (onboarding flow), never triggering a renewal

use super::{build_topology_client, Command};
use crate::cli::Args;
use crate::error::MaintenanceError;
use crate::system::ServiceIdentity;
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Applies both endpoint extractions from an XML file and writes the
/// recovered endpoints to an output file
pub struct EndpointsCommand {
    args: Args,
}

impl EndpointsCommand {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Split the `XML,OUT` argument pair
    fn paths(&self) -> Result<(PathBuf, PathBuf)> {
        let pair = self.args.action.endpoints.as_deref().unwrap_or("");
        match pair.split_once(',') {
            Some((xml, out)) if !xml.is_empty() && !out.is_empty() => {
                Ok((PathBuf::from(xml), PathBuf::from(out)))
            }
            _ => Err(MaintenanceError::InvalidOptionProvided {
                detail: format!("--endpoints expects XML,OUT, got {pair:?}"),
            }),
        }
    }
}

#[async_trait]
impl Command for EndpointsCommand {
    async fn execute(&self) -> Result<()> {
        let (xml_path, output_path) = self.paths()?;
        let client = build_topology_client(&self.args)?;
        client
            .extractor()
            .apply_endpoints_file(&xml_path, &output_path, &ServiceIdentity::default())
            .await
    }

    fn name(&self) -> &'static str {
        "EndpointsCommand"
    }
}
