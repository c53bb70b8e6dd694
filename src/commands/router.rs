// CommandRouter - routes CLI arguments to the appropriate Command

use super::{
    Command, EndpointsCommand, GenerateCertsCommand, HeartbeatCommand, RenewCertsCommand,
};
use crate::cli::Args;
use crate::error::MaintenanceError;
use crate::Result;

/// Determines which Command to execute based on the parsed arguments.
///
/// Exactly one maintenance action runs per invocation: heartbeat, certificate
/// generation, certificate renewal, or endpoint application from a file. No
/// action, or more than one, is an invalid invocation.
pub struct CommandRouter;

impl CommandRouter {
    /// Route the arguments to their Command
    pub fn route(args: Args) -> Result<Box<dyn Command>> {
        Self::validate_routing(&args)?;

        if args.action.heartbeat {
            return Ok(Box::new(HeartbeatCommand::new(args)));
        }
        if args.action.generate_certs {
            return Ok(Box::new(GenerateCertsCommand::new(args)));
        }
        if args.action.renew_certs {
            return Ok(Box::new(RenewCertsCommand::new(args)));
        }
        if args.action.endpoints.is_some() {
            return Ok(Box::new(EndpointsCommand::new(args)));
        }

        Err(MaintenanceError::InvalidOptionProvided {
            detail: "no action specified; expected one of --heartbeat, --generate-certs, \
                     --renew-certs, --endpoints"
                .to_string(),
        })
    }

    /// Reject argument combinations that select more than one action
    pub fn validate_routing(args: &Args) -> Result<()> {
        let selected = [
            args.action.heartbeat,
            args.action.generate_certs,
            args.action.renew_certs,
            args.action.endpoints.is_some(),
        ]
        .iter()
        .filter(|&&flag| flag)
        .count();

        if selected > 1 {
            return Err(MaintenanceError::InvalidOptionProvided {
                detail: "cannot combine multiple actions in one invocation".to_string(),
            });
        }

        Ok(())
    }
}
