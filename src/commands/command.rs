// Command trait - the interface every maintenance action implements

use crate::Result;
use async_trait::async_trait;

/// A single maintenance action, encapsulated as a command object.
///
/// Each command validates its own preconditions, executes one operational
/// mode to completion, and converts every failure into the fixed error
/// taxonomy before returning.
#[async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command").field("name", &self.name()).finish()
    }
}
