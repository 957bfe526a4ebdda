use crate::blocks::BlockOutput;
use crate::error::Result;
use std::sync::Arc;

/// Trait for running block programs
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `path` (with an optional single argument) and capture at most
    /// `capacity` bytes of its stdout, stopping at the first newline or NUL.
    async fn capture(&self, path: &str, arg: Option<&str>, capacity: usize) -> Result<BlockOutput>;

    /// Start `path` with `arg` in its own session without waiting for it.
    fn spawn_detached(&self, path: &str, arg: &str) -> Result<()>;
}

/// Factory function for the process-backed runner
pub fn create_command_runner() -> Arc<dyn CommandRunner> {
    Arc::new(super::process_runner::ProcessRunner::new())
}
