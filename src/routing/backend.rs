//! Routing backend presence check.
//!
//! The routing server runs in a local container that must already be up.

use crate::exec::CommandExecutor;
use std::sync::Arc;

/// Answers whether the routing backend is running.
pub trait BackendProbe: Send + Sync {
    fn is_running(&self) -> bool;
}

/// Looks for a running container by name via `docker ps`.
pub struct ContainerProbe {
    executor: Arc<dyn CommandExecutor>,
    container: String,
}

impl ContainerProbe {
    /// An empty `container` disables the check.
    pub fn new(executor: Arc<dyn CommandExecutor>, container: &str) -> Self {
        Self {
            executor,
            container: container.to_string(),
        }
    }
}

impl BackendProbe for ContainerProbe {
    fn is_running(&self) -> bool {
        if self.container.is_empty() {
            return true;
        }

        let filter = format!("name={}", self.container);
        match self.executor.execute(
            "docker",
            &["ps", "--filter", &filter, "--format", "{{.Names}}"],
        ) {
            Ok(stdout) => {
                // The name filter is a substring match
                let running = stdout.lines().any(|name| name.trim() == self.container);
                if !running {
                    tracing::warn!(container = %self.container, "routing container not running");
                }
                running
            }
            Err(e) => {
                tracing::warn!("routing container check failed: {e}");
                false
            }
        }
    }
}
