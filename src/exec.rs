//! External command execution.
//!
//! Playback, local synthesis and the routing-container probe all shell out.
//! They go through [`CommandExecutor`] so tests can record calls instead of
//! spawning processes.

use crate::error::{NavError, Result};
use std::process::Command;

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync so it can sit behind an `Arc` in async stages.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments, returning its stdout.
    fn execute(&self, command: &str, args: &[&str]) -> Result<String>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        tracing::trace!(command, ?args, "spawning");
        let output = Command::new(command).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NavError::ToolNotFound {
                    tool: command.to_string(),
                }
            } else {
                NavError::CommandFailed {
                    message: format!("Failed to execute {}: {}", command, e),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NavError::CommandFailed {
                message: format!("{} failed with {}: {}", command, output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Replace `{name}` placeholders in each argument.
///
/// Each template is scanned once, so placeholders inside substituted values
/// are left as they are.
pub fn expand_args(template: &[String], values: &[(&str, &str)]) -> Vec<String> {
    template.iter().map(|arg| expand(arg, values)).collect()
}

fn expand(arg: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let known = tail.find('}').and_then(|close| {
            let name = &tail[1..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match known {
            Some((close, value)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
