//! External dependency checks.
//!
//! Verifies the player, the synthesizer, the routing container and the
//! serial device before a drive.

use crate::config::{Config, SynthBackend};
use crate::error::NavError;
use crate::exec::CommandExecutor;
use crate::routing::{BackendProbe, ContainerProbe};
use std::path::Path;
use std::sync::Arc;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Dependency is present and working
    Ok(String),
    /// Dependency is missing
    NotFound(String),
    /// Present but something is off
    Warning(String),
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckResult::Ok(_))
    }
}

/// One named check.
#[derive(Debug, PartialEq)]
pub struct Check {
    pub name: String,
    pub result: CheckResult,
}

/// Check that a command exists by running `<tool> --version`.
fn check_tool(executor: &dyn CommandExecutor, tool: &str) -> CheckResult {
    match executor.execute(tool, &["--version"]) {
        Ok(stdout) => {
            let version = stdout.lines().next().unwrap_or("").trim().to_string();
            CheckResult::Ok(if version.is_empty() {
                tool.to_string()
            } else {
                version
            })
        }
        Err(NavError::ToolNotFound { tool }) => CheckResult::NotFound(format!("'{tool}' not installed")),
        Err(e) => CheckResult::Warning(format!("'{tool}' found but --version failed: {e}")),
    }
}

fn check_serial(port: &str) -> CheckResult {
    if Path::new(port).exists() {
        CheckResult::Ok(port.to_string())
    } else {
        CheckResult::NotFound(format!("{port} does not exist (is the receiver plugged in?)"))
    }
}

fn check_synthesizer(executor: &dyn CommandExecutor, config: &Config) -> CheckResult {
    match config.speech.backend {
        SynthBackend::Http => CheckResult::Ok(format!("http ({})", config.speech.url)),
        SynthBackend::Command => check_tool(executor, &config.speech.command),
    }
}

fn check_routing_backend(executor: Arc<dyn CommandExecutor>, config: &Config) -> CheckResult {
    let container = &config.routing.container;
    if container.is_empty() {
        return CheckResult::Ok("check disabled".to_string());
    }
    if ContainerProbe::new(executor, container).is_running() {
        CheckResult::Ok(format!("container '{container}' running"))
    } else {
        CheckResult::NotFound(format!(
            "container '{container}' not running (docker start {container})"
        ))
    }
}

/// Run every check.
pub fn run_checks(config: &Config, executor: Arc<dyn CommandExecutor>) -> Vec<Check> {
    let check = |name: &str, result: CheckResult| Check {
        name: name.to_string(),
        result,
    };

    vec![
        check("serial device", check_serial(&config.serial.port)),
        check("player", check_tool(executor.as_ref(), &config.speech.player)),
        check("synthesizer", check_synthesizer(executor.as_ref(), config)),
        check("routing backend", check_routing_backend(executor, config)),
    ]
}

/// Run all checks and print results. Returns true when everything passed.
pub fn check_dependencies(config: &Config, executor: Arc<dyn CommandExecutor>) -> bool {
    println!("Checking external dependencies...\n");

    let checks = run_checks(config, executor);
    for Check { name, result } in &checks {
        match result {
            CheckResult::Ok(detail) => println!("{name:<16} ✓ {detail}"),
            CheckResult::NotFound(detail) => println!("{name:<16} ✗ {detail}"),
            CheckResult::Warning(detail) => println!("{name:<16} ⚠ {detail}"),
        }
    }

    let all_ok = checks.iter().all(|c| c.result.is_ok());
    println!();
    if all_ok {
        println!("✓ Ready to navigate.");
    } else {
        println!("⚠ Some dependencies are missing; navigation may stop early.");
    }
    all_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::tests::MockCommandExecutor;

    #[test]
    fn test_check_tool_reports_first_version_line() {
        let mock = MockCommandExecutor::new().with_response("mpg123 1.32.5\nmore\n");
        assert_eq!(
            check_tool(&mock, "mpg123"),
            CheckResult::Ok("mpg123 1.32.5".to_string())
        );
    }

    #[test]
    fn test_check_tool_missing() {
        let mock = MockCommandExecutor::new().with_error(NavError::ToolNotFound {
            tool: "mpg123".to_string(),
        });
        assert!(matches!(check_tool(&mock, "mpg123"), CheckResult::NotFound(_)));
    }

    #[test]
    fn test_check_tool_broken() {
        let mock = MockCommandExecutor::new().with_error(NavError::CommandFailed {
            message: "exit 1".to_string(),
        });
        assert!(matches!(check_tool(&mock, "mpg123"), CheckResult::Warning(_)));
    }

    #[test]
    fn test_check_serial_missing_device() {
        assert!(matches!(
            check_serial("/dev/voicenav-no-such-port"),
            CheckResult::NotFound(_)
        ));
    }

    #[test]
    fn test_check_serial_existing_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(check_serial(&file.path().to_string_lossy()).is_ok());
    }

    #[test]
    fn test_run_checks_order_and_calls() {
        let mut config = Config::default();
        config.serial.port = "/dev/voicenav-no-such-port".to_string();
        config.speech.backend = SynthBackend::Command;
        let mock = Arc::new(
            MockCommandExecutor::new()
                .with_response("mpg123 1.32.5")
                .with_response("eSpeak NG text-to-speech: 1.51")
                .with_response("graphhopper\n"),
        );

        let checks = run_checks(&config, mock.clone());

        let names: Vec<&str> = checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["serial device", "player", "synthesizer", "routing backend"]
        );
        assert!(!checks[0].result.is_ok());
        assert!(checks[1..].iter().all(|c| c.result.is_ok()));
        let commands: Vec<String> = mock.calls().into_iter().map(|(cmd, _)| cmd).collect();
        assert_eq!(commands, vec!["mpg123", "espeak-ng", "docker"]);
    }

    #[test]
    fn test_routing_check_disabled() {
        let mut config = Config::default();
        config.routing.container = String::new();
        let mock = Arc::new(MockCommandExecutor::new());

        assert!(check_routing_backend(mock.clone(), &config).is_ok());
        assert_eq!(mock.call_count(), 0);
    }
}
