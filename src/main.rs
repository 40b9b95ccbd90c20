use anyhow::Result;
use clap::{CommandFactory, Parser};
use voicenav::app::{self, RunOutcome};
use voicenav::cli::{Cli, Commands, ConfigAction};
use voicenav::config::Config;
use voicenav::diagnostics::check_dependencies;
use voicenav::exec::SystemCommandExecutor;
use voicenav::gnss::AcquireOutcome;
use voicenav::output::{render_outcome, render_route, use_color};
use voicenav::routing::RouteSummary;
use voicenav::speech::Speaker;

/// Exit status after Ctrl-C.
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        None => {
            let config = load_config(&cli)?;
            let outcome = app::run_navigation(&config).await?;
            eprintln!("{}", render_outcome(&outcome, use_color(&std::io::stderr())));
            if outcome == RunOutcome::Interrupted {
                std::process::exit(EXIT_INTERRUPTED);
            }
        }
        Some(Commands::Fix) => {
            let config = load_config(&cli)?;
            match app::acquire(&config.serial).await? {
                AcquireOutcome::Fix(fix) => println!("{fix}"),
                AcquireOutcome::TimedOut => {
                    eprintln!(
                        "No fix within {}s on {}",
                        config.serial.acquire_timeout_secs, config.serial.port
                    );
                    std::process::exit(1);
                }
                AcquireOutcome::Interrupted => std::process::exit(EXIT_INTERRUPTED),
            }
        }
        Some(Commands::Listen) => {
            let config = load_config(&cli)?;
            match app::listen_once(&config).await? {
                Some(text) => println!("{text}"),
                None => {
                    eprintln!("Nothing recognized");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Geocode { address }) => {
            let config = load_config(&cli)?;
            match app::geocode_address(&config, address).await? {
                Some(place) => println!("{place}"),
                None => {
                    eprintln!("No match for '{address}'");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Route { from, to, speak }) => {
            let config = load_config(&cli)?;
            match app::route_between(&config, *from, *to).await? {
                Some(route) => {
                    println!("{}", render_route(&route, use_color(&std::io::stdout())));
                    if *speak {
                        speak_route(&*app::build_speaker(&config)?, &route).await?;
                    }
                }
                None => {
                    eprintln!("No route between {from} and {to}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Say { text }) => {
            let config = load_config(&cli)?;
            app::say(&config, text).await?;
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Ports) => {
            list_serial_ports()?;
        }
        Some(Commands::Check) => {
            let config = load_config(&cli)?;
            let executor = std::sync::Arc::new(SystemCommandExecutor::new());
            if !check_dependencies(&config, executor) {
                std::process::exit(1);
            }
        }
        Some(Commands::Config { action }) => {
            let config = load_config(&cli)?;
            handle_config_command(action, &config)?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "voicenav",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file, environment and command line.
///
/// Priority order (highest first):
/// 1. Command-line overrides (--port, --device, ...)
/// 2. VOICENAV_* environment variables
/// 3. Config file (--config or ~/.config/voicenav/config.toml)
/// 4. Built-in defaults
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Config::default_path())?,
    };
    let mut config = config.with_env_overrides();
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

async fn speak_route(speaker: &Speaker, route: &RouteSummary) -> Result<()> {
    for line in route.lines() {
        speaker.speak(line).await?;
    }
    Ok(())
}

fn handle_config_command(action: &ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Get { key } => println!("{}", config.get_value_by_path(key)?),
        ConfigAction::List { section } => print!("{}", config.to_toml(section.as_deref())?),
        ConfigAction::Dump => print!("{}", Config::default().to_toml(None)?),
    }
    Ok(())
}

#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = voicenav::audio::capture::list_devices()?;

    if devices.is_empty() {
        eprintln!("No audio input devices found");
        std::process::exit(1);
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    anyhow::bail!("built without microphone support (enable the cpal-audio feature)")
}

fn list_serial_ports() -> Result<()> {
    let ports = voicenav::gnss::serial::list_ports()?;

    if ports.is_empty() {
        eprintln!("No serial ports found");
        std::process::exit(1);
    }

    println!("Available serial ports:");
    for port in &ports {
        println!("  {}", port);
    }

    Ok(())
}
