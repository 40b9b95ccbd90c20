//! Navigation run and the single-stage commands behind the CLI.
//!
//! acquire fix → ask destination → geocode → check backend → route → speak

use crate::config::{Config, SerialConfig, SynthBackend};
use crate::error::{NavError, Result};
use crate::exec::{CommandExecutor, SystemCommandExecutor};
use crate::geo::Coordinate;
use crate::geocode::NominatimGeocoder;
use crate::gnss::{AcquireConfig, AcquireOutcome, Fix, acquire_fix, open_serial};
use crate::navigator::{NavOutcome, Navigator};
use crate::routing::{ContainerProbe, GraphHopperClient, RouteSummary, translate};
use crate::speech::{
    Announcer, CommandPlayer, CommandSynthesizer, HttpSynthesizer, Speaker, Synthesizer,
};
use crate::stt::Listener;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// How a full run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Navigated(NavOutcome),
    /// No valid frame before the acquisition deadline.
    NoFix,
    /// A stage after acquisition could not be set up.
    Unavailable { reason: String },
    /// Ctrl-C.
    Interrupted,
}

/// Run the whole pipeline once.
///
/// The only error is failing to open the serial device; every later problem
/// is spoken or logged and reported through [`RunOutcome`].
pub async fn run_navigation(config: &Config) -> Result<RunOutcome> {
    #[cfg(feature = "cpal-audio")]
    crate::audio::capture::suppress_audio_warnings();

    let fix = match acquire(&config.serial).await? {
        AcquireOutcome::Fix(fix) => fix,
        AcquireOutcome::TimedOut => {
            match build_speaker(config) {
                Ok(speaker) => speaker.announce(&config.prompts.no_fix).await,
                Err(e) => tracing::warn!("speech output unavailable: {e}"),
            }
            return Ok(RunOutcome::NoFix);
        }
        AcquireOutcome::Interrupted => return Ok(RunOutcome::Interrupted),
    };

    Ok(navigate_from(config, fix).await)
}

/// Build the remaining stages and navigate from `fix`, racing Ctrl-C.
pub async fn navigate_from(config: &Config, fix: Fix) -> RunOutcome {
    let navigator = match build_navigator(config) {
        Ok(navigator) => navigator,
        Err(e) => {
            tracing::error!("cannot start navigation: {e}");
            return RunOutcome::Unavailable {
                reason: e.to_string(),
            };
        }
    };

    tokio::select! {
        outcome = navigator.navigate(fix) => {
            tracing::info!(?outcome, "navigation finished");
            RunOutcome::Navigated(outcome)
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            RunOutcome::Interrupted
        }
    }
}

fn build_navigator(config: &Config) -> Result<Navigator> {
    Ok(Navigator::new(
        build_listener(config)?,
        Arc::new(NominatimGeocoder::new(&config.geocoder)?),
        Arc::new(ContainerProbe::new(executor(), &config.routing.container)),
        Arc::new(GraphHopperClient::new(&config.routing)?),
        build_speaker(config)?,
    )
    .with_routing(config.routing.clone())
    .with_prompts(config.prompts.clone()))
}

/// Open the serial line and wait for a fix, racing Ctrl-C.
///
/// On interrupt the loop is told to stop and awaited, so the port is closed
/// before this returns.
pub async fn acquire(config: &SerialConfig) -> Result<AcquireOutcome> {
    let source = open_serial(config)?;
    let timing = AcquireConfig::from(config);
    let cancel = Arc::new(AtomicBool::new(false));

    let mut task = tokio::task::spawn_blocking({
        let cancel = Arc::clone(&cancel);
        move || acquire_fix(source, timing, &cancel)
    });

    tokio::select! {
        joined = &mut task => {
            joined.map_err(|e| NavError::Other(format!("fix acquisition task failed: {e}")))
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, releasing serial port");
            cancel.store(true, Ordering::Relaxed);
            if let Err(e) = task.await {
                tracing::warn!("fix acquisition task failed: {e}");
            }
            Ok(AcquireOutcome::Interrupted)
        }
    }
}

/// Capture one utterance and recognize it.
pub async fn listen_once(config: &Config) -> Result<Option<String>> {
    #[cfg(feature = "cpal-audio")]
    crate::audio::capture::suppress_audio_warnings();

    let listener = build_listener(config)?;
    Ok(listener.listen().await)
}

/// Resolve an address, surfacing service errors.
pub async fn geocode_address(config: &Config, address: &str) -> Result<Option<Coordinate>> {
    NominatimGeocoder::new(&config.geocoder)?
        .search(address)
        .await
}

/// Request and translate a route, surfacing service errors.
///
/// `Ok(None)` when the server answered without a usable path.
pub async fn route_between(
    config: &Config,
    from: Coordinate,
    to: Coordinate,
) -> Result<Option<RouteSummary>> {
    let response = GraphHopperClient::new(&config.routing)?
        .request(from, to)
        .await?;
    Ok(translate(Some(&response), &config.routing))
}

/// Speak `text`, surfacing synthesis and playback errors.
pub async fn say(config: &Config, text: &str) -> Result<()> {
    build_speaker(config)?.speak(text).await
}

/// Speech output wired from configuration.
pub fn build_speaker(config: &Config) -> Result<Arc<Speaker>> {
    let synthesizer: Arc<dyn Synthesizer> = match config.speech.backend {
        SynthBackend::Http => Arc::new(HttpSynthesizer::new(&config.speech)?),
        SynthBackend::Command => Arc::new(CommandSynthesizer::new(executor(), &config.speech)),
    };
    let player = Arc::new(CommandPlayer::new(executor(), &config.speech));
    Ok(Arc::new(Speaker::new(synthesizer, player)))
}

#[cfg(feature = "cpal-audio")]
fn build_listener(config: &Config) -> Result<Arc<dyn Listener>> {
    use crate::recording::ListenConfig;
    use crate::stt::{HttpRecognizer, VoiceListener};

    let capture = crate::stt::listener::microphone(
        config.audio.device.clone(),
        ListenConfig::from(&config.audio),
    );
    let recognizer = HttpRecognizer::new(&config.stt)?;
    Ok(Arc::new(VoiceListener::new(
        Arc::new(capture),
        Arc::new(recognizer),
    )))
}

#[cfg(not(feature = "cpal-audio"))]
fn build_listener(_config: &Config) -> Result<Arc<dyn Listener>> {
    Err(NavError::AudioCapture {
        message: "built without microphone support (enable the cpal-audio feature)".to_string(),
    })
}

fn executor() -> Arc<dyn CommandExecutor> {
    Arc::new(SystemCommandExecutor::new())
}
