//! Headless trading simulator.
//!
//! Drives a [`ChartSession`] against the in-memory renderer, either from a
//! JSON script of [`ChartEvent`]s or from a refresh timer.

pub mod clock;
pub mod config;
pub mod events;
pub mod session;


pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SimulatorConfig;
pub use events::{ChartEvent, EventOutcome};
pub use session::{
    ChartData, ChartSession, Generated, GenerationTicket, SessionSettings, SessionSnapshot,
};

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chart_adapter::RecordingSurface;
use market_sim::{RandomSource, RngSource};

/// Session as run by the binary
pub type HeadlessSession<R, C> = ChartSession<RecordingSurface, R, C>;

/// Deliver `event`, mounting or unmounting the in-memory container first
/// when the event asks for it.
pub fn dispatch<R: RandomSource, C: Clock>(
    session: &mut HeadlessSession<R, C>,
    event: ChartEvent,
) -> EventOutcome {
    match &event {
        ChartEvent::Mount { .. } => session.adapter_mut().surface_mut().attach(),
        ChartEvent::Unmount => session.adapter_mut().surface_mut().detach(),
        _ => {}
    }
    session.handle(event)
}

/// Parse a JSON array of events
pub fn parse_script(json: &str) -> Result<Vec<ChartEvent>> {
    serde_json::from_str(json).context("Invalid event script")
}

pub async fn load_script(path: &Path) -> Result<Vec<ChartEvent>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read event script {}", path.display()))?;
    parse_script(&json)
}

/// Run one session to completion and return its final state.
pub async fn run(config: SimulatorConfig) -> Result<SessionSnapshot> {
    config.validate()?;

    let random = match config.seed {
        Some(seed) => {
            tracing::info!(seed, "Using seeded random source");
            RngSource::seeded(seed)
        }
        None => RngSource::from_entropy(),
    };
    let mut session = ChartSession::new(
        SessionSettings::from(&config),
        RecordingSurface::detached(),
        random,
        SystemClock,
    );

    let outcome = dispatch(
        &mut session,
        ChartEvent::Mount {
            width: config.chart_width,
        },
    );
    tracing::info!(?outcome, "Chart mounted");

    if let Some(path) = &config.script {
        let events = load_script(path).await?;
        tracing::info!(events = events.len(), path = %path.display(), "Replaying event script");
        for event in events {
            let outcome = dispatch(&mut session, event);
            tracing::debug!(?outcome, "Event handled");
        }
    }

    if config.refresh_seconds > 0 {
        refresh_loop(&mut session, &config).await;
    }

    Ok(session.snapshot())
}

async fn refresh_loop<R: RandomSource, C: Clock>(
    session: &mut HeadlessSession<R, C>,
    config: &SimulatorConfig,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(config.refresh_seconds));
    // First tick completes immediately
    interval.tick().await;

    tracing::info!(
        every_secs = config.refresh_seconds,
        ticks = config.refresh_ticks,
        "Refresh timer started"
    );
    for tick in 1..=config.refresh_ticks {
        tokio::select! {
            _ = interval.tick() => {
                let outcome = dispatch(session, ChartEvent::Refresh);
                tracing::info!(tick, version = %session.book().version(), ?outcome, "Chart refreshed");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping refresh timer");
                break;
            }
        }
    }
}
