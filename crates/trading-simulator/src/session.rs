//! One chart on screen: the selected instrument and interval, the series
//! currently shown, its annotation lines and the renderer they are pushed to.

use annotation_engine::AnnotationBook;
use chart_adapter::{ChartAdapter, ChartOptions, RenderSurface, SurfaceError};
use market_core::{Candle, ChallengeSeries, Instrument, Interval, LineSet, Series, SeriesVersion};
use market_sim::{AssetCatalog, GeneratorConfig, InstrumentRegistry, RandomSource, SeriesGenerator};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::SimulatorConfig;
use crate::events::{ChartEvent, EventOutcome};

/// Identifies one regeneration request. Only the newest ticket may install
/// its series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenerationTicket(u64);

/// Series produced for a ticket, waiting to be installed
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub ticket: GenerationTicket,
    pub data: ChartData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Plain(Series),
    Challenge(ChallengeSeries),
}

impl ChartData {
    pub fn visible_candles(&self) -> Vec<Candle> {
        match self {
            ChartData::Plain(series) => series.candles().to_vec(),
            ChartData::Challenge(challenge) => challenge.visible_candles(),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            ChartData::Plain(series) => &series.symbol,
            ChartData::Challenge(challenge) => &challenge.past.symbol,
        }
    }
}

/// Settings a session starts with
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub asset_id: String,
    pub interval: Interval,
    pub series_length: usize,
    pub future_candles: usize,
    pub reveal_future: bool,
    pub chart_height: u32,
}

impl From<&SimulatorConfig> for SessionSettings {
    fn from(config: &SimulatorConfig) -> Self {
        Self {
            asset_id: config.instrument.clone(),
            interval: config.interval,
            series_length: config.series_length,
            future_candles: config.future_candles,
            reveal_future: config.reveal_future,
            chart_height: config.chart_height,
        }
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub asset_id: String,
    pub symbol: String,
    pub interval: Interval,
    pub version: SeriesVersion,
    pub candles: usize,
    pub last_close: Option<f64>,
    pub lines: Option<LineSet>,
    pub challenge: bool,
    pub reveal_future: bool,
    pub chart_ready: bool,
}

pub struct ChartSession<S: RenderSurface, R: RandomSource, C: Clock> {
    id: Uuid,
    registry: InstrumentRegistry,
    asset_id: String,
    instrument: Instrument,
    interval: Interval,
    series_length: usize,
    future_candles: usize,
    reveal_future: bool,
    random: R,
    clock: C,
    book: AnnotationBook,
    adapter: ChartAdapter<S>,
    chart: Option<ChartData>,
    latest_ticket: GenerationTicket,
}

impl<S: RenderSurface, R: RandomSource, C: Clock> ChartSession<S, R, C> {
    /// Create a session and generate its first series. Nothing is drawn
    /// until the surface is mounted.
    pub fn new(settings: SessionSettings, surface: S, random: R, clock: C) -> Self {
        let registry = InstrumentRegistry::new();
        let instrument = registry.lookup(&AssetCatalog::chart_symbol(&settings.asset_id));
        let adapter = ChartAdapter::new(surface, ChartOptions::new(0, settings.chart_height));

        let mut session = Self {
            id: Uuid::new_v4(),
            registry,
            asset_id: settings.asset_id,
            instrument,
            interval: settings.interval,
            series_length: settings.series_length,
            future_candles: settings.future_candles,
            reveal_future: settings.reveal_future,
            random,
            clock,
            book: AnnotationBook::new(),
            adapter,
            chart: None,
            latest_ticket: GenerationTicket(0),
        };

        tracing::info!(
            session = %session.id,
            asset = %session.asset_id,
            symbol = %session.instrument.key,
            interval = %session.interval,
            "Chart session created"
        );
        session.regenerate();
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn chart(&self) -> Option<&ChartData> {
        self.chart.as_ref()
    }

    pub fn book(&self) -> &AnnotationBook {
        &self.book
    }

    pub fn adapter(&self) -> &ChartAdapter<S> {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut ChartAdapter<S> {
        &mut self.adapter
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn handle(&mut self, event: ChartEvent) -> EventOutcome {
        tracing::debug!(session = %self.id, ?event, "Chart event");
        match event {
            ChartEvent::SelectInstrument { key } => self.select_instrument(&key),
            ChartEvent::SelectInterval { interval } => self.select_interval(interval),
            ChartEvent::Mount { width } => self.mount(width),
            ChartEvent::Unmount => {
                self.adapter.detach();
                EventOutcome::Unmounted
            }
            ChartEvent::Resize { width } => match self.adapter.on_resize(width) {
                Ok(outcome) => EventOutcome::Resized(outcome),
                Err(e) => self.surface_failed("resize", e),
            },
            ChartEvent::LineDragged { handle, price } => {
                match self.adapter.on_line_dragged(handle, price, &mut self.book) {
                    Ok(relay) => EventOutcome::Dragged(relay),
                    Err(e) => self.surface_failed("drag", e),
                }
            }
            ChartEvent::DragTakeProfit { price } => match self.adapter.take_profit_handle() {
                Some(handle) => self.handle(ChartEvent::LineDragged { handle, price }),
                None => {
                    tracing::debug!("No take-profit line drawn, ignoring drag");
                    EventOutcome::Unchanged
                }
            },
            ChartEvent::Refresh => self.regenerate(),
            ChartEvent::RevealFuture { reveal } => self.set_reveal_future(reveal),
        }
    }

    /// Select an asset by tile id. Builds a fresh series even when the asset
    /// is already selected.
    pub fn select_instrument(&mut self, asset_id: &str) -> EventOutcome {
        let symbol = AssetCatalog::chart_symbol(asset_id);
        if !self.registry.contains(&symbol) {
            tracing::warn!(asset = asset_id, "Unknown instrument, using fallback parameters");
        }
        self.asset_id = asset_id.to_string();
        self.instrument = self.registry.lookup(&symbol);
        self.regenerate()
    }

    pub fn select_interval(&mut self, interval: Interval) -> EventOutcome {
        self.interval = interval;
        self.regenerate()
    }

    pub fn mount(&mut self, width: u32) -> EventOutcome {
        match self.adapter.attach(width) {
            Ok(outcome) => EventOutcome::Mounted(outcome),
            Err(e) => self.surface_failed("mount", e),
        }
    }

    /// Show or hide the future candles of a challenge chart. The lines are
    /// derived again because the visible series changed.
    pub fn set_reveal_future(&mut self, reveal: bool) -> EventOutcome {
        self.reveal_future = reveal;
        let Some(ChartData::Challenge(challenge)) = self.chart.as_mut() else {
            return EventOutcome::Unchanged;
        };
        if challenge.reveal_future == reveal {
            return EventOutcome::Unchanged;
        }
        challenge.reveal_future = reveal;

        if let Err(e) = self.book.replace_challenge(challenge) {
            tracing::warn!(error = %e, "Could not derive lines for challenge");
        }
        let version = self.book.version();
        self.publish(version)
    }

    /// Start a regeneration. Any ticket issued earlier becomes superseded.
    pub fn request_generation(&mut self) -> GenerationTicket {
        self.latest_ticket = GenerationTicket(self.latest_ticket.0 + 1);
        self.latest_ticket
    }

    /// Build a series for `ticket` from the current selection.
    pub fn generate(&mut self, ticket: GenerationTicket) -> Generated {
        let generator = SeriesGenerator::new(GeneratorConfig::from_interval(
            self.interval,
            self.series_length,
        ));
        let now = self.clock.now();
        let data = if self.future_candles > 0 {
            let mut challenge = generator.generate_challenge(
                &self.instrument,
                self.future_candles,
                now,
                &mut self.random,
            );
            challenge.reveal_future = self.reveal_future;
            ChartData::Challenge(challenge)
        } else {
            ChartData::Plain(generator.generate(&self.instrument, now, &mut self.random))
        };
        Generated { ticket, data }
    }

    /// Install a generated series, unless a newer ticket was issued since.
    pub fn complete(&mut self, generated: Generated) -> EventOutcome {
        if generated.ticket != self.latest_ticket {
            tracing::debug!(
                ticket = generated.ticket.0,
                latest = self.latest_ticket.0,
                "Discarding superseded generation"
            );
            return EventOutcome::Superseded;
        }

        let derived = match &generated.data {
            ChartData::Plain(series) => self.book.replace(series).map(|_| ()),
            ChartData::Challenge(challenge) => self.book.replace_challenge(challenge).map(|_| ()),
        };
        if let Err(e) = derived {
            tracing::warn!(error = %e, symbol = generated.data.symbol(), "Series has no lines");
        }

        tracing::info!(
            symbol = generated.data.symbol(),
            interval = %self.interval,
            version = %self.book.version(),
            "Series replaced"
        );
        self.chart = Some(generated.data);
        let version = self.book.version();
        self.publish(version)
    }

    pub fn regenerate(&mut self) -> EventOutcome {
        let ticket = self.request_generation();
        let generated = self.generate(ticket);
        self.complete(generated)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let candles = self
            .chart
            .as_ref()
            .map(|c| c.visible_candles())
            .unwrap_or_default();
        let last_close = match &self.chart {
            Some(ChartData::Plain(series)) => series.last().map(|c| c.close),
            Some(ChartData::Challenge(challenge)) => challenge.past.last().map(|c| c.close),
            None => None,
        };
        SessionSnapshot {
            session_id: self.id,
            asset_id: self.asset_id.clone(),
            symbol: self.instrument.key.clone(),
            interval: self.interval,
            version: self.book.version(),
            candles: candles.len(),
            last_close,
            lines: self.book.lines().copied(),
            challenge: matches!(self.chart, Some(ChartData::Challenge(_))),
            reveal_future: self.reveal_future,
            chart_ready: self.adapter.is_ready(),
        }
    }

    fn publish(&mut self, version: SeriesVersion) -> EventOutcome {
        let candles = self
            .chart
            .as_ref()
            .map(|c| c.visible_candles())
            .unwrap_or_default();
        match self.adapter.publish(&candles, self.book.lines()) {
            Ok(publish) => EventOutcome::Regenerated { version, publish },
            Err(e) => self.surface_failed("publish", e),
        }
    }

    fn surface_failed(&self, action: &str, error: SurfaceError) -> EventOutcome {
        tracing::warn!(session = %self.id, action, error = %error, "Chart renderer call failed");
        EventOutcome::SurfaceFailed(error)
    }
}

