use std::collections::{BTreeSet, HashMap};

use annotation_engine::{AnnotationBook, DragOutcome};
use market_core::{Candle, LineKind, LineSet, PriceLine, SeriesVersion};

use crate::error::SurfaceError;
use crate::style::{ChartOptions, LineOptions};
use crate::surface::{LineHandle, RenderSurface};

/// Whether a publish reached the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Drawn,
    /// Stored until the container is attached
    Deferred,
}

/// What happened to a drag reported by the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRelay {
    /// The book moved the line and the renderer now shows it under `handle`
    Redrawn { line: PriceLine, handle: LineHandle },
    /// The book moved the line but the renderer went away; it is redrawn on attach
    Deferred { line: PriceLine },
    /// The book refused the drag
    Ignored(DragOutcome),
    /// The handle is not a draggable line this adapter drew
    Unrecognized(LineHandle),
}

#[derive(Debug, Clone)]
struct Frame {
    candles: Vec<Candle>,
    lines: Option<LineSet>,
}

#[derive(Debug, Clone, Copy)]
struct DrawnLines {
    current_time: LineHandle,
    take_profit: LineHandle,
}

#[derive(Debug, Clone, Copy)]
struct IssuedLine {
    kind: LineKind,
    version: SeriesVersion,
}

/// Pushes candles and lines to a [`RenderSurface`].
///
/// Calls made while the surface is detached are kept as a single pending
/// frame (newest wins) and replayed by [`ChartAdapter::attach`].
pub struct ChartAdapter<S: RenderSurface> {
    surface: S,
    options: ChartOptions,
    configured: bool,
    shown: Option<Frame>,
    drawn: Option<DrawnLines>,
    pending: Option<Frame>,
    issued: HashMap<LineHandle, IssuedLine>,
    // Every line created on the surface and not yet removed
    on_surface: BTreeSet<LineHandle>,
}

impl<S: RenderSurface> ChartAdapter<S> {
    pub fn new(surface: S, options: ChartOptions) -> Self {
        Self {
            surface,
            options,
            configured: false,
            shown: None,
            drawn: None,
            pending: None,
            issued: HashMap::new(),
            on_surface: BTreeSet::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn is_ready(&self) -> bool {
        self.configured && self.surface.is_attached()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Handle of the take-profit line currently on the chart
    pub fn take_profit_handle(&self) -> Option<LineHandle> {
        self.drawn.map(|d| d.take_profit)
    }

    pub fn current_time_handle(&self) -> Option<LineHandle> {
        self.drawn.map(|d| d.current_time)
    }

    /// Container mounted with `width`: configure the chart and replay what was deferred.
    pub fn attach(&mut self, width: u32) -> Result<PublishOutcome, SurfaceError> {
        self.options.width = width;
        if !self.surface.is_attached() {
            return Err(SurfaceError::NotAttached);
        }

        self.surface.configure(&self.options)?;
        self.configured = true;
        tracing::debug!(width, height = self.options.height, "Chart configured");

        match self.pending.take() {
            Some(frame) => self.draw_or_defer(frame),
            None => Ok(PublishOutcome::Drawn),
        }
    }

    /// Container unmounted. Whatever was shown is redrawn on the next attach.
    pub fn detach(&mut self) {
        self.configured = false;
        self.drawn = None;
        self.issued.clear();
        self.on_surface.clear();
        if self.pending.is_none() {
            self.pending = self.shown.take();
        }
    }

    /// Show `candles` with `lines`, replacing whatever was drawn before.
    pub fn publish(
        &mut self,
        candles: &[Candle],
        lines: Option<&LineSet>,
    ) -> Result<PublishOutcome, SurfaceError> {
        let frame = Frame {
            candles: candles.to_vec(),
            lines: lines.copied(),
        };
        if !self.is_ready() {
            tracing::debug!(candles = candles.len(), "Chart not ready, deferring frame");
            self.pending = Some(frame);
            return Ok(PublishOutcome::Deferred);
        }
        self.draw_or_defer(frame)
    }

    /// Forward a container width change.
    pub fn on_resize(&mut self, width: u32) -> Result<PublishOutcome, SurfaceError> {
        self.options.width = width;
        if !self.is_ready() {
            return Ok(PublishOutcome::Deferred);
        }
        match self.surface.relayout_width(width) {
            Ok(()) => Ok(PublishOutcome::Drawn),
            Err(SurfaceError::NotAttached) => {
                self.detach();
                Ok(PublishOutcome::Deferred)
            }
            Err(e) => Err(e),
        }
    }

    /// Relay a renderer drag on `handle` to the book and redraw the moved line.
    pub fn on_line_dragged(
        &mut self,
        handle: LineHandle,
        price: f64,
        book: &mut AnnotationBook,
    ) -> Result<DragRelay, SurfaceError> {
        let issued = match self.issued.get(&handle) {
            Some(issued) if issued.kind == LineKind::TakeProfit => *issued,
            _ => {
                tracing::warn!(%handle, "Drag on a line this chart did not draw as draggable");
                return Ok(DragRelay::Unrecognized(handle));
            }
        };

        let line = match book.apply_drag(issued.version, price) {
            DragOutcome::Applied(line) => line,
            outcome => return Ok(DragRelay::Ignored(outcome)),
        };

        if let Some(frame) = self.shown.as_mut() {
            if let Some(lines) = frame.lines.as_mut() {
                lines.take_profit = line;
            }
        }

        match self.redraw_take_profit(handle, &line) {
            Ok(handle) => Ok(DragRelay::Redrawn { line, handle }),
            Err(SurfaceError::NotAttached) => {
                self.detach();
                Ok(DragRelay::Deferred { line })
            }
            Err(e) => {
                self.abandon_lines();
                Err(e)
            }
        }
    }

    fn draw_or_defer(&mut self, frame: Frame) -> Result<PublishOutcome, SurfaceError> {
        match self.draw(&frame) {
            Ok(()) => {
                self.shown = Some(frame);
                Ok(PublishOutcome::Drawn)
            }
            Err(SurfaceError::NotAttached) => {
                tracing::debug!("Chart detached mid-draw, deferring frame");
                self.detach();
                self.pending = Some(frame);
                Ok(PublishOutcome::Deferred)
            }
            Err(e) => Err(e),
        }
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        self.surface.set_series(&frame.candles)?;

        if let Err(e) = self.replace_lines(frame.lines.as_ref()) {
            if e != SurfaceError::NotAttached {
                self.abandon_lines();
            }
            return Err(e);
        }

        self.surface.fit_to_content()
    }

    fn replace_lines(&mut self, lines: Option<&LineSet>) -> Result<(), SurfaceError> {
        self.drawn = None;
        let old: Vec<LineHandle> = self.on_surface.iter().copied().collect();
        for handle in old {
            self.remove_line(handle)?;
        }

        let Some(lines) = lines else {
            return Ok(());
        };
        let current_time = self.create_line(&lines.current_time)?;
        let take_profit = self.create_line(&lines.take_profit)?;
        self.surface.subscribe_line_dragged(take_profit)?;
        self.drawn = Some(DrawnLines {
            current_time,
            take_profit,
        });

        // Keep the handles of the frame being replaced so late drags on
        // them are still recognised as stale.
        let keep_from = self
            .shown
            .as_ref()
            .and_then(|f| f.lines)
            .map(|l| l.version())
            .unwrap_or_else(|| lines.version());
        self.issued.retain(|_, issued| issued.version >= keep_from);
        Ok(())
    }

    /// Take every line off the chart after a failed renderer call. Lines the
    /// renderer refuses to remove stay tracked and are retried on the next draw.
    fn abandon_lines(&mut self) {
        self.drawn = None;
        let handles: Vec<LineHandle> = self.on_surface.iter().copied().collect();
        for handle in handles {
            self.issued.remove(&handle);
            if let Err(e) = self.remove_line(handle) {
                tracing::warn!(%handle, error = %e, "Could not remove line after failed draw");
            }
        }
    }

    fn redraw_take_profit(
        &mut self,
        dragged: LineHandle,
        line: &PriceLine,
    ) -> Result<LineHandle, SurfaceError> {
        let Some(drawn) = self.drawn else {
            return Err(SurfaceError::UnknownHandle(dragged));
        };
        self.drawn = None;
        self.remove_line(drawn.take_profit)?;
        self.issued.remove(&drawn.take_profit);

        let handle = self.create_line(line)?;
        self.surface.subscribe_line_dragged(handle)?;
        self.drawn = Some(DrawnLines {
            take_profit: handle,
            ..drawn
        });
        Ok(handle)
    }

    fn create_line(&mut self, line: &PriceLine) -> Result<LineHandle, SurfaceError> {
        let handle = self.surface.create_price_line(&LineOptions::for_line(line))?;
        self.on_surface.insert(handle);
        self.issued.insert(
            handle,
            IssuedLine {
                kind: line.kind,
                version: line.series_version,
            },
        );
        Ok(handle)
    }

    fn remove_line(&mut self, handle: LineHandle) -> Result<(), SurfaceError> {
        match self.surface.remove_price_line(handle) {
            Ok(()) | Err(SurfaceError::UnknownHandle(_)) => {
                self.on_surface.remove(&handle);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{RecordingSurface, SurfaceCall};
    use market_core::Series;

    fn series(closes: &[f64]) -> Series {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * 60, c, c + 2.0, c - 2.0, c))
            .collect();
        Series::new("TEST", 1, candles)
    }

    fn ready_adapter() -> ChartAdapter<RecordingSurface> {
        let mut adapter = ChartAdapter::new(RecordingSurface::attached(), ChartOptions::default());
        adapter.attach(800).unwrap();
        adapter
    }

    #[test]
    fn test_publish_draws_series_and_lines() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        let s = series(&[10.0, 12.0, 11.0]);
        let lines = *book.replace(&s).unwrap();

        let outcome = adapter.publish(s.candles(), Some(&lines)).unwrap();
        assert_eq!(outcome, PublishOutcome::Drawn);

        let surface = adapter.surface();
        assert_eq!(surface.candles().len(), 3);
        assert_eq!(surface.lines().len(), 2);
        let tp = adapter.take_profit_handle().unwrap();
        assert_eq!(surface.line(tp).unwrap().price, 13.0);
        assert!(surface.is_subscribed(tp));
        assert!(!surface.is_subscribed(adapter.current_time_handle().unwrap()));
        assert_eq!(surface.calls().last(), Some(&SurfaceCall::FitToContent));
    }

    #[test]
    fn test_republish_replaces_both_lines() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        let first = series(&[10.0]);
        let lines = *book.replace(&first).unwrap();
        adapter.publish(first.candles(), Some(&lines)).unwrap();
        let old_tp = adapter.take_profit_handle().unwrap();

        let second = series(&[20.0]);
        let lines = *book.replace(&second).unwrap();
        adapter.publish(second.candles(), Some(&lines)).unwrap();

        let surface = adapter.surface();
        assert_eq!(surface.lines().len(), 2);
        assert!(surface.line(old_tp).is_none());
        assert_eq!(
            surface.line(adapter.take_profit_handle().unwrap()).unwrap().price,
            21.0
        );
    }

    #[test]
    fn test_publish_before_attach_is_replayed() {
        let mut adapter = ChartAdapter::new(RecordingSurface::detached(), ChartOptions::default());
        let mut book = AnnotationBook::new();

        let stale = series(&[5.0]);
        let lines = *book.replace(&stale).unwrap();
        assert_eq!(
            adapter.publish(stale.candles(), Some(&lines)).unwrap(),
            PublishOutcome::Deferred
        );

        let latest = series(&[7.0, 8.0]);
        let lines = *book.replace(&latest).unwrap();
        adapter.publish(latest.candles(), Some(&lines)).unwrap();
        assert!(adapter.has_pending());

        adapter.surface_mut().attach();
        assert_eq!(adapter.attach(640).unwrap(), PublishOutcome::Drawn);

        let surface = adapter.surface();
        assert_eq!(surface.width(), 640);
        assert_eq!(surface.candles().len(), 2);
        assert_eq!(surface.lines().len(), 2);
        assert!(!adapter.has_pending());
    }

    #[test]
    fn test_attach_without_container_fails() {
        let mut adapter = ChartAdapter::new(RecordingSurface::detached(), ChartOptions::default());
        assert_eq!(adapter.attach(100), Err(SurfaceError::NotAttached));
    }

    #[test]
    fn test_resize_forwards_or_defers() {
        let mut adapter = ChartAdapter::new(RecordingSurface::detached(), ChartOptions::default());
        assert_eq!(adapter.on_resize(500).unwrap(), PublishOutcome::Deferred);

        adapter.surface_mut().attach();
        adapter.attach(500).unwrap();
        assert_eq!(adapter.on_resize(900).unwrap(), PublishOutcome::Drawn);
        assert_eq!(adapter.surface().width(), 900);
        assert_eq!(
            adapter.surface().calls().last(),
            Some(&SurfaceCall::RelayoutWidth { width: 900 })
        );
    }

    #[test]
    fn test_drag_redraws_take_profit() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        let s = series(&[10.0]);
        let lines = *book.replace(&s).unwrap();
        adapter.publish(s.candles(), Some(&lines)).unwrap();
        let old = adapter.take_profit_handle().unwrap();

        let relay = adapter.on_line_dragged(old, 15.5, &mut book).unwrap();
        let DragRelay::Redrawn { line, handle } = relay else {
            panic!("expected redraw, got {relay:?}");
        };

        assert_eq!(line.price, 15.5);
        assert_ne!(handle, old);
        let surface = adapter.surface();
        assert!(surface.line(old).is_none());
        assert_eq!(surface.line(handle).unwrap().price, 15.5);
        assert!(surface.is_subscribed(handle));
        assert_eq!(book.lines().unwrap().take_profit.price, 15.5);
    }

    #[test]
    fn test_drag_on_superseded_line_is_ignored() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        let first = series(&[10.0]);
        let lines = *book.replace(&first).unwrap();
        adapter.publish(first.candles(), Some(&lines)).unwrap();
        let old_tp = adapter.take_profit_handle().unwrap();

        let second = series(&[30.0]);
        let lines = *book.replace(&second).unwrap();
        adapter.publish(second.candles(), Some(&lines)).unwrap();

        let relay = adapter.on_line_dragged(old_tp, 99.0, &mut book).unwrap();
        assert!(matches!(relay, DragRelay::Ignored(DragOutcome::Stale { .. })));
        assert_eq!(book.lines().unwrap().take_profit.price, 31.0);
    }

    #[test]
    fn test_drag_on_marker_is_unrecognized() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        let s = series(&[10.0]);
        let lines = *book.replace(&s).unwrap();
        adapter.publish(s.candles(), Some(&lines)).unwrap();
        let marker = adapter.current_time_handle().unwrap();

        let relay = adapter.on_line_dragged(marker, 1.0, &mut book).unwrap();
        assert_eq!(relay, DragRelay::Unrecognized(marker));
        assert_eq!(book.lines().unwrap().current_time.price, 10.0);
    }

    #[test]
    fn test_backend_failure_surfaces_error() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        let s = series(&[10.0]);
        let lines = *book.replace(&s).unwrap();
        adapter.surface_mut().fail_next("webgl lost");

        let err = adapter.publish(s.candles(), Some(&lines)).unwrap_err();
        assert_eq!(err, SurfaceError::Backend("webgl lost".to_string()));
        assert_eq!(book.lines().unwrap().take_profit.price, 11.0);
    }

    #[test]
    fn test_remount_redraws_last_frame() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        let s = series(&[10.0, 11.0]);
        let lines = *book.replace(&s).unwrap();
        adapter.publish(s.candles(), Some(&lines)).unwrap();
        let v = lines.version();
        let tp = adapter.take_profit_handle().unwrap();
        adapter.on_line_dragged(tp, 18.0, &mut book).unwrap();

        adapter.surface_mut().detach();
        adapter.detach();
        assert!(adapter.has_pending());

        adapter.surface_mut().attach();
        adapter.attach(700).unwrap();
        let surface = adapter.surface();
        assert_eq!(surface.candles().len(), 2);
        let tp = adapter.take_profit_handle().unwrap();
        assert_eq!(surface.line(tp).unwrap().price, 18.0);
        assert_eq!(book.version(), v);
    }

    fn publish_closes(
        adapter: &mut ChartAdapter<RecordingSurface>,
        book: &mut AnnotationBook,
        closes: &[f64],
    ) -> Result<PublishOutcome, SurfaceError> {
        let s = series(closes);
        let lines = *book.replace(&s).unwrap();
        adapter.publish(s.candles(), Some(&lines))
    }

    fn drawn_lines(adapter: &ChartAdapter<RecordingSurface>) -> Vec<(String, f64)> {
        adapter
            .surface()
            .lines()
            .values()
            .map(|o| (o.title.clone(), o.price))
            .collect()
    }

    #[test]
    fn test_failed_line_creation_leaves_no_orphans() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        publish_closes(&mut adapter, &mut book, &[10.0]).unwrap();

        // set_series, two removals, marker creation, then take profit fails
        adapter.surface_mut().fail_after(4, "boom");
        let err = publish_closes(&mut adapter, &mut book, &[20.0]).unwrap_err();
        assert_eq!(err, SurfaceError::Backend("boom".to_string()));
        assert!(adapter.surface().lines().is_empty());
        assert!(adapter.take_profit_handle().is_none());

        publish_closes(&mut adapter, &mut book, &[30.0]).unwrap();
        assert_eq!(
            drawn_lines(&adapter),
            vec![
                ("Current Time".to_string(), 30.0),
                ("Take Profit".to_string(), 31.0)
            ]
        );
    }

    #[test]
    fn test_failed_subscribe_leaves_no_orphans() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        publish_closes(&mut adapter, &mut book, &[10.0]).unwrap();

        adapter.surface_mut().fail_after(5, "boom");
        assert!(publish_closes(&mut adapter, &mut book, &[20.0]).is_err());
        assert!(adapter.surface().lines().is_empty());

        publish_closes(&mut adapter, &mut book, &[30.0]).unwrap();
        assert_eq!(adapter.surface().lines().len(), 2);
        let tp = adapter.take_profit_handle().unwrap();
        assert!(adapter.surface().is_subscribed(tp));
    }

    #[test]
    fn test_failed_removal_is_retried_on_next_draw() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        publish_closes(&mut adapter, &mut book, &[10.0]).unwrap();

        adapter.surface_mut().fail_after(1, "boom");
        assert!(publish_closes(&mut adapter, &mut book, &[20.0]).is_err());

        publish_closes(&mut adapter, &mut book, &[30.0]).unwrap();
        assert_eq!(
            drawn_lines(&adapter),
            vec![
                ("Current Time".to_string(), 30.0),
                ("Take Profit".to_string(), 31.0)
            ]
        );
    }

    #[test]
    fn test_failed_drag_redraw_clears_chart_until_next_publish() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        publish_closes(&mut adapter, &mut book, &[10.0]).unwrap();
        let tp = adapter.take_profit_handle().unwrap();

        // Old take profit removed, replacement creation fails
        adapter.surface_mut().fail_after(1, "boom");
        assert!(adapter.on_line_dragged(tp, 14.0, &mut book).is_err());
        assert!(adapter.surface().lines().is_empty());
        assert_eq!(book.lines().unwrap().take_profit.price, 14.0);

        publish_closes(&mut adapter, &mut book, &[30.0]).unwrap();
        assert_eq!(adapter.surface().lines().len(), 2);
    }

    #[test]
    fn test_drag_forgets_removed_take_profit() {
        let mut adapter = ready_adapter();
        let mut book = AnnotationBook::new();
        publish_closes(&mut adapter, &mut book, &[10.0]).unwrap();
        let first = adapter.take_profit_handle().unwrap();

        for price in [12.0, 13.0, 14.0] {
            let tp = adapter.take_profit_handle().unwrap();
            adapter.on_line_dragged(tp, price, &mut book).unwrap();
        }

        assert_eq!(adapter.issued.len(), 2);
        assert_eq!(
            adapter.on_line_dragged(first, 99.0, &mut book).unwrap(),
            DragRelay::Unrecognized(first)
        );
        assert_eq!(book.lines().unwrap().take_profit.price, 14.0);
    }
}
