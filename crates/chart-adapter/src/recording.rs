//! In-memory renderer that records every call made on it.
//!
//! Used by the headless simulator and by tests in place of a real chart.

use std::collections::{BTreeMap, BTreeSet};

use market_core::Candle;
use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::style::{ChartOptions, LineOptions};
use crate::surface::{LineHandle, RenderSurface};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceCall {
    Configure { width: u32, height: u32 },
    SetSeries { candles: usize },
    CreatePriceLine { handle: LineHandle, title: String, price: f64 },
    RemovePriceLine { handle: LineHandle },
    FitToContent,
    SubscribeLineDragged { handle: LineHandle },
    RelayoutWidth { width: u32 },
}

/// What the chart currently shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    pub attached: bool,
    pub width: u32,
    pub height: u32,
    pub candles: Vec<Candle>,
    pub lines: Vec<(LineHandle, LineOptions)>,
    pub subscribed: Vec<LineHandle>,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    attached: bool,
    options: Option<ChartOptions>,
    width: u32,
    next_handle: u64,
    candles: Vec<Candle>,
    lines: BTreeMap<LineHandle, LineOptions>,
    subscribed: BTreeSet<LineHandle>,
    calls: Vec<SurfaceCall>,
    // Calls left to succeed before the injected failure, and its message
    failure: Option<(usize, String)>,
}

impl RecordingSurface {
    /// A surface whose container is not mounted yet
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn attached() -> Self {
        Self {
            attached: true,
            ..Self::default()
        }
    }

    /// Container mounted
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Container unmounted: the chart and all its lines are gone
    pub fn detach(&mut self) {
        self.attached = false;
        self.options = None;
        self.candles.clear();
        self.lines.clear();
        self.subscribed.clear();
    }

    /// Fail the next call with a renderer error
    pub fn fail_next(&mut self, message: &str) {
        self.fail_after(0, message);
    }

    /// Let `calls` more calls succeed, then fail the one after with a renderer error
    pub fn fail_after(&mut self, calls: usize, message: &str) {
        self.failure = Some((calls, message.to_string()));
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn lines(&self) -> &BTreeMap<LineHandle, LineOptions> {
        &self.lines
    }

    pub fn line(&self, handle: LineHandle) -> Option<&LineOptions> {
        self.lines.get(&handle)
    }

    /// Handle of the line drawn with `title`, if any
    pub fn line_titled(&self, title: &str) -> Option<LineHandle> {
        self.lines
            .iter()
            .find(|(_, options)| options.title == title)
            .map(|(handle, _)| *handle)
    }

    pub fn is_subscribed(&self, handle: LineHandle) -> bool {
        self.subscribed.contains(&handle)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            attached: self.attached,
            width: self.width,
            height: self.options.as_ref().map(|o| o.height).unwrap_or(0),
            candles: self.candles.clone(),
            lines: self
                .lines
                .iter()
                .map(|(handle, options)| (*handle, options.clone()))
                .collect(),
            subscribed: self.subscribed.iter().copied().collect(),
        }
    }

    fn check(&mut self) -> Result<(), SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::NotAttached);
        }
        match self.failure.take() {
            Some((0, message)) => Err(SurfaceError::Backend(message)),
            Some((left, message)) => {
                self.failure = Some((left - 1, message));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl RenderSurface for RecordingSurface {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn configure(&mut self, options: &ChartOptions) -> Result<(), SurfaceError> {
        self.check()?;
        self.width = options.width;
        self.options = Some(options.clone());
        self.calls.push(SurfaceCall::Configure {
            width: options.width,
            height: options.height,
        });
        Ok(())
    }

    fn set_series(&mut self, candles: &[Candle]) -> Result<(), SurfaceError> {
        self.check()?;
        self.candles = candles.to_vec();
        self.calls.push(SurfaceCall::SetSeries {
            candles: candles.len(),
        });
        Ok(())
    }

    fn create_price_line(&mut self, options: &LineOptions) -> Result<LineHandle, SurfaceError> {
        self.check()?;
        self.next_handle += 1;
        let handle = LineHandle(self.next_handle);
        self.lines.insert(handle, options.clone());
        self.calls.push(SurfaceCall::CreatePriceLine {
            handle,
            title: options.title.clone(),
            price: options.price,
        });
        Ok(handle)
    }

    fn remove_price_line(&mut self, handle: LineHandle) -> Result<(), SurfaceError> {
        self.check()?;
        if self.lines.remove(&handle).is_none() {
            return Err(SurfaceError::UnknownHandle(handle));
        }
        self.subscribed.remove(&handle);
        self.calls.push(SurfaceCall::RemovePriceLine { handle });
        Ok(())
    }

    fn fit_to_content(&mut self) -> Result<(), SurfaceError> {
        self.check()?;
        self.calls.push(SurfaceCall::FitToContent);
        Ok(())
    }

    fn subscribe_line_dragged(&mut self, handle: LineHandle) -> Result<(), SurfaceError> {
        self.check()?;
        if !self.lines.contains_key(&handle) {
            return Err(SurfaceError::UnknownHandle(handle));
        }
        self.subscribed.insert(handle);
        self.calls.push(SurfaceCall::SubscribeLineDragged { handle });
        Ok(())
    }

    fn relayout_width(&mut self, width: u32) -> Result<(), SurfaceError> {
        self.check()?;
        self.width = width;
        self.calls.push(SurfaceCall::RelayoutWidth { width });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::{PriceLine, SeriesVersion};

    #[test]
    fn test_detached_surface_refuses_calls() {
        let mut surface = RecordingSurface::detached();
        assert_eq!(surface.fit_to_content(), Err(SurfaceError::NotAttached));
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn test_line_lifecycle() {
        let mut surface = RecordingSurface::attached();
        let options = LineOptions::for_line(&PriceLine::take_profit(5.0, SeriesVersion(1)));
        let handle = surface.create_price_line(&options).unwrap();
        surface.subscribe_line_dragged(handle).unwrap();

        assert_eq!(surface.line_titled("Take Profit"), Some(handle));
        assert!(surface.is_subscribed(handle));

        surface.remove_price_line(handle).unwrap();
        assert!(!surface.is_subscribed(handle));
        assert_eq!(
            surface.remove_price_line(handle),
            Err(SurfaceError::UnknownHandle(handle))
        );
    }

    #[test]
    fn test_injected_failure_is_one_shot() {
        let mut surface = RecordingSurface::attached();
        surface.fail_next("context lost");
        assert_eq!(
            surface.relayout_width(10),
            Err(SurfaceError::Backend("context lost".to_string()))
        );
        assert!(surface.relayout_width(10).is_ok());
        assert_eq!(surface.width(), 10);
    }

    #[test]
    fn test_detach_drops_chart_state() {
        let mut surface = RecordingSurface::attached();
        surface.set_series(&[Candle::new(0, 1.0, 1.0, 1.0, 1.0)]).unwrap();
        surface.detach();
        let snapshot = surface.snapshot();
        assert!(!snapshot.attached);
        assert!(snapshot.candles.is_empty());
        assert!(snapshot.lines.is_empty());
    }

    #[test]
    fn test_failure_after_n_calls() {
        let mut surface = RecordingSurface::attached();
        surface.fail_after(2, "boom");
        assert!(surface.fit_to_content().is_ok());
        assert!(surface.relayout_width(5).is_ok());
        assert_eq!(
            surface.fit_to_content(),
            Err(SurfaceError::Backend("boom".to_string()))
        );
        assert!(surface.fit_to_content().is_ok());
    }
}
