//! Chart and price-line appearance.

use market_core::{LineKind, PriceLine};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHART_HEIGHT: u32 = 400;

/// Price line dash pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Solid,
    Dotted,
    Dashed,
    LargeDashed,
    SparseDotted,
}

/// Everything the renderer needs to draw one price line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOptions {
    pub price: f64,
    pub color: String,
    pub line_width: u32,
    pub line_style: LineStyle,
    pub axis_label_visible: bool,
    pub title: String,
    pub draggable: bool,
}

impl LineOptions {
    pub fn for_line(line: &PriceLine) -> Self {
        match line.kind {
            LineKind::CurrentTime => Self {
                price: line.price,
                color: "#FF0000".to_string(),
                line_width: 2,
                line_style: LineStyle::Solid,
                axis_label_visible: true,
                title: "Current Time".to_string(),
                draggable: line.draggable,
            },
            LineKind::TakeProfit => Self {
                price: line.price,
                color: "#2196F3".to_string(),
                line_width: 2,
                line_style: LineStyle::Dashed,
                axis_label_visible: true,
                title: "Take Profit".to_string(),
                draggable: line.draggable,
            },
        }
    }
}

/// Chart colours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTheme {
    pub background: String,
    pub text: String,
    pub grid: String,
    pub border: String,
    pub up: String,
    pub down: String,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background: "#121212".to_string(),
            text: "#d1d4dc".to_string(),
            grid: "rgba(42, 46, 57, 0.5)".to_string(),
            border: "rgba(197, 203, 206, 0.5)".to_string(),
            up: "#26a69a".to_string(),
            down: "#ef5350".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub theme: ChartTheme,
    pub time_visible: bool,
    pub seconds_visible: bool,
}

impl ChartOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 0,
            height: DEFAULT_CHART_HEIGHT,
            theme: ChartTheme::default(),
            time_visible: true,
            seconds_visible: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::SeriesVersion;

    #[test]
    fn test_line_appearance() {
        let v = SeriesVersion(1);
        let marker = LineOptions::for_line(&PriceLine::current_time(11.0, v));
        assert_eq!(marker.title, "Current Time");
        assert_eq!(marker.line_style, LineStyle::Solid);
        assert!(!marker.draggable);

        let tp = LineOptions::for_line(&PriceLine::take_profit(12.0, v));
        assert_eq!(tp.title, "Take Profit");
        assert_eq!(tp.color, "#2196F3");
        assert_eq!(tp.line_style, LineStyle::Dashed);
        assert_eq!(tp.price, 12.0);
        assert!(tp.draggable);
    }

    #[test]
    fn test_chart_options_defaults() {
        let options = ChartOptions::new(640, 300);
        assert_eq!(options.width, 640);
        assert_eq!(options.height, 300);
        assert!(options.time_visible);
        assert!(!options.seconds_visible);
        assert_eq!(options.theme.background, "#121212");
    }

    #[test]
    fn test_line_options_wire_shape() {
        let tp = LineOptions::for_line(&PriceLine::take_profit(5.5, SeriesVersion(2)));
        let value = serde_json::to_value(&tp).unwrap();
        assert_eq!(value["line_style"], "Dashed");
        assert_eq!(value["axis_label_visible"], true);
        assert_eq!(value["price"], 5.5);
    }
}
