//! Bar chart of class probabilities.
//!
//! Only geometry lives here; the page template draws the SVG. The y axis
//! is fixed to `[0, 1]` so charts from different photos compare directly.

use serde::Serialize;

use crate::types::Prediction;

/// Five-step red palette, darkest first.
pub const REDS5: [&str; 5] = ["#a50f15", "#de2d26", "#fb6a4a", "#fcae91", "#fee5d9"];

pub const CHART_TITLE: &str = "Confidence over dog breeds";
pub const X_AXIS_LABEL: &str = "Potential Breeds";
pub const Y_AXIS_LABEL: &str = "Probability";

const PLOT_WIDTH: f32 = 600.0;
const PLOT_HEIGHT: f32 = 350.0;
const MARGIN_LEFT: f32 = 60.0;
const MARGIN_TOP: f32 = 40.0;
const MARGIN_BOTTOM: f32 = 90.0;
/// Fraction of each slot the bar occupies.
const BAR_FILL: f32 = 0.9;

/// One bar, in SVG user units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub probability: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Horizontal centre, for the tick label.
    pub center: f32,
    pub color: &'static str,
}

/// A y-axis gridline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: String,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub width: f32,
    pub height: f32,
    /// Top of the plot area.
    pub plot_top: f32,
    /// Bottom of the plot area (the x axis).
    pub baseline: f32,
    pub plot_left: f32,
    pub plot_right: f32,
    pub bars: Vec<Bar>,
    pub ticks: Vec<Tick>,
}

impl BarChart {
    /// Build a chart from ranked predictions, in the order given.
    ///
    /// Returns `None` when there is nothing to draw.
    pub fn from_predictions(predictions: &[Prediction]) -> Option<Self> {
        if predictions.is_empty() {
            return None;
        }

        let plot_height = PLOT_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + plot_height;
        let slot = (PLOT_WIDTH - MARGIN_LEFT) / predictions.len() as f32;
        let bar_width = slot * BAR_FILL;

        let bars = predictions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let value = if p.probability.is_finite() {
                    p.probability.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let height = value * plot_height;
                let x = MARGIN_LEFT + i as f32 * slot + (slot - bar_width) / 2.0;
                Bar {
                    label: p.label.clone(),
                    probability: p.probability,
                    x,
                    y: baseline - height,
                    width: bar_width,
                    height,
                    center: x + bar_width / 2.0,
                    color: REDS5[i % REDS5.len()],
                }
            })
            .collect();

        let ticks = (0..=5)
            .map(|step| {
                let value = step as f32 * 0.2;
                Tick {
                    value: format!("{value:.1}"),
                    y: baseline - value * plot_height,
                }
            })
            .collect();

        Some(Self {
            title: CHART_TITLE,
            x_label: X_AXIS_LABEL,
            y_label: Y_AXIS_LABEL,
            width: PLOT_WIDTH,
            height: PLOT_HEIGHT,
            plot_top: MARGIN_TOP,
            baseline,
            plot_left: MARGIN_LEFT,
            plot_right: PLOT_WIDTH,
            bars,
            ticks,
        })
    }
}
