//! HTML rendering of prediction reports.

use minijinja::Environment;
use serde::Serialize;

use crate::Result;
use crate::chart::BarChart;
use crate::types::{Prediction, PredictionReport};

const PAGE_TEMPLATE: &str = "upload_form.html";

/// One table row.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRow {
    pub label: String,
    pub probability: f32,
    /// Probability as a percentage with two decimals, e.g. `"91.25%"`.
    pub percent: String,
}

impl From<&Prediction> for PredictionRow {
    fn from(p: &Prediction) -> Self {
        Self {
            label: p.label.clone(),
            probability: p.probability,
            percent: format!("{:.2}%", p.probability * 100.0),
        }
    }
}

/// Everything the page template needs.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub photo_name: Option<String>,
    pub predictions: Vec<PredictionRow>,
    pub top_class: Option<String>,
    pub chart: Option<BarChart>,
    pub error: Option<String>,
}

impl PageView {
    /// View for a report; no chart when the provider was unavailable.
    pub fn from_report(report: &PredictionReport) -> Self {
        let predictions = report.predictions();
        Self {
            photo_name: Some(report.photo_name.clone()),
            predictions: predictions.iter().map(PredictionRow::from).collect(),
            top_class: report.top_class().map(str::to_string),
            chart: BarChart::from_predictions(predictions),
            error: None,
        }
    }

    /// View for a fresh upload: like [`from_report`](Self::from_report),
    /// but an unavailable prediction also asks for a valid image.
    pub fn from_upload(report: &PredictionReport) -> Self {
        Self {
            error: report.user_message().map(str::to_string),
            ..Self::from_report(report)
        }
    }

    /// View for a rejected upload: the message and nothing else.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            photo_name: None,
            predictions: Vec::new(),
            top_class: None,
            chart: None,
            error: Some(message.into()),
        }
    }
}

/// Renders [`PageView`]s with the bundled template.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(PAGE_TEMPLATE, include_str!("../templates/upload_form.html"))?;
        Ok(Self { env })
    }

    pub fn render(&self, view: &PageView) -> Result<String> {
        let template = self.env.get_template(PAGE_TEMPLATE)?;
        Ok(template.render(view)?)
    }
}
