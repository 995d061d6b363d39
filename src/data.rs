use std::fmt;

use serde::Serialize;

/// One observation for a country. Every metric may be absent; absence is
/// never folded into zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub country: String,
    pub year: Option<i32>,
    pub temperature_anomaly: Option<f64>,
    pub co2: Option<f64>,
    pub gdp: Option<f64>,
    pub extreme_events: Option<i64>,
}

impl Record {
    pub fn new(country: impl Into<String>) -> Self {
        Record {
            country: country.into(),
            year: None,
            temperature_anomaly: None,
            co2: None,
            gdp: None,
            extreme_events: None,
        }
    }

    pub fn metric(&self, metric: RankMetric) -> Option<f64> {
        match metric {
            RankMetric::TemperatureAnomaly => self.temperature_anomaly,
            RankMetric::Gdp => self.gdp,
        }
    }

    /// Display cells in column order: country, year, temp anomaly, CO2, GDP,
    /// extreme events.
    pub fn display_cells(&self) -> Vec<String> {
        vec![
            self.country.clone(),
            display_optional(self.year),
            display_real(self.temperature_anomaly),
            display_real(self.co2),
            display_real(self.gdp),
            display_optional(self.extreme_events),
        ]
    }
}

/// Metrics that can be ranked within a single year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "kebab-case")]
pub enum RankMetric {
    TemperatureAnomaly,
    Gdp,
}

impl RankMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            RankMetric::TemperatureAnomaly => "temperature anomaly",
            RankMetric::Gdp => "GDP",
        }
    }
}

impl fmt::Display for RankMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const MISSING_DISPLAY: &str = "NA";

pub fn display_optional<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| MISSING_DISPLAY.to_string())
}

pub fn display_real(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format_number(v),
        _ => MISSING_DISPLAY.to_string(),
    }
}

pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let rendered = format!("{value:.4}");
        if rendered.contains('.') {
            rendered
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string()
        } else {
            rendered
        }
    }
}
