//! Percentage-gain thresholds.
//!
//! A threshold set is fixed for the life of a run: sorted ascending,
//! deduplicated and validated once at configuration time.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Text stored in the ledger when no threshold was reached.
pub const NO_TARGETS: &str = "None";

/// Ascending, deduplicated set of percentage thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Thresholds(Vec<f64>);

impl Thresholds {
    /// Validate, sort and deduplicate a list of thresholds.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Result<Self, ConfigError> {
        let mut values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Err(ConfigError::InvalidThresholds(
                "at least one threshold is required".into(),
            ));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidThresholds(format!(
                "threshold {bad} is not a finite number"
            )));
        }
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Thresholds at or below `change_pct`, ascending.
    pub fn targets_reached(&self, change_pct: f64) -> Vec<f64> {
        self.0.iter().copied().take_while(|t| *t <= change_pct).collect()
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self(vec![1.2, 1.5, 2.2])
    }
}

impl TryFrom<Vec<f64>> for Thresholds {
    type Error = ConfigError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Thresholds> for Vec<f64> {
    fn from(t: Thresholds) -> Self {
        t.0
    }
}

/// Render a single threshold the way it appears in the ledger and the
/// summary: whole numbers keep one fractional digit (`2.0`), everything else
/// uses the shortest round-tripping form (`1.2`).
pub fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Render a reached-targets list: `"1.2, 1.5"` or `"None"`.
pub fn render_targets(targets: &[f64]) -> String {
    if targets.is_empty() {
        return NO_TARGETS.to_string();
    }
    targets
        .iter()
        .map(|t| format_threshold(*t))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Inverse of [`render_targets`].
pub fn parse_targets(text: &str) -> Result<Vec<f64>, String> {
    let text = text.trim();
    if text.is_empty() || text == NO_TARGETS {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|e| format!("invalid target '{part}': {e}"))
        })
        .collect()
}
