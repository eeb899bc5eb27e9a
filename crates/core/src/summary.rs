//! Ward status aggregation and the public dashboard summary.

use serde::Serialize;

use crate::report::EffectiveScore;
use crate::status::{classify_readings, StatusLabel};
use crate::ward::{baseline, WardBaseline, WARD_NAMES};

/// Where a ward's displayed status comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    /// Derived from scored citizen reports.
    Reports,
    /// Derived from the ward's baseline fixture readings.
    Baseline,
    /// No data at all.
    Unknown,
}

/// Aggregated status of one ward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardStatus {
    pub ward: &'static str,
    pub status: Option<StatusLabel>,
    pub source: StatusSource,
    pub baseline: Option<WardBaseline>,
    pub report_count: usize,
    pub mean_score: Option<f64>,
    pub mean_ph: Option<f64>,
    pub mean_turbidity: Option<f64>,
}

impl WardStatus {
    /// Current pH reading: report mean if any, else baseline.
    pub fn current_ph(&self) -> Option<f64> {
        self.mean_ph.or(self.baseline.map(|b| b.ph))
    }

    /// Current turbidity reading: report mean if any, else baseline.
    pub fn current_turbidity(&self) -> Option<f64> {
        self.mean_turbidity.or(self.baseline.map(|b| b.turbidity))
    }
}

/// Aggregate scored reports into one status per registered ward.
///
/// `scores` pairs a canonical ward name with the effective score of one
/// non-rejected report. Wards are returned in registry order.
pub fn aggregate_wards(scores: &[(&str, EffectiveScore)]) -> Vec<WardStatus> {
    WARD_NAMES
        .iter()
        .map(|&ward| {
            let in_ward: Vec<&EffectiveScore> = scores
                .iter()
                .filter(|(w, _)| *w == ward)
                .map(|(_, s)| s)
                .collect();
            ward_status(ward, &in_ward)
        })
        .collect()
}

fn ward_status(ward: &'static str, scores: &[&EffectiveScore]) -> WardStatus {
    let baseline = baseline(ward).copied();
    let mean_score = mean(scores.iter().map(|s| s.cleanliness_score));
    let mean_ph = mean(scores.iter().filter_map(|s| s.ph));
    let mean_turbidity = mean(scores.iter().filter_map(|s| s.turbidity));

    let (status, source) = match (mean_score, &baseline) {
        (Some(score), _) => (Some(StatusLabel::from_score(score)), StatusSource::Reports),
        (None, Some(b)) => (Some(classify_readings(b.ph, b.turbidity)), StatusSource::Baseline),
        (None, None) => (None, StatusSource::Unknown),
    };

    WardStatus {
        ward,
        status,
        source,
        baseline,
        report_count: scores.len(),
        mean_score: mean_score.map(round2),
        mean_ph: mean_ph.map(round2),
        mean_turbidity: mean_turbidity.map(round2),
    }
}

/// Headline numbers for the public dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicSummary {
    pub avg_ph: Option<f64>,
    pub avg_turbidity: Option<f64>,
    pub active_alerts: usize,
    /// Mean AI cleanliness score as a percentage (0-100).
    pub ai_cleanliness_score: Option<f64>,
}

/// Build the public summary from ward statuses, the active alert count, and
/// the scores of all succeeded AI assessments.
pub fn public_summary(
    wards: &[WardStatus],
    active_alerts: usize,
    ai_scores: &[f64],
) -> PublicSummary {
    PublicSummary {
        avg_ph: mean(wards.iter().filter_map(WardStatus::current_ph)).map(round2),
        avg_turbidity: mean(wards.iter().filter_map(WardStatus::current_turbidity)).map(round2),
        active_alerts,
        ai_cleanliness_score: mean(ai_scores.iter().copied()).map(|m| (m * 1000.0).round() / 10.0),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
