//! Deterministic offline backend.
//!
//! Scores a photo from its pixels alone: bright, untinted water scores high;
//! dark or yellow-brown water scores low. Digests are plain tallies of the
//! reports' labels. Useful for development and tests where no model
//! credentials are available.

use async_trait::async_trait;
use image::imageops::FilterType;
use jalsuraksha_core::assessment::{AssessmentRequest, AssessmentResult};
use jalsuraksha_core::digest::{DigestRequest, ReportDigest};
use jalsuraksha_core::encoding::PhotoPayload;
use jalsuraksha_core::error::AssessmentError;
use jalsuraksha_core::status::StatusLabel;

use crate::backend::AssessmentBackend;

/// Longest edge of the thumbnail the heuristic runs on.
const THUMBNAIL_EDGE: u32 = 64;

/// Maximum turbidity the heuristic will report, in NTU.
const MAX_TURBIDITY_NTU: f64 = 12.0;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalMock;

impl LocalMock {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssessmentBackend for LocalMock {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn assess(&self, request: &AssessmentRequest) -> Result<AssessmentResult, AssessmentError> {
        let photo = request.photo().clone();
        tokio::task::spawn_blocking(move || score_photo(&photo))
            .await
            .map_err(|e| AssessmentError::unavailable(format!("mock scorer panicked: {e}")))?
    }

    async fn summarize(&self, request: &DigestRequest) -> Result<ReportDigest, AssessmentError> {
        Ok(ReportDigest {
            summary: tally_summary(request),
        })
    }
}

/// "N recent reports across M wards: ..." followed by the wards with unsafe
/// readings, in order of first mention.
pub fn tally_summary(request: &DigestRequest) -> String {
    let entries = request.entries();
    let mut wards: Vec<&str> = Vec::new();
    let mut unsafe_wards: Vec<&str> = Vec::new();
    let mut counts = [0usize; 3];
    let mut unscored = 0;

    for entry in entries {
        if !wards.contains(&entry.ward.as_str()) {
            wards.push(&entry.ward);
        }
        match entry.status_label {
            Some(StatusLabel::Safe) => counts[0] += 1,
            Some(StatusLabel::Moderate) => counts[1] += 1,
            Some(StatusLabel::Unsafe) => {
                counts[2] += 1;
                if !unsafe_wards.contains(&entry.ward.as_str()) {
                    unsafe_wards.push(&entry.ward);
                }
            }
            None => unscored += 1,
        }
    }

    let plural = |n: usize, word: &str| if n == 1 { format!("{n} {word}") } else { format!("{n} {word}s") };
    let mut summary = format!(
        "{} across {}: {} Safe, {} Moderate, {} Unsafe, {} not assessed.",
        plural(entries.len(), "recent report"),
        plural(wards.len(), "ward"),
        counts[0],
        counts[1],
        counts[2],
        unscored
    );
    if !unsafe_wards.is_empty() {
        summary.push_str(&format!(" Unsafe water reported in {}.", unsafe_wards.join(", ")));
    }
    summary
}

/// Mean luminance and yellow-brown tint of a photo, both in `[0, 1]`.
pub fn color_stats(photo: &PhotoPayload) -> Result<(f64, f64), AssessmentError> {
    let img = image::load_from_memory_with_format(photo.bytes(), photo.format().image_format())
        .map_err(|e| AssessmentError::Encoding(format!("photo could not be decoded: {e}")))?;
    let rgb = img
        .resize(THUMBNAIL_EDGE, THUMBNAIL_EDGE, FilterType::Triangle)
        .to_rgb8();

    let mut luminance = 0.0;
    let mut tint = 0.0;
    for pixel in rgb.pixels() {
        let [r, g, b] = pixel.0.map(|c| f64::from(c) / 255.0);
        luminance += 0.299 * r + 0.587 * g + 0.114 * b;
        tint += ((r + g) / 2.0 - b).max(0.0);
    }
    let count = f64::from(rgb.width() * rgb.height()).max(1.0);
    Ok((luminance / count, tint / count))
}

fn score_photo(photo: &PhotoPayload) -> Result<AssessmentResult, AssessmentError> {
    let (luminance, tint) = color_stats(photo)?;

    let cleanliness_score = round2((luminance * (1.0 - 1.5 * tint)).clamp(0.0, 1.0));
    let estimated_turbidity = round2((1.0 - cleanliness_score) * MAX_TURBIDITY_NTU);
    let estimated_ph = round2((7.0 - 3.0 * tint).clamp(0.0, 14.0));

    Ok(AssessmentResult {
        cleanliness_score,
        status_label: StatusLabel::from_score(cleanliness_score),
        estimated_ph,
        estimated_turbidity,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
