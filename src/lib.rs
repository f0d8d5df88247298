use log::info;
use serde::{Deserialize, Serialize};

pub mod api;

/// Domain bounds taken from the backend's validation schema.
pub mod limits {
    pub const MIN_USER_BID_JPY: u64 = 100_000;
    pub const MAX_USER_BID_JPY: u64 = 20_000_000;
    pub const MIN_TARGET_WIN_PROB: f64 = 0.5;
    pub const MAX_TARGET_WIN_PROB: f64 = 0.9;
}

/// One auction lot as listed in the featured catalog and sent to the
/// prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    pub year: u32,
    pub mileage_km: u32,
    pub engine_cc: u32,
    pub auction_grade: f64,
}

/// Load the featured-vehicle catalog from embedded CSV content.
///
/// The first row is a header naming the `Vehicle` fields; malformed rows
/// abort the load rather than being skipped, since the catalog ships with
/// the binary and a bad row is a packaging mistake.
pub fn read_vehicles_from_csv_string(
    csv_content: &str,
) -> Result<Vec<Vehicle>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_reader(csv_content.as_bytes());
    let mut vehicles = Vec::new();
    for row in reader.deserialize() {
        let vehicle: Vehicle = row?;
        vehicles.push(vehicle);
    }
    info!("loaded {} featured vehicles from catalog", vehicles.len());
    Ok(vehicles)
}

/// Scale factor applied to a point estimate when the backend returns no
/// quantile spread. Maps a target win probability in [0.5, 0.9] linearly
/// onto a multiplier in [0.9, 1.1]; probabilities outside the range clamp.
pub fn heuristic_scale(target_win_prob: f64) -> f64 {
    let clamped =
        target_win_prob.clamp(limits::MIN_TARGET_WIN_PROB, limits::MAX_TARGET_WIN_PROB);
    let t = (clamped - limits::MIN_TARGET_WIN_PROB)
        / (limits::MAX_TARGET_WIN_PROB - limits::MIN_TARGET_WIN_PROB);
    0.9 + 0.2 * t
}

/// Client-side fallback recommendation: predicted bid scaled by
/// [`heuristic_scale`], rounded to whole yen.
pub fn heuristic_recommended_bid(predicted_jpy: u64, target_win_prob: f64) -> u64 {
    (predicted_jpy as f64 * heuristic_scale(target_win_prob)).round() as u64
}

/// Pick the bid to suggest for an analysis result.
///
/// When the backend supplies the full q20/q50/q80 spread its own
/// recommendation is trusted verbatim; otherwise the local heuristic is
/// applied to the best available point estimate (the server recommendation
/// if it exists, the predicted winning bid if not).
pub fn resolve_recommended_bid(analysis: &api::PredictResponse, target_win_prob: f64) -> u64 {
    let base = analysis
        .recommended_bid_jpy
        .unwrap_or(analysis.predicted_winning_bid_jpy);
    if analysis.has_quantiles() {
        base
    } else {
        heuristic_recommended_bid(base, target_win_prob)
    }
}

/// Group digits in threes: 5000000 -> "5,000,000".
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_jpy(amount: u64) -> String {
    format!("¥{}", group_thousands(amount))
}

pub fn format_bdt(amount: u64) -> String {
    format!("৳{}", group_thousands(amount))
}
