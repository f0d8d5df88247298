//! Input parsing and slider mapping helpers for the UI.

use jdm_pulse::limits::{MAX_USER_BID_JPY, MIN_USER_BID_JPY};
use once_cell::sync::Lazy;
use regex::Regex;

// Accepts an optional yen sign and digit grouping: "5000000", "5,000,000",
// "¥5,000,000", "5_000_000".
static BID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^¥?\s*([0-9][0-9,_]*)$").unwrap());

/// Bid validation error types
#[derive(Debug, PartialEq)]
pub enum BidParseError {
    Empty,
    NotANumber,
    BelowMinimum(u64),
    AboveMaximum(u64),
}

impl std::fmt::Display for BidParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BidParseError::Empty => write!(f, "Bid cannot be empty"),
            BidParseError::NotANumber => write!(f, "Bid must be a whole yen amount"),
            BidParseError::BelowMinimum(bid) => write!(
                f,
                "Bid {} is below the auction minimum of {}",
                bid, MIN_USER_BID_JPY
            ),
            BidParseError::AboveMaximum(bid) => write!(
                f,
                "Bid {} exceeds the auction maximum of {}",
                bid, MAX_USER_BID_JPY
            ),
        }
    }
}

impl std::error::Error for BidParseError {}

/// Parse a JPY bid as typed into the bid field.
///
/// Accepts plain digits with optional comma/underscore grouping and an
/// optional leading yen sign, and enforces the auction bid limits.
pub fn parse_bid_input(input: &str) -> Result<u64, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BidParseError::Empty.to_string());
    }

    let captures = BID_REGEX
        .captures(trimmed)
        .ok_or_else(|| BidParseError::NotANumber.to_string())?;
    let digits: String = captures[1].chars().filter(|c| c.is_ascii_digit()).collect();
    let bid: u64 = digits
        .parse()
        .map_err(|_| BidParseError::NotANumber.to_string())?;

    if bid < MIN_USER_BID_JPY {
        Err(BidParseError::BelowMinimum(bid).to_string())
    } else if bid > MAX_USER_BID_JPY {
        Err(BidParseError::AboveMaximum(bid).to_string())
    } else {
        Ok(bid)
    }
}

/// Slider positions are whole percents; panel state keeps the probability as
/// a fraction.
pub fn win_prob_from_percent(percent: u32) -> f64 {
    percent as f64 / 100.0
}

pub fn win_prob_to_percent(prob: f64) -> u32 {
    (prob * 100.0).round() as u32
}
