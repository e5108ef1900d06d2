//! Time codec - one numeric axis for every kind of time literal
//!
//! Geological ages ("4.54 Ga"), historical years ("500 BCE"), plain years
//! ("1760"), ISO dates and forecasts ("2045") all map onto signed years
//! relative to year zero. Negative values lie in the past before the common
//! era; large magnitudes are expressed in Ma/Ga when formatted.

use chrono::{DateTime, Datelike, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::WorldModel;

/// Year used when a literal is missing or cannot be read
pub const DEFAULT_YEAR: f64 = 2024.0;

pub const GIGA_YEARS: f64 = 1_000_000_000.0;
pub const MEGA_YEARS: f64 = 1_000_000.0;

/// Formation of the Earth, the earliest point of every timeline
pub const DEEP_PAST: f64 = -4_540_000_000.0;
/// Latest point of every timeline
pub const FAR_FUTURE: f64 = 5_000_000_000.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeParseError {
    #[error("empty time literal")]
    Empty,
    #[error("unrecognized time literal: {0}")]
    Unrecognized(String),
}

#[derive(Clone, Copy)]
enum Suffix {
    BeforeCommonEra,
    CommonEra,
    Scale(f64),
}

// Longest first so "BCE" is not read as "CE"
const SUFFIXES: &[(&str, Suffix)] = &[
    ("BCE", Suffix::BeforeCommonEra),
    ("BC", Suffix::BeforeCommonEra),
    ("AD", Suffix::CommonEra),
    ("CE", Suffix::CommonEra),
    ("GA", Suffix::Scale(GIGA_YEARS)),
    ("MA", Suffix::Scale(MEGA_YEARS)),
    ("M", Suffix::Scale(MEGA_YEARS)),
];

/// Parse a time literal into signed years, surfacing failures
pub fn try_parse(literal: &str) -> Result<f64, TimeParseError> {
    let clean: String = literal
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if clean.is_empty() {
        return Err(TimeParseError::Empty);
    }

    if let Some(years) = parse_calendar(&clean) {
        return Ok(years);
    }

    let mut body = clean.strip_prefix("AD").unwrap_or(clean.as_str());
    let mut scale = 1.0;
    let mut before_common_era = false;
    let mut era_seen = false;
    let mut scale_seen = false;

    'strip: loop {
        for (text, suffix) in SUFFIXES {
            let Some(rest) = body.strip_suffix(*text) else {
                continue;
            };
            match *suffix {
                Suffix::BeforeCommonEra | Suffix::CommonEra if !era_seen => {
                    era_seen = true;
                    before_common_era = matches!(suffix, Suffix::BeforeCommonEra);
                }
                Suffix::Scale(factor) if !scale_seen => {
                    scale_seen = true;
                    scale = factor;
                }
                _ => continue,
            }
            body = rest;
            continue 'strip;
        }
        break;
    }

    let value: f64 = body
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| TimeParseError::Unrecognized(literal.trim().to_string()))?;

    let years = value * scale;
    Ok(if before_common_era { -years.abs() } else { years })
}

/// Parse a time literal, falling back to [`DEFAULT_YEAR`]
pub fn parse(literal: &str) -> f64 {
    try_parse(literal).unwrap_or(DEFAULT_YEAR)
}

/// ISO dates and RFC 3339 instants as fractional years
fn parse_calendar(clean: &str) -> Option<f64> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(clean) {
        let seconds = instant.num_seconds_from_midnight() as f64;
        return Some(fractional_year(instant.year(), instant.ordinal0(), seconds));
    }
    NaiveDate::parse_from_str(clean, "%Y-%m-%d")
        .ok()
        .map(|date| fractional_year(date.year(), date.ordinal0(), 0.0))
}

fn fractional_year(year: i32, ordinal0: u32, seconds_of_day: f64) -> f64 {
    let leap = NaiveDate::from_ymd_opt(year, 2, 29).is_some();
    let days_in_year = if leap { 366.0 } else { 365.0 };
    year as f64 + (ordinal0 as f64 + seconds_of_day / 86_400.0) / days_in_year
}

/// Compact label: "4.54 Ga", "66.0 Ma", "500 BCE", "1760 AD"
pub fn format_short(years: f64) -> String {
    let magnitude = years.abs();
    if magnitude >= GIGA_YEARS {
        format!("{:.2} Ga", magnitude / GIGA_YEARS)
    } else if magnitude >= MEGA_YEARS {
        format!("{:.1} Ma", magnitude / MEGA_YEARS)
    } else {
        format_calendar_year(years)
    }
}

/// Spelled-out label: "4.54 Billion Years Ago", "1.0 Million Years Hence"
pub fn format_long(years: f64) -> String {
    let magnitude = years.abs();
    let tense = if years < 0.0 { "Ago" } else { "Hence" };
    if magnitude >= GIGA_YEARS {
        format!("{:.2} Billion Years {}", magnitude / GIGA_YEARS, tense)
    } else if magnitude >= MEGA_YEARS {
        format!("{:.1} Million Years {}", magnitude / MEGA_YEARS, tense)
    } else {
        format_calendar_year(years)
    }
}

fn format_calendar_year(years: f64) -> String {
    let rounded = years.round();
    if rounded < 0.0 {
        format!("{} BCE", -rounded as i64)
    } else {
        format!("{} AD", rounded as i64)
    }
}

/// The span a timeline scrubber covers for a model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub min: f64,
    pub max: f64,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            min: DEEP_PAST,
            max: FAR_FUTURE,
        }
    }
}

impl TimeRange {
    /// Bounds over every dated entity and event, never narrower than
    /// [`DEEP_PAST`]..[`FAR_FUTURE`]
    pub fn for_model(model: &WorldModel) -> Self {
        let entity_times = model.entities.iter().filter_map(|e| e.valid_time.as_deref());
        let event_times = model.events.iter().filter_map(|e| e.time_interval.anchor());

        entity_times
            .chain(event_times)
            .map(parse)
            .fold(Self::default(), |range, t| Self {
                min: range.min.min(t),
                max: range.max.max(t),
            })
    }

    pub fn clamp(&self, years: f64) -> f64 {
        years.clamp(self.min, self.max)
    }
}

/// Resolve a manually entered time against a timeline's bounds
pub fn seek(literal: &str, range: &TimeRange) -> f64 {
    range.clamp(parse(literal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Entity, TimeInterval, WorldEvent};

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = expected.abs().max(1.0) * 1e-9;
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_parse_plain_years() {
        assert_eq!(try_parse("1760"), Ok(1760.0));
        assert_eq!(try_parse(" 2024 "), Ok(2024.0));
        assert_eq!(try_parse("2045 AD"), Ok(2045.0));
        assert_eq!(try_parse("AD 1066"), Ok(1066.0));
        assert_eq!(try_parse("-300"), Ok(-300.0));
    }

    #[test]
    fn test_parse_geological_scales() {
        assert_close(parse("-4.54Ga"), -4_540_000_000.0);
        assert_close(parse("4.54 ga"), 4_540_000_000.0);
        assert_close(parse("-66 Ma"), -66_000_000.0);
        assert_close(parse("250M"), 250_000_000.0);
    }

    #[test]
    fn test_parse_before_common_era_forces_negative() {
        assert_eq!(parse("500 BCE"), -500.0);
        assert_eq!(parse("44bc"), -44.0);
        assert_eq!(parse("-44 BC"), -44.0);
        assert_close(parse("1.2 Ma BCE"), -1_200_000.0);
    }

    #[test]
    fn test_parse_iso_dates() {
        assert_close(parse("2023-01-01"), 2023.0);
        let instant = parse("2023-11-12T09:30:00Z");
        assert!(instant > 2023.8 && instant < 2023.9, "got {instant}");
    }

    #[test]
    fn test_unparseable_falls_back_to_default_year() {
        assert_eq!(try_parse(""), Err(TimeParseError::Empty));
        assert!(matches!(try_parse("the dawn of time"), Err(TimeParseError::Unrecognized(_))));
        assert!(try_parse("NaN").is_err());
        assert_eq!(parse(""), DEFAULT_YEAR);
        assert_eq!(parse("   "), DEFAULT_YEAR);
        assert_eq!(parse("sometime later"), DEFAULT_YEAR);
    }

    #[test]
    fn test_format_short_units() {
        assert_eq!(format_short(-4_540_000_000.0), "4.54 Ga");
        assert_eq!(format_short(1_000_000_000.0), "1.00 Ga");
        assert_eq!(format_short(999_999_999.0), "1000.0 Ma");
        assert_eq!(format_short(-66_000_000.0), "66.0 Ma");
        assert_eq!(format_short(-500.0), "500 BCE");
        assert_eq!(format_short(1760.0), "1760 AD");
        assert_eq!(format_short(2023.86), "2024 AD");
    }

    #[test]
    fn test_format_long_tense() {
        assert_eq!(format_long(-4_540_000_000.0), "4.54 Billion Years Ago");
        assert_eq!(format_long(2_000_000.0), "2.0 Million Years Hence");
        assert_eq!(format_long(-500.0), "500 BCE");
        assert_eq!(format_long(2024.0), "2024 AD");
    }

    #[test]
    fn test_format_then_parse_preserves_magnitude() {
        for literal in ["-4.54Ga", "1.5 Ga", "-66Ma", "250 Ma", "500 BCE", "1760", "2045"] {
            let years = parse(literal);
            let reparsed = parse(&format_short(years));
            let tolerance = if years.abs() >= GIGA_YEARS {
                0.005 * GIGA_YEARS
            } else if years.abs() >= MEGA_YEARS {
                0.05 * MEGA_YEARS
            } else {
                0.5
            };
            assert!(
                (reparsed.abs() - years.abs()).abs() <= tolerance,
                "{literal}: {years} -> {reparsed}"
            );
        }
    }

    #[test]
    fn test_parse_is_monotonic_across_units() {
        let ordered = ["-4.54Ga", "-66Ma", "500 BCE", "1760", "2023-11-12", "2045", "1 Ga"];
        let values: Vec<f64> = ordered.iter().map(|l| parse(l)).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]), "{values:?}");
    }

    #[test]
    fn test_time_range_for_model() {
        let empty = TimeRange::for_model(&WorldModel::new());
        assert_eq!(empty, TimeRange::default());

        let mut model = WorldModel::new();
        model.entities.push(Entity::new("old", "Landmass", "Ur").with_valid_time("-4.6Ga"));
        model.events.push(WorldEvent::new("far", "Forecast", TimeInterval::instant("6 Ga")));
        let range = TimeRange::for_model(&model);
        assert_close(range.min, -4_600_000_000.0);
        assert_close(range.max, 6_000_000_000.0);
    }

    #[test]
    fn test_seek_clamps_to_range() {
        let range = TimeRange::default();
        assert_eq!(seek("1760", &range), 1760.0);
        assert_eq!(seek("-10 Ga", &range), DEEP_PAST);
        assert_eq!(seek("9 Ga", &range), FAR_FUTURE);
    }
}
