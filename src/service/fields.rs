//! Precedence tables for picking display fields out of the `details` blob.
//!
//! The submission forms store area and date information under different keys
//! per service. The ordering of these tables is a business decision; keep it
//! stable.

use serde_json::{Map, Value};

use crate::pricing::parse_area;

/// Area fields, tried in order: primary square-meter field, generic area,
/// then the service-specific variants.
pub const AREA_FIELD_PRECEDENCE: &[&str] = &[
    "squareMeters",
    "area",
    "constructionArea",
    "officeArea",
    "detailArea",
];

/// Date-bearing fields, tried in order: direct preferred date/time, then the
/// service-specific date fields. The `day`+`time` pair is the final fallback.
pub const DATE_FIELD_PRECEDENCE: &[&str] = &[
    "preferredDateTime",
    "movingDate",
    "moveOutDate",
    "windowDate",
    "constructionDate",
];

/// First parseable area value in precedence order.
pub fn area_from_details(details: &Map<String, Value>) -> Option<f64> {
    AREA_FIELD_PRECEDENCE
        .iter()
        .filter_map(|key| details.get(*key))
        .find_map(parse_area)
}

/// First non-empty date string in precedence order, falling back to a
/// `day`+`time` pair joined with a space.
pub fn date_from_details(details: &Map<String, Value>) -> Option<String> {
    for key in DATE_FIELD_PRECEDENCE {
        if let Some(s) = non_empty_string(details.get(*key)) {
            return Some(s);
        }
    }
    let day = non_empty_string(details.get("day"));
    let time = non_empty_string(details.get("time"));
    match (day, time) {
        (Some(day), Some(time)) => Some(format!("{} {}", day, time)),
        (Some(day), None) => Some(day),
        _ => None,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
