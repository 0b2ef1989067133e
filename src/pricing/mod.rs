use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Computed customer price for a cleaning job.
///
/// `price` is the charged amount in kr. `price_range` is the advisory
/// display range some bands carry; it is informational only and never
/// affects the charged amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
}

struct Band {
    /// Inclusive upper bound in m²
    max: u64,
    price: i64,
    range: Option<&'static str>,
}

/// Fixed-price bands for 0–100 m². The range strings are business copy and
/// must be preserved verbatim.
const FIXED_BANDS: &[Band] = &[
    Band { max: 29, price: 1575, range: None },
    Band { max: 39, price: 1725, range: Some("1675-1775") },
    Band { max: 49, price: 1825, range: Some("1775-1875") },
    Band { max: 59, price: 1925, range: Some("1875-1975") },
    Band { max: 69, price: 2125, range: Some("2075-2175") },
    Band { max: 79, price: 2325, range: Some("2275-2375") },
    Band { max: 89, price: 2450, range: Some("2400-2500") },
    Band { max: 100, price: 2900, range: Some("2800-3000") },
];

/// Price for an area in m². Returns None when the area is absent, negative
/// or not a finite number. The area is rounded to the nearest integer
/// before banding.
pub fn price_for_area(area: Option<f64>) -> Option<PriceQuote> {
    let area = area?;
    if !area.is_finite() || area < 0.0 {
        return None;
    }
    let rounded = area.round() as u64;

    if rounded <= 100 {
        let band = FIXED_BANDS.iter().find(|b| rounded <= b.max)?;
        return Some(PriceQuote {
            price: band.price,
            price_range: band.range.map(str::to_string),
        });
    }

    let price = if rounded <= 200 {
        // 3000 + 200 kr per started 10 m² above 100
        let over = (rounded - 100) as i64;
        3000 + ((over + 9) / 10) * 200
    } else {
        5000 + (rounded as i64 - 200) * 30
    };

    Some(PriceQuote {
        price,
        price_range: None,
    })
}

/// Price from a raw JSON value: accepts numbers and numeric strings, the
/// two shapes area fields arrive in from the web forms.
pub fn price_from_value(value: &Value) -> Option<PriceQuote> {
    price_for_area(parse_area(value))
}

/// Parse an area out of a raw JSON value, if it holds one.
pub fn parse_area(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn price(area: f64) -> i64 {
        price_for_area(Some(area)).expect("price").price
    }

    #[test]
    fn test_exact_band_values() {
        let q = price_for_area(Some(25.0)).unwrap();
        assert_eq!(q.price, 1575);
        assert_eq!(q.price_range, None);

        let q = price_for_area(Some(35.0)).unwrap();
        assert_eq!(q.price, 1725);
        assert_eq!(q.price_range.as_deref(), Some("1675-1775"));

        let q = price_for_area(Some(45.0)).unwrap();
        assert_eq!(q.price, 1825);
        assert_eq!(q.price_range.as_deref(), Some("1775-1875"));

        assert_eq!(price(55.0), 1925);
        assert_eq!(price(65.0), 2125);
        assert_eq!(price(75.0), 2325);
        assert_eq!(price(85.0), 2450);
        assert_eq!(price(95.0), 2900);
    }

    #[test]
    fn test_proportional_bands() {
        // 3000 + ceil((area-100)/10) * 200
        assert_eq!(price(101.0), 3200);
        assert_eq!(price(110.0), 3200);
        assert_eq!(price(111.0), 3400);
        assert_eq!(price(150.0), 4000);
        assert_eq!(price(200.0), 5000);
        // 5000 + (area-200) * 30
        assert_eq!(price(201.0), 5030);
        assert_eq!(price(250.0), 6500);
    }

    #[test]
    fn test_band_boundaries_monotonic() {
        for (lo, hi) in [(29.0, 30.0), (39.0, 40.0), (100.0, 101.0), (200.0, 201.0)] {
            assert!(price(lo) <= price(hi), "price({}) > price({})", lo, hi);
        }
    }

    #[test]
    fn test_monotonic_over_full_domain() {
        let mut last = 0;
        for a in 0..400 {
            let p = price(a as f64);
            assert!(p >= last, "price regressed at {} m²", a);
            last = p;
        }
    }

    #[test]
    fn test_rounding_before_banding() {
        // 29.4 rounds down into the first band, 29.6 rounds up into the second
        assert_eq!(price(29.4), 1575);
        assert_eq!(price(29.6), 1725);
    }

    #[test]
    fn test_invalid_areas() {
        assert_eq!(price_for_area(None), None);
        assert_eq!(price_for_area(Some(-5.0)), None);
        assert_eq!(price_for_area(Some(f64::NAN)), None);
    }

    #[test]
    fn test_price_from_value() {
        assert_eq!(price_from_value(&json!(45)).unwrap().price, 1825);
        assert_eq!(price_from_value(&json!("45")).unwrap().price, 1825);
        assert_eq!(price_from_value(&json!(" 45 ")).unwrap().price, 1825);
        assert_eq!(price_from_value(&json!("abc")), None);
        assert_eq!(price_from_value(&json!(null)), None);
        assert_eq!(price_from_value(&json!(true)), None);
    }
}
