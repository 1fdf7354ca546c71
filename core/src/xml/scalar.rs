//! Locale-independent conversions between wire text and typed scalars.

use chrono::{DateTime, Datelike, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Outcome of reading a scalar that the enclosing element may require.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Value(T),
    Missing,
    Invalid(String),
}

impl<T> Parsed<T> {
    pub fn from_raw(raw: Option<String>, parse: fn(&str) -> Option<T>) -> Self {
        match raw {
            None => Parsed::Missing,
            Some(text) => match parse(&text) {
                Some(value) => Parsed::Value(value),
                None => Parsed::Invalid(text),
            },
        }
    }

    pub fn value(self) -> Option<T> {
        match self {
            Parsed::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Parsed::Value(_) => "ok".to_string(),
            Parsed::Missing => "missing".to_string(),
            Parsed::Invalid(text) => format!("invalid value `{text}`"),
        }
    }
}

impl<T: Default> Parsed<T> {
    /// The parsed value or the type's default, paired with the success flag.
    pub fn or_default(self) -> (T, bool) {
        match self {
            Parsed::Value(value) => (value, true),
            _ => (T::default(), false),
        }
    }
}

pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim();
    match text {
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ if text.is_empty()
            || text.contains(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E') =>
        {
            None
        }
        _ => text.parse().ok(),
    }
}

pub fn parse_unsigned(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

pub fn parse_int(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}

pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Accepts RFC 3339 timestamps and, lacking an offset, treats the value as UTC.
pub fn parse_utc(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        value.to_string()
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// `None` for years the four-digit `xs:dateTime` form cannot hold.
pub fn format_utc(time: &DateTime<Utc>) -> Option<String> {
    (0..=9999)
        .contains(&time.year())
        .then(|| time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_use_invariant_format() {
        assert_eq!(parse_float("0.9"), Some(0.9));
        assert_eq!(parse_float(" -12.5 "), Some(-12.5));
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_float("INF"), Some(f64::INFINITY));
        assert_eq!(parse_float("0,9"), None);
        assert_eq!(parse_float("1,000.5"), None);
        assert_eq!(parse_float("infinity"), None);
        assert_eq!(parse_float(""), None);
        assert_eq!(format_float(10.0), "10");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(f64::NEG_INFINITY), "-INF");
    }

    #[test]
    fn booleans_accept_xsd_forms() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("TRUE"), None);
        assert_eq!(format_bool(false), "false");
    }

    #[test]
    fn timestamps_round_trip() {
        let time = parse_utc("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(format_utc(&time).as_deref(), Some("2024-01-01T00:00:00Z"));

        let fractional = parse_utc("2024-03-05T10:11:12.345Z").unwrap();
        assert_eq!(format_utc(&fractional).as_deref(), Some("2024-03-05T10:11:12.345Z"));

        let offset = parse_utc("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(offset, time);

        assert_eq!(parse_utc("2024-01-01T00:00:00"), Some(time));
        assert_eq!(parse_utc("yesterday"), None);

        let far = Utc.with_ymd_and_hms(12000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_utc(&far), None);
        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(parse_utc(&format_utc(&last).unwrap()), Some(last));
    }

    #[test]
    fn parsed_reports_default_and_flag() {
        assert_eq!(Parsed::from_raw(Some("4".into()), parse_unsigned).or_default(), (4, true));
        assert_eq!(Parsed::from_raw(Some("-4".into()), parse_unsigned).or_default(), (0, false));
        assert_eq!(Parsed::<u32>::from_raw(None, parse_unsigned), Parsed::Missing);
    }
}
