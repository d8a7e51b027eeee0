//! Timestamp normalization
//!
//! Timestamps reported by the deployment engine carry sub-second precision,
//! while anything read back from persisted status has been through an
//! RFC 3339 seconds-precision text round trip. Every timestamp stored into a
//! status goes through [`normalize`] so both sides compare equal.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Round-trip a timestamp through RFC 3339 text at seconds precision
pub fn normalize(t: DateTime<Utc>) -> DateTime<Utc> {
    let text = t.to_rfc3339_opts(SecondsFormat::Secs, true);
    DateTime::parse_from_rfc3339(&text)
        .map(|parsed| parsed.with_timezone(&Utc))
        .unwrap_or_else(|_| t.trunc_subsecs(0))
}

/// [`normalize`] lifted over an optional timestamp
pub fn normalize_opt(t: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    t.map(normalize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Timelike};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 17, 45, 12).unwrap()
    }

    #[test]
    fn test_drops_subsecond_precision() {
        let t = base() + Duration::nanoseconds(987_654_321);
        let normalized = normalize(t);
        assert_eq!(normalized, base());
        assert_eq!(normalized.nanosecond(), 0);
    }

    #[test]
    fn test_idempotent() {
        let t = base() + Duration::microseconds(42);
        let once = normalize(t);
        assert_eq!(normalize(once), once);
    }

    #[test]
    fn test_equal_at_second_granularity_stay_equal() {
        let a = base() + Duration::milliseconds(1);
        let b = base() + Duration::milliseconds(999);
        assert_ne!(a, b);
        assert_eq!(normalize(a), normalize(b));
    }

    #[test]
    fn test_matches_persisted_round_trip() {
        let t = base() + Duration::milliseconds(250);
        let persisted: DateTime<Utc> =
            serde_json::from_value(serde_json::json!("2024-03-09T17:45:12Z")).unwrap();
        assert_eq!(normalize(t), persisted);
    }

    #[test]
    fn test_normalize_opt() {
        assert_eq!(normalize_opt(None), None);
        assert_eq!(
            normalize_opt(Some(base() + Duration::milliseconds(5))),
            Some(base())
        );
    }
}
