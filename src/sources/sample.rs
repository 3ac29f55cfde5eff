//! Generated sample payload, the terminal origin of the fallback chain

use chrono::{DateTime, TimeZone};
use serde_json::json;

use crate::config::constants::TIMESTAMP_FORMAT;

/// Build the placeholder report payload for `now`.
///
/// Output depends only on the timestamp.
pub fn generate_sample<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let sample = json!({
        "timestamp": now.format(TIMESTAMP_FORMAT).to_string(),
        "message": "This is a test message",
        "data": {
            "temperature": 25.5,
            "humidity": 60,
            "status": "normal",
            "cpu_usage": "45%",
            "memory_usage": "67%"
        },
        "alerts": []
    });

    serde_json::to_string_pretty(&sample).unwrap_or_else(|_| sample.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Value;

    #[test]
    fn test_sample_has_expected_fields() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let parsed: Value = serde_json::from_str(&generate_sample(&now)).unwrap();

        assert_eq!(parsed["timestamp"], "2024-03-01 12:30:00");
        assert_eq!(parsed["message"], "This is a test message");
        assert_eq!(parsed["data"]["status"], "normal");
        assert!(parsed["alerts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_sample_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(generate_sample(&now), generate_sample(&now));
    }
}
