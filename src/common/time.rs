//! Time utilities for membership timestamps.

use chrono::{DateTime, Utc};

/// Current Unix timestamp in milliseconds (UTC).
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a Unix millisecond timestamp as RFC 3339 (UTC).
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .unwrap_or_default()
        .to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_returns_positive_value() {
        assert!(now_millis() > 0);
    }

    #[test]
    fn test_now_millis_is_monotonic_enough() {
        // given / when:
        let first = now_millis();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = now_millis();

        // then:
        assert!(second >= first);
    }

    #[test]
    fn test_timestamp_to_rfc3339_format() {
        // given: 2023-01-01 00:00:00 UTC in milliseconds
        let timestamp = 1_672_531_200_000;

        // when:
        let rendered = timestamp_to_rfc3339(timestamp);

        // then:
        assert!(rendered.starts_with("2023-01-01T00:00:00"));
        assert!(rendered.contains("+00:00"));
    }
}
