use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

/// Weekly and remedial activities are assigned to Monday-aligned weeks.
pub fn is_week_start(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

/// Submission at exactly `started_at + limit` is still accepted.
pub fn within_time_limit(
    started_at: DateTime<Utc>,
    limit_seconds: i32,
    now: DateTime<Utc>,
) -> bool {
    now <= started_at + Duration::seconds(limit_seconds as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn monday_is_week_start() {
        assert!(is_week_start(NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()));
        assert!(!is_week_start(NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()));
    }

    #[test]
    fn limit_boundary_is_inclusive() {
        let started = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        assert!(within_time_limit(started, 1800, started + Duration::seconds(1800)));
        assert!(!within_time_limit(started, 1800, started + Duration::seconds(1801)));
    }
}
