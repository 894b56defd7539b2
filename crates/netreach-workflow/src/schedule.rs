//! Active-hours gate.
//!
//! When enabled, runs only start inside the configured local-time window,
//! optionally weekdays only. Pure functions over an explicit `now` so the
//! boundaries are testable without a clock.

use chrono::{DateTime, Datelike, Days, Local, NaiveTime, Timelike, Weekday};

use netreach_core::config::ScheduleConfig;

/// Whether `now` falls inside the configured window.
pub fn is_active_hours(config: &ScheduleConfig, now: DateTime<Local>) -> bool {
    if config.weekdays_only {
        let weekday = now.weekday();
        if weekday == Weekday::Sat || weekday == Weekday::Sun {
            tracing::debug!("outside active hours: weekend");
            return false;
        }
    }

    let hour = now.hour();
    if hour < config.start_hour || hour >= config.end_hour {
        tracing::debug!(
            "outside active hours: hour {hour} not in {}..{}",
            config.start_hour,
            config.end_hour
        );
        return false;
    }

    true
}

/// The next instant the window opens. Returns `now` unchanged when
/// already inside the window.
pub fn next_active_time(config: &ScheduleConfig, now: DateTime<Local>) -> DateTime<Local> {
    if is_active_hours(config, now) {
        return now;
    }

    let start = NaiveTime::from_hms_opt(config.start_hour, 0, 0)
        .unwrap_or(NaiveTime::MIN);
    let mut next = now
        .with_time(start)
        .earliest()
        .unwrap_or(now);

    // Start hour already passed today
    if now.hour() >= config.end_hour || (now.hour() >= config.start_hour && next <= now) {
        next = next + Days::new(1);
    }

    if config.weekdays_only {
        loop {
            match next.weekday() {
                Weekday::Sat => next = next + Days::new(2),
                Weekday::Sun => next = next + Days::new(1),
                _ => break,
            }
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> ScheduleConfig {
        ScheduleConfig {
            enabled: true,
            start_hour: 9,
            end_hour: 17,
            weekdays_only: true,
        }
    }

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    #[test]
    fn test_weekday_business_hours_are_active() {
        // 2026-08-05 is a Wednesday
        assert!(is_active_hours(&config(), local(2026, 8, 5, 9)));
        assert!(is_active_hours(&config(), local(2026, 8, 5, 16)));
    }

    #[test]
    fn test_window_boundaries() {
        // Before start hour and at/after end hour are inactive
        assert!(!is_active_hours(&config(), local(2026, 8, 5, 8)));
        assert!(!is_active_hours(&config(), local(2026, 8, 5, 17)));
        assert!(!is_active_hours(&config(), local(2026, 8, 5, 22)));
    }

    #[test]
    fn test_weekend_is_inactive() {
        // 2026-08-08 is a Saturday
        assert!(!is_active_hours(&config(), local(2026, 8, 8, 11)));
        // Same hour is fine when weekends are allowed
        let mut anytime = config();
        anytime.weekdays_only = false;
        assert!(is_active_hours(&anytime, local(2026, 8, 8, 11)));
    }

    #[test]
    fn test_next_active_time_same_day() {
        // Early Wednesday morning → 09:00 the same day
        let next = next_active_time(&config(), local(2026, 8, 5, 6));
        assert_eq!(next.day(), 5);
        assert_eq!(next.hour(), 9);
    }

    #[test]
    fn test_next_active_time_rolls_to_next_day() {
        // Wednesday evening → Thursday 09:00
        let next = next_active_time(&config(), local(2026, 8, 5, 20));
        assert_eq!(next.day(), 6);
        assert_eq!(next.hour(), 9);
    }

    #[test]
    fn test_next_active_time_skips_weekend() {
        // Friday 2026-08-07 evening → Monday 2026-08-10 09:00
        let next = next_active_time(&config(), local(2026, 8, 7, 19));
        assert_eq!(next.weekday(), Weekday::Mon);
        assert_eq!(next.day(), 10);
        assert_eq!(next.hour(), 9);
    }

    #[test]
    fn test_next_active_time_inside_window_is_now() {
        let now = local(2026, 8, 5, 10);
        assert_eq!(next_active_time(&config(), now), now);
    }
}
