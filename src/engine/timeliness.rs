use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::SprintdeskError;
use crate::models::Daily;

pub const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inclusive time-of-day window for on-time dailies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DailyWindow {
    /// Parse `HH:MM` (or `HH:MM:SS`) bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self, SprintdeskError> {
        let start = parse_time(start)?;
        let end = parse_time(end)?;
        if start > end {
            return Err(SprintdeskError::config(format!(
                "daily window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, submitted_at: NaiveDateTime) -> bool {
        is_on_time(submitted_at, self.start, self.end)
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, SprintdeskError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M"))
        .map_err(|_| SprintdeskError::config(format!("invalid time of day: '{s}'")))
}

pub fn is_on_time(submitted_at: NaiveDateTime, window_start: NaiveTime, window_end: NaiveTime) -> bool {
    let t = submitted_at.time();
    window_start <= t && t <= window_end
}

pub fn parse_submitted_at(s: &str) -> Result<NaiveDateTime, SprintdeskError> {
    NaiveDateTime::parse_from_str(s.trim(), SUBMITTED_AT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M"))
        .map_err(|_| {
            SprintdeskError::validation(format!(
                "invalid timestamp '{s}', expected YYYY-MM-DD HH:MM[:SS]"
            ))
        })
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyStats {
    pub total: usize,
    pub on_time: usize,
    pub late: usize,
}

/// On-time vs. late counts. Rows with an unreadable timestamp count as late.
pub fn daily_stats(dailies: &[Daily], window: &DailyWindow) -> DailyStats {
    let on_time = dailies
        .iter()
        .filter(|d| {
            parse_submitted_at(&d.submitted_at)
                .map(|at| window.contains(at))
                .unwrap_or(false)
        })
        .count();
    DailyStats {
        total: dailies.len(),
        on_time,
        late: dailies.len() - on_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        parse_submitted_at(s).unwrap()
    }

    fn window() -> DailyWindow {
        DailyWindow::parse("06:00", "09:00").unwrap()
    }

    #[test]
    fn test_inside_window() {
        let w = window();
        assert!(is_on_time(at("2026-03-02 08:59"), w.start, w.end));
        assert!(!is_on_time(at("2026-03-02 09:01"), w.start, w.end));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let w = window();
        assert!(w.contains(at("2026-03-02 06:00:00")));
        assert!(w.contains(at("2026-03-02 09:00:00")));
        assert!(!w.contains(at("2026-03-02 05:59:59")));
        assert!(!w.contains(at("2026-03-02 09:00:01")));
    }

    #[test]
    fn test_window_parse_errors() {
        assert!(DailyWindow::parse("9am", "10:00").is_err());
        assert!(DailyWindow::parse("10:00", "09:00").is_err());
    }

    #[test]
    fn test_daily_stats() {
        let mk = |id: &str, ts: &str| Daily {
            id: id.into(),
            username: "ana".into(),
            date: "2026-03-02".into(),
            yesterday: String::new(),
            today: String::new(),
            impediment: String::new(),
            submitted_at: ts.into(),
        };
        let dailies = vec![
            mk("a", "2026-03-02 07:15:00"),
            mk("b", "2026-03-03 09:30:00"),
            mk("c", "garbage"),
        ];
        let stats = daily_stats(&dailies, &window());
        assert_eq!(stats, DailyStats { total: 3, on_time: 1, late: 2 });
    }
}
