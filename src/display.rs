use chrono::{DateTime, NaiveDate, Utc};

use crate::model::task::{TaskPriority, TaskStatus};

const NEUTRAL_BADGE: &str = "bg-gray-100 text-gray-800";
const PLACEHOLDER: &str = "-";

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;

pub fn status_color(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => NEUTRAL_BADGE,
        TaskStatus::InProgress => "bg-blue-100 text-blue-800",
        TaskStatus::Review => "bg-yellow-100 text-yellow-800",
        TaskStatus::Completed => "bg-green-100 text-green-800",
        TaskStatus::Unknown => NEUTRAL_BADGE,
    }
}

pub fn priority_color(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => NEUTRAL_BADGE,
        TaskPriority::Medium => "bg-yellow-100 text-yellow-800",
        TaskPriority::High => "bg-red-100 text-red-800",
        TaskPriority::Unknown => NEUTRAL_BADGE,
    }
}

/// Roles share one badge.
pub const ROLE_BADGE: &str = "bg-blue-100 text-blue-800";

/// `in_progress` reads as `in progress`.
pub fn status_label(status: TaskStatus) -> String {
    status.as_ref().replacen('_', " ", 1)
}

/// `"{h}h {m}m"` between the two instants, `-` while still checked in.
pub fn format_duration(check_in: DateTime<Utc>, check_out: Option<DateTime<Utc>>) -> String {
    let Some(check_out) = check_out else {
        return PLACEHOLDER.to_string();
    };
    let millis = (check_out - check_in).num_milliseconds();
    let hours = millis / MS_PER_HOUR;
    let minutes = (millis % MS_PER_HOUR) / MS_PER_MINUTE;
    format!("{hours}h {minutes}m")
}

pub fn format_currency(amount: f64) -> String {
    format!("${amount:.2}")
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%-I:%M:%S %p").to_string()
}

pub fn format_optional_time(at: Option<DateTime<Utc>>) -> String {
    at.map(format_time)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// `2024-02` reads as `February 2024`; anything else is shown as stored.
pub fn format_month(month: &str) -> String {
    NaiveDate::parse_from_str(&format!("{}-01", month.get(..7).unwrap_or(month)), "%Y-%m-%d")
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|_| month.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use strum::IntoEnumIterator;

    #[test]
    fn duration_splits_into_hours_and_minutes() {
        let check_in = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let check_out = check_in + chrono::Duration::minutes(125);
        assert_eq!(format_duration(check_in, Some(check_out)), "2h 5m");
        assert_eq!(format_duration(check_in, Some(check_in)), "0h 0m");
        assert_eq!(format_duration(check_in, None), "-");
    }

    #[test]
    fn every_status_has_a_badge() {
        for status in TaskStatus::iter() {
            assert!(status_color(status).starts_with("bg-"));
        }
        assert_eq!(status_color(TaskStatus::Unknown), NEUTRAL_BADGE);
        assert_eq!(priority_color(TaskPriority::High), "bg-red-100 text-red-800");
        assert_eq!(priority_color(TaskPriority::Unknown), NEUTRAL_BADGE);
    }

    #[test]
    fn labels_and_money() {
        assert_eq!(status_label(TaskStatus::InProgress), "in progress");
        assert_eq!(format_currency(1250.5), "$1250.50");
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn dates_and_times() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        assert_eq!(format_date(date), "Feb 5, 2024");
        assert_eq!(format_optional_date(None), "-");
        assert_eq!(
            format_time(Utc.with_ymd_and_hms(2024, 5, 2, 14, 7, 9).unwrap()),
            "2:07:09 PM"
        );
        assert_eq!(format_month("2024-02"), "February 2024");
        assert_eq!(format_month("2024-02-01"), "February 2024");
        assert_eq!(format_month("Q1"), "Q1");
    }
}
