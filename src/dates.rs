use chrono::NaiveDate;

/// Human label for `date` as seen from `now`.
///
/// The distance is taken as an absolute number of days, so a date in the
/// future also reads as "n days ago". Dates a week or more away fall back
/// to `Mon D, YYYY`.
pub fn format_relative(date: NaiveDate, now: NaiveDate) -> String {
    let days = (now - date).num_days().unsigned_abs();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        _ => format_absolute(date),
    }
}

pub fn format_absolute(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn labels_recent_days() {
        let now = d(2026, 2, 10);
        assert_eq!(format_relative(now, now), "Today");
        assert_eq!(format_relative(d(2026, 2, 9), now), "Yesterday");
        assert_eq!(format_relative(d(2026, 2, 7), now), "3 days ago");
        assert_eq!(format_relative(d(2026, 2, 4), now), "6 days ago");
    }

    #[test]
    fn falls_back_to_absolute_date_after_a_week() {
        let now = d(2026, 2, 10);
        assert_eq!(format_relative(d(2026, 2, 3), now), "Feb 3, 2026");
        let month_ago = format_relative(d(2026, 1, 11), now);
        assert!(month_ago.contains("Jan"));
        assert!(month_ago.contains("2026"));
    }

    #[test]
    fn future_dates_read_as_past() {
        let now = d(2026, 2, 10);
        assert_eq!(format_relative(d(2026, 2, 11), now), "Yesterday");
        assert_eq!(format_relative(d(2026, 2, 13), now), "3 days ago");
    }
}
