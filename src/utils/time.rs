use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// This is the standard way of converting a date to a string in focusboard. Also used as a
/// file name for per-day records and as the key of a planner week.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// Key under which planner blocks of a week are stored.
pub fn week_key(date: NaiveDate) -> String {
    date_to_record_name(week_start(date))
}

/// Days left in the Monday-Sunday week, counting `today`. Monday gives 7, Sunday gives 1.
pub fn days_remaining_in_week(today: NaiveDate) -> u32 {
    7 - today.weekday().num_days_from_monday()
}

/// Last representable minute-level instant of a day (23:59:59).
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Inclusive iteration over calendar days.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start
        .iter_days()
        .take_while(move |day| *day <= end)
}

pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(1))
}

pub fn minutes_to_hours(minutes: u64) -> f64 {
    minutes as f64 / 60.
}

/// Hours rounded to one decimal. Only meant for presentation, sums are always kept in minutes.
pub fn round_hours(minutes: u64) -> f64 {
    (minutes_to_hours(minutes) * 10.).round() / 10.
}

pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    if hours > 0 {
        format!("{}h{:02}m", hours, minutes % 60)
    } else {
        format!("{}m", minutes % 60)
    }
}
