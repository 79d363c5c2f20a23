use chrono::{DateTime, Utc};

/// Long-form date, e.g. "January 5, 2024"
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn format_read_time(minutes: u32) -> String {
    format!("{} min read", minutes)
}
