use time::{OffsetDateTime, UtcOffset, macros::format_description};

/// Accepts the empty string or digits with at most one decimal point.
pub fn is_valid_amount_text(value: &str) -> bool {
    let mut seen_point = false;
    value.chars().all(|c| match c {
        '0'..='9' => true,
        '.' if !seen_point => {
            seen_point = true;
            true
        }
        _ => false,
    })
}

/// Parses draft amount text into a strictly positive, finite amount.
pub fn parse_amount(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn format_amount(amount: f64) -> String {
    format!("${:.2}", amount)
}

pub fn format_reminder_time(hour: u8, minute: u8) -> String {
    format!("{:02}:{:02}", hour, minute)
}

/// Renders an epoch-millisecond timestamp as `dd/MM/yyyy HH:mm` in `offset`.
pub fn format_timestamp(millis: i64, offset: UtcOffset) -> Option<String> {
    let at = OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000).ok()?;
    at.to_offset(offset)
        .format(format_description!("[day]/[month]/[year] [hour]:[minute]"))
        .ok()
}
