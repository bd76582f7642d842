use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Parse the relative datetime format used by anonymized transaction
/// exports: `"<day offset> <HH:MM:SS>"`, counted from `anchor` instead of a
/// calendar date.
///
/// `"5 10:23:26"` is anchor + 5 days + 10h 23m 26s. Blank values, a token
/// count other than two, or an unparseable token all yield None — malformed
/// cells degrade to a missing value, never an error.
pub fn parse_relative_datetime(value: &str, anchor: NaiveDate) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut tokens = trimmed.split_whitespace();
    let day_token = tokens.next()?;
    let time_token = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }

    let day_offset: i64 = day_token.parse().ok()?;
    let seconds = parse_time_of_day(time_token)?;

    anchor
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::try_days(day_offset)?)?
        .checked_add_signed(Duration::try_seconds(seconds)?)
}

/// Time-of-day token as seconds. Hours may exceed 23 — the value is a
/// duration, so `25:00:00` rolls into the next day.
fn parse_time_of_day(token: &str) -> Option<i64> {
    let mut parts = token.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }
    hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)
}
