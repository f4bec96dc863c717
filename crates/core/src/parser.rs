use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

use crate::validation::ValidationError;

/// Resolve a due-date specification relative to `today`.
///
/// Accepts `today`, `tomorrow`, `yesterday`, `+Nd`/`-Nd`/`+Nw`, weekday names (next
/// occurrence, never today), `YYYY-MM-DD`, and RFC 3339 timestamps.
pub fn parse_due_date_from(spec: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let trimmed = spec.trim();
    let invalid = || ValidationError::InvalidDate(spec.to_string());
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let lower = trimmed.to_ascii_lowercase();
    match lower.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if lower.starts_with('+') || lower.starts_with('-') {
        return parse_relative_spec(&lower, today).ok_or_else(invalid);
    }

    if let Some(weekday) = parse_weekday(&lower) {
        let mut days_ahead = (weekday.num_days_from_monday() as i64
            - today.weekday().num_days_from_monday() as i64)
            .rem_euclid(7);
        if days_ahead == 0 {
            days_ahead = 7;
        }
        return Ok(today + Duration::days(days_ahead));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc).date_naive());
    }

    Err(invalid())
}

fn parse_relative_spec(spec: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (sign, body) = spec.split_at(1);
    let (digits, unit) = match body.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => body.split_at(idx),
        None => (body, "d"),
    };
    let amount: i64 = digits.parse().ok()?;
    let days = match unit {
        "d" | "day" | "days" => amount,
        "w" | "wk" | "week" | "weeks" => amount.checked_mul(7)?,
        _ => return None,
    };
    let offset = Duration::try_days(days)?;
    if sign == "-" {
        today.checked_sub_signed(offset)
    } else {
        today.checked_add_signed(offset)
    }
}

fn parse_weekday(label: &str) -> Option<Weekday> {
    match label {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "weds" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}
