use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use anyhow::{anyhow, Result};

use crate::model::task::Deadline;

/// Format used by the deadline input field: local date and time, minute precision.
pub const DEADLINE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parses a deadline typed by the user. Anything that cannot be read as a
/// point in time is kept verbatim.
pub fn parse_deadline(input: &str) -> Deadline {
    let input = input.trim();
    match parse_deadline_at(input, Local::now().date_naive()) {
        Ok(at) => Deadline::At(at),
        Err(_) => Deadline::Raw(input.to_string()),
    }
}

fn parse_deadline_at(input: &str, today: NaiveDate) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in [
        DEADLINE_INPUT_FORMAT,
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return local_to_utc(dt);
        }
    }
    parse_human_date(input, today)
}

/// Splits an instant into local `(date, time)` strings for the edit form.
pub fn split_deadline(deadline: DateTime<Utc>) -> (String, String) {
    let local = deadline.with_timezone(&Local);
    (
        local.format("%Y-%m-%d").to_string(),
        local.format("%H:%M").to_string(),
    )
}

/// Rejoins the parts produced by [`split_deadline`] into the input format.
pub fn join_deadline(date: &str, time: &str) -> String {
    if time.is_empty() {
        date.to_string()
    } else {
        format!("{}T{}", date, time)
    }
}

pub fn deadline_input(deadline: DateTime<Utc>) -> String {
    let (date, time) = split_deadline(deadline);
    join_deadline(&date, &time)
}

/// e.g. "Sat, Mar 1, 2025 at 09:30 AM" in local time.
pub fn format_deadline(deadline: DateTime<Utc>) -> String {
    let local = deadline.with_timezone(&Local);
    format!(
        "{} at {}",
        local.format("%a, %b %-d, %Y"),
        local.format("%I:%M %p")
    )
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%-m/%-d/%Y").to_string()
}

/// Human shortcuts: `today`, `tomorrow`, `eow`, `eom`, `+3d`, `+2w`, `+1m`,
/// `fri`, `2:fri`, or a bare `YYYY-MM-DD`. All resolve to the end of the day.
pub fn parse_human_date(input: &str, today: NaiveDate) -> Result<DateTime<Utc>> {
    match input.to_lowercase().as_str() {
        "today" | "tod" => return end_of_day(today),
        "tomorrow" | "tom" => return end_of_day(add_days(today, 1)?),
        "eow" => {
            // End of week (Sunday)
            let days_to_sunday = 7 - today.weekday().num_days_from_sunday() as i64;
            return end_of_day(add_days(today, days_to_sunday % 7)?);
        }
        "eom" => return end_of_day(last_day_of_month(today.year(), today.month())?),
        _ => {}
    }

    if let Some(rest) = input.strip_prefix('+') {
        let (num_str, unit) = match rest.char_indices().last() {
            Some((idx, _)) if idx > 0 => rest.split_at(idx),
            _ => return Err(anyhow!("Invalid relative format")),
        };
        let count: i64 = num_str.parse().map_err(|_| anyhow!("Invalid relative format"))?;

        let target = match unit {
            "d" => add_days(today, count)?,
            "w" => add_days(
                today,
                count
                    .checked_mul(7)
                    .ok_or_else(|| anyhow!("Relative date out of range"))?,
            )?,
            "m" => {
                let months = (today.month0() as i64)
                    .checked_add(count)
                    .ok_or_else(|| anyhow!("Relative date out of range"))?;
                let year = i32::try_from(months.div_euclid(12))
                    .ok()
                    .and_then(|years| today.year().checked_add(years))
                    .ok_or_else(|| anyhow!("Relative date out of range"))?;
                let month = months.rem_euclid(12) as u32 + 1;
                match NaiveDate::from_ymd_opt(year, month, today.day()) {
                    Some(date) => date,
                    // Jan 31 + 1m lands on the last day of February
                    None => last_day_of_month(year, month)?,
                }
            }
            _ => return Err(anyhow!("Unknown unit in relative time: {}", unit)),
        };
        return end_of_day(target);
    }

    if let Ok(d) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return end_of_day(d);
    }

    if let Some((count, day_str)) = parse_weekday_token(input) {
        if let Ok(target_weekday) = parse_weekday_str(day_str) {
            let mut days_needed = target_weekday.num_days_from_sunday() as i64
                - today.weekday().num_days_from_sunday() as i64;
            if days_needed <= 0 {
                days_needed += 7;
            }
            let days_needed = (count - 1)
                .checked_mul(7)
                .and_then(|extra| extra.checked_add(days_needed))
                .ok_or_else(|| anyhow!("Weekday offset out of range"))?;

            return end_of_day(add_days(today, days_needed)?);
        }
    }

    Err(anyhow!("Could not parse date: {}", input))
}

fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| anyhow!("Date out of range: {} + {} days", date, days))
}

fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let first_of_next = if month == 12 {
        year.checked_add(1).and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| anyhow!("Date out of range: {}-{}", year, month))
}

fn end_of_day(date: NaiveDate) -> Result<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(23, 59, 59).ok_or_else(|| anyhow!("Invalid time"))?;
    local_to_utc(date.and_time(time))
}

fn local_to_utc(dt: NaiveDateTime) -> Result<DateTime<Utc>> {
    Local
        .from_local_datetime(&dt)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("Nonexistent local time: {}", dt))
}

fn parse_weekday_token(input: &str) -> Option<(i64, &str)> {
    match input.split_once(':') {
        Some((count, day)) => count.parse::<i64>().ok().filter(|c| *c >= 1).map(|c| (c, day)),
        // Just "fri" means 1:fri
        None => Some((1, input)),
    }
}

fn parse_weekday_str(s: &str) -> Result<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(anyhow!("Invalid weekday")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_date(at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }

    #[test]
    fn test_parse_weekday_token() {
        assert_eq!(parse_weekday_token("fri"), Some((1, "fri")));
        assert_eq!(parse_weekday_token("2:fri"), Some((2, "fri")));
        assert_eq!(parse_weekday_token("x:fri"), None);
    }

    #[test]
    fn test_relative_dates_from_anchor() {
        // 2025-01-31 is a Friday
        let anchor = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let tomorrow = parse_human_date("tomorrow", anchor).unwrap();
        assert_eq!(local_date(tomorrow), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());

        let plus_month = parse_human_date("+1m", anchor).unwrap();
        assert_eq!(local_date(plus_month), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());

        let next_friday = parse_human_date("fri", anchor).unwrap();
        assert_eq!(local_date(next_friday), NaiveDate::from_ymd_opt(2025, 2, 7).unwrap());

        let eow = parse_human_date("eow", anchor).unwrap();
        assert_eq!(local_date(eow), NaiveDate::from_ymd_opt(2025, 2, 2).unwrap());
    }

    #[test]
    fn test_input_format_round_trips_through_split() {
        let at = parse_deadline_at("2025-06-15T14:45", NaiveDate::MIN).unwrap();
        assert_eq!(deadline_input(at), "2025-06-15T14:45");
        let (date, time) = split_deadline(at);
        assert_eq!(date, "2025-06-15");
        assert_eq!(time, "14:45");
    }

    #[test]
    fn test_rfc3339_is_absolute() {
        let at = parse_deadline_at("2025-01-01T10:00:00Z", NaiveDate::MIN).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_naive_seconds_with_t_separator_is_local() {
        let at = parse_deadline_at("2025-01-01T10:00:00", NaiveDate::MIN).unwrap();
        assert_eq!(deadline_input(at), "2025-01-01T10:00");
        assert!(matches!(parse_deadline("2025-01-01T10:00:00"), Deadline::At(_)));
    }

    #[test]
    fn test_out_of_range_shortcuts_are_raw() {
        for input in [
            "+é",
            "+99999999999d",
            "+9223372036854775807w",
            "+9223372036854775807m",
            "9223372036854775807:fri",
            "+-999999999m",
        ] {
            assert_eq!(parse_deadline(input), Deadline::Raw(input.to_string()), "{}", input);
        }
        let anchor = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert!(parse_human_date("+1é", anchor).is_err());
        assert!(parse_human_date("+d", anchor).is_err());
    }

    #[test]
    fn test_unparseable_deadline_is_raw() {
        assert_eq!(
            parse_deadline("next blue moon"),
            Deadline::Raw("next blue moon".to_string())
        );
    }
}
