//! Reference-timezone clock and human date/time phrasing.
//!
//! Every instant in the core is a `NaiveDateTime` in one fixed reference
//! timezone (UTC-3, São Paulo). Conversion from wall-clock/unix time happens
//! here, once, at the I/O boundary; nothing downstream does timezone math.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday,
};

/// Fixed reference offset: UTC-3 (Brazil has no DST since 2019).
pub const REFERENCE_OFFSET_HOURS: i32 = -3;

/// The reference timezone as a chrono offset.
pub fn reference_offset() -> FixedOffset {
    FixedOffset::east_opt(REFERENCE_OFFSET_HOURS * 3600).unwrap()
}

/// Current instant in the reference timezone.
pub fn now() -> NaiveDateTime {
    Utc::now().with_timezone(&reference_offset()).naive_local()
}

/// Convert unix seconds (webhook timestamps) to the reference timezone.
pub fn from_unix(secs: i64) -> NaiveDateTime {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .unwrap_or_else(Utc::now)
        .with_timezone(&reference_offset())
        .naive_local()
}

/// Portuguese weekday name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "segunda-feira",
        Weekday::Tue => "terça-feira",
        Weekday::Wed => "quarta-feira",
        Weekday::Thu => "quinta-feira",
        Weekday::Fri => "sexta-feira",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

/// Human date phrasing relative to `today`: "hoje", "amanhã", a weekday name
/// for dates less than 7 days out, else `dd/mm/yyyy`.
pub fn human_date(date: NaiveDate, today: NaiveDate) -> String {
    let delta = (date - today).num_days();
    match delta {
        0 => "hoje".to_string(),
        1 => "amanhã".to_string(),
        2..=6 => weekday_name(date.weekday()).to_string(),
        _ => date.format("%d/%m/%Y").to_string(),
    }
}

/// Human time phrasing: exact hours as "15h", half-hours as "15h30",
/// noon and midnight called by name, anything else as `HH:MM`.
pub fn human_time(time: NaiveTime) -> String {
    let (h, m) = (time.hour(), time.minute());
    match (h, m) {
        (12, 0) => "meio-dia".to_string(),
        (0, 0) => "meia-noite".to_string(),
        (_, 0) => format!("{h}h"),
        (_, 30) => format!("{h}h30"),
        _ => time.format("%H:%M").to_string(),
    }
}

/// Combined phrasing, e.g. "amanhã às 15h" or "23/12/2026 às 09:45".
pub fn human_datetime(dt: NaiveDateTime, now: NaiveDateTime) -> String {
    format!(
        "{} às {}",
        human_date(dt.date(), now.date()),
        human_time(dt.time())
    )
}
