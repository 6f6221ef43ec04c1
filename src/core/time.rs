use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Calendar date used for due-date comparisons.
pub(crate) fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

pub(crate) fn format_date(value: Date) -> String {
    value.format(&format_description!("[year]-[month]-[day]")).unwrap_or_else(|_| value.to_string())
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, whose UTC date is used.
pub(crate) fn parse_date_flexible(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if let Ok(value) = Date::parse(raw, &format_description!("[year]-[month]-[day]")) {
        return Some(value);
    }
    OffsetDateTime::parse(raw, &Rfc3339).ok().map(|value| value.to_offset(time::UtcOffset::UTC).date())
}

pub(crate) fn is_past_due(due_date: Date, today: Date) -> bool {
    due_date < today
}
