// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use time::format_description::well_known::Rfc3339;
use time::macros::{format_description, offset};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Ledger times are shown in Taipei local time unless configured otherwise.
pub const DEFAULT_DISPLAY_OFFSET: UtcOffset = offset!(+8);

/// UTC, whole seconds. Stored timestamps in this form compare correctly as
/// plain strings.
pub fn to_rfc3339(value: OffsetDateTime) -> String {
    let utc = value.to_offset(UtcOffset::UTC);
    utc.replace_nanosecond(0)
        .unwrap_or(utc)
        .format(&Rfc3339)
        .unwrap_or_else(|_| value.to_string())
}

/// Accepts RFC 3339 or a naive `YYYY-MM-DD[ T]HH:MM:SS[.fff]`, which is
/// taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(value);
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    ) {
        return Ok(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    ) {
        return Ok(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    bail!("unsupported timestamp format {raw:?}")
}

pub fn format_local(value: OffsetDateTime, offset: UtcOffset) -> String {
    value
        .to_offset(offset)
        .format(&format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| value.to_string())
}

/// Display form of a stored timestamp, or `None` when `raw` does not parse.
pub fn localize(raw: &str, offset: UtcOffset) -> Option<String> {
    parse_timestamp(raw)
        .ok()
        .map(|value| format_local(value, offset))
}

/// Parses `+HH:MM` / `-HH:MM`; `Z` and `UTC` mean zero.
pub fn parse_utc_offset(raw: &str) -> Result<UtcOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(
        raw,
        &format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("invalid UTC offset {raw:?}; expected a value like +08:00"))
}
