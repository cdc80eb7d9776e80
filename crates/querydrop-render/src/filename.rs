//! Filename pattern expansion.
//!
//! A pattern may contain any number of `{timestamp:<strftime>}` placeholders
//! and an `{ext}` placeholder, e.g. `report_{timestamp:%Y%m%d}.{ext}`.

use std::fmt::{Display, Write};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use querydrop_core::OutputFormat;
use tracing::warn;

pub const TIMESTAMP_OPEN: &str = "{timestamp:";
pub const EXT_PLACEHOLDER: &str = "{ext}";
/// Substituted for a placeholder whose format code chrono rejects.
pub const INVALID_TIMESTAMP_FORMAT: &str = "invalid_timestamp_format";

/// Expand every timestamp placeholder against the single instant `now`.
///
/// Scanning is left to right and substituted text is never re-examined. An
/// unterminated placeholder stops expansion and the remainder of the pattern,
/// placeholder included, is kept verbatim.
pub fn expand_timestamps<Tz>(pattern: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find(TIMESTAMP_OPEN) {
        let code_start = start + TIMESTAMP_OPEN.len();
        let Some(code_len) = rest[code_start..].find('}') else {
            warn!(pattern, "timestamp placeholder in filename pattern is missing '}}'");
            break;
        };
        let code = &rest[code_start..code_start + code_len];

        out.push_str(&rest[..start]);
        out.push_str(&format_timestamp(now, code));
        rest = &rest[code_start + code_len + 1..];
    }

    out.push_str(rest);
    out
}

/// Full filename for one run: timestamps expanded, then `{ext}` filled in
/// from the output format.
pub fn resolve_filename<Tz>(pattern: &str, now: &DateTime<Tz>, format: OutputFormat) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    expand_timestamps(pattern, now).replace(EXT_PLACEHOLDER, format.extension())
}

fn format_timestamp<Tz>(now: &DateTime<Tz>, code: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let items: Vec<Item<'_>> = StrftimeItems::new(code).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        warn!(code, "invalid strftime format code in filename pattern");
        return INVALID_TIMESTAMP_FORMAT.to_string();
    }
    // Some items parse fine but cannot be formatted (`%#z`); `to_string`
    // would panic on those.
    let mut out = String::new();
    match write!(out, "{}", now.format_with_items(items.into_iter())) {
        Ok(()) => out,
        Err(_) => {
            warn!(code, "strftime format code cannot be rendered in filename pattern");
            INVALID_TIMESTAMP_FORMAT.to_string()
        }
    }
}
