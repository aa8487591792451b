use std::fmt::Display;

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

pub const DATE_EXAMPLES: &str =
    "Examples are \"yesterday\", \"1 hour ago\", \"15/03/2025\", \"12:00 16/03/2025\", \"9 AM 16/03/2025\"";

/// Parses human friendly input like "yesterday" or "9 AM 16/03/2025" into local time.
/// `None` means now.
pub fn parse_moment(
    value: Option<&str>,
    style: DateStyle,
    field: &str,
) -> Result<NaiveDateTime> {
    let now = Local::now();
    let Some(value) = value else {
        return Ok(now.naive_local());
    };
    match parse_date_string(value, now, style.into()) {
        Ok(v) => Ok(v.with_timezone(&Local).naive_local()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate {field} \"{value}\": {e}"),
            )
            .into()),
    }
}

pub fn parse_day(value: Option<&str>, style: DateStyle, field: &str) -> Result<NaiveDate> {
    Ok(parse_moment(value, style, field)?.date())
}
