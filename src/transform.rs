use chrono::NaiveDate;
use log::debug;

use crate::{Event, HolidayRecord, ParseError};

/// Weekday labels used by the source for Saturday and Sunday.
const WEEKEND: [&str; 2] = ["Lördag", "Söndag"];

const SOURCE_DATE_FORMAT: &str = "%Y-%m-%d";
const ICS_DATE_FORMAT: &str = "%Y%m%d";

/// Turn holiday rows into all-day events, keeping their order. Weekend rows
/// are dropped unless `include_weekends` is set. A single unparseable date
/// fails the whole table.
pub fn transform(
    table: Vec<HolidayRecord>,
    include_weekends: bool,
) -> Result<Vec<Event>, ParseError> {
    table
        .into_iter()
        .filter(|record| {
            let keep = include_weekends || !is_weekend(&record.weekday);
            if !keep {
                debug!("Skipping {} ({}) on a weekend", record.name, record.date);
            }
            keep
        })
        .map(to_event)
        .collect()
}

fn is_weekend(weekday: &str) -> bool {
    WEEKEND.iter().any(|day| *day == weekday)
}

fn to_event(record: HolidayRecord) -> Result<Event, ParseError> {
    let date = NaiveDate::parse_from_str(record.date.trim(), SOURCE_DATE_FORMAT).map_err(
        |source| ParseError::InvalidDate {
            value: record.date.clone(),
            name: record.name.clone(),
            source,
        },
    )?;

    let next = date
        .succ_opt()
        .ok_or(ParseError::DateOutOfRange { date })?;

    Ok(Event {
        start: date.format(ICS_DATE_FORMAT).to_string(),
        end: next.format(ICS_DATE_FORMAT).to_string(),
        summary: record.name,
    })
}
