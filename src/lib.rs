//! Scrape Swedish public holidays ("röda dagar") for a set of years and
//! render them as all-day events in an iCalendar file.
//!
//! The pipeline runs in three strictly sequential stages: [`fetch::fetch`]
//! collects the holiday table, [`transform::transform`] drops weekend rows
//! and derives event dates, and [`render::render`] fills the calendar
//! template. [`run`] chains them and writes the result to disk.

use std::path::PathBuf;

use log::info;
use tokio::time::Duration;

macro_rules! selector {
    ($query:expr) => {{
        static SELECTOR: once_cell::sync::Lazy<scraper::Selector> =
            once_cell::sync::Lazy::new(|| scraper::Selector::parse($query).unwrap());
        &SELECTOR
    }};
}

pub mod error;
pub mod fetch;
pub mod render;
pub mod transform;

pub use error::{Error, FetchError, ParseError, WriteError};
pub use fetch::{HolidaySource, KalenderSource};

/// Page listing the holidays of a year, which is appended to this URL.
pub const BASE_URL: &str = "https://www.kalender.se/helgdagar/";

pub const OUTPUT_PATH: &str = "röda_dagar.ics";

/// Pause between two consecutive year requests.
pub const REQUEST_DELAY: Duration = Duration::from_secs(5);

/// One row of the holiday table, as published by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayRecord {
    /// Localized weekday name, e.g. `Lördag`.
    pub weekday: String,
    /// Date as written on the page, `YYYY-MM-DD`.
    pub date: String,
    pub name: String,
}

impl HolidayRecord {
    pub fn new(
        weekday: impl Into<String>,
        date: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            weekday: weekday.into(),
            date: date.into(),
            name: name.into(),
        }
    }
}

/// An all-day event ready to be rendered. `end` is the day after `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub start: String,
    pub end: String,
    pub summary: String,
}

pub struct Config {
    pub base_url: String,
    pub output: PathBuf,
    pub delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.into(),
            output: PathBuf::from(OUTPUT_PATH),
            delay: REQUEST_DELAY,
        }
    }
}

/// Fetch, filter and render the holidays of `years` without touching disk.
pub async fn create_calendar<S: HolidaySource>(
    source: &S,
    years: &[i32],
    include_weekends: bool,
    delay: Duration,
) -> Result<String, Error> {
    let table = fetch::fetch(source, years, delay).await?;
    let events = transform::transform(table, include_weekends)?;
    info!("Rendering {} events", events.len());
    Ok(render::render(&events))
}

/// Build the calendar and write it to `config.output`, replacing any
/// existing file. Nothing is written if an earlier stage fails.
pub async fn run<S: HolidaySource>(
    source: &S,
    config: &Config,
    years: &[i32],
    include_weekends: bool,
) -> Result<String, Error> {
    let calendar = create_calendar(source, years, include_weekends, config.delay).await?;
    render::write_calendar(&config.output, &calendar).await?;
    Ok(calendar)
}
