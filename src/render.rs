use std::fmt;
use std::path::Path;

use ics::escape_text;
use log::info;
use tokio::fs;

use crate::{Event, WriteError};

const CALENDAR_BEGIN: &str = "BEGIN:VCALENDAR\nVERSION:2.0\n";
const CALENDAR_END: &str = "END:VCALENDAR";

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BEGIN:VEVENT\nDTSTART:{}\nDTEND:{}\nSUMMARY:{}\nEND:VEVENT\n",
            self.start,
            self.end,
            escape_text(self.summary.as_str())
        )
    }
}

/// Wrap the events, in order, into a calendar document.
pub fn render(events: &[Event]) -> String {
    let events = events.iter().map(Event::to_string).collect::<String>();
    format!("{CALENDAR_BEGIN}{events}{CALENDAR_END}")
}

pub async fn write_calendar<P: AsRef<Path>>(path: P, calendar: &str) -> Result<(), WriteError> {
    let path = path.as_ref();

    fs::write(path, calendar).await.map_err(|source| WriteError {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Saved calendar to {}", path.display());
    Ok(())
}
