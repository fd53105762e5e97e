use std::iter;
use std::ops::RangeInclusive;

use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html};
use tokio::time::{sleep, Duration};

use crate::{FetchError, HolidayRecord};

const WEEKDAY: &str = "Veckodag";
const DATE: &str = "Datum";
const NAME: &str = "Namn";

/// Years the source publishes tables for. Others are still requested.
const SUPPORTED_YEARS: RangeInclusive<i32> = 1900..=2100;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Provides the raw holiday table of a single year.
#[allow(async_fn_in_trait)]
pub trait HolidaySource {
    async fn fetch_year(&self, year: i32) -> Result<Vec<HolidayRecord>, FetchError>;
}

/// Scrapes the yearly holiday pages of kalender.se.
pub struct KalenderSource {
    client: Client,
    base_url: String,
}

impl KalenderSource {
    pub fn new<S: Into<String>>(base_url: S) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client<S: Into<String>>(client: Client, base_url: S) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, year: i32) -> String {
        format!("{}{year}", self.base_url)
    }
}

impl HolidaySource for KalenderSource {
    async fn fetch_year(&self, year: i32) -> Result<Vec<HolidayRecord>, FetchError> {
        let url = self.url(year);
        let request_failed = |source| FetchError::Request { year, source };

        debug!("Requesting {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status { year, status });
        }

        let html = response.text().await.map_err(request_failed)?;

        parse_table(&html, year)
    }
}

/// Fetch every year in order, pausing `delay` between consecutive requests.
/// The first failing year aborts the whole fetch.
pub async fn fetch<S: HolidaySource>(
    source: &S,
    years: &[i32],
    delay: Duration,
) -> Result<Vec<HolidayRecord>, FetchError> {
    let mut table = Vec::new();

    for (idx, &year) in years.iter().enumerate() {
        if !SUPPORTED_YEARS.contains(&year) {
            warn!("{year} is outside {SUPPORTED_YEARS:?}, the source will likely reject it");
        }

        if idx > 0 {
            sleep(delay).await;
        }

        let mut rows = source.fetch_year(year).await?;
        info!("Fetched {} holidays for {year}", rows.len());
        table.append(&mut rows);
    }

    Ok(table)
}

/// Read the first table of a holiday page. Columns are matched by their
/// header text, so their order on the page does not matter.
pub fn parse_table(html: &str, year: i32) -> Result<Vec<HolidayRecord>, FetchError> {
    let html = Html::parse_document(html);
    let table = html
        .select(selector!("table"))
        .next()
        .ok_or(FetchError::MissingTable { year })?;

    let headers = table
        .select(selector!("thead tr"))
        .next()
        .or_else(|| {
            table
                .select(selector!("tr"))
                .find(|row| row.select(selector!("td")).next().is_none())
        })
        .map(row_cells)
        .unwrap_or_default();

    let column = |column: &'static str| {
        headers
            .iter()
            .position(|header| header == column)
            .ok_or(FetchError::MissingColumn { year, column })
    };

    let weekday = column(WEEKDAY)?;
    let date = column(DATE)?;
    let name = column(NAME)?;

    let mut records = Vec::new();

    for row in table.select(selector!("tr")) {
        if in_thead(row) || row.select(selector!("td")).next().is_none() {
            continue;
        }

        let cells = row_cells(row);

        let cell = |index: usize, column: &'static str| {
            cells
                .get(index)
                .cloned()
                .ok_or(FetchError::MissingColumn { year, column })
        };

        records.push(HolidayRecord {
            weekday: cell(weekday, WEEKDAY)?,
            date: cell(date, DATE)?,
            name: cell(name, NAME)?,
        });
    }

    Ok(records)
}

/// Cell texts of a row, with `colspan` cells repeated once per spanned column.
fn row_cells(row: ElementRef) -> Vec<String> {
    row.select(selector!("th, td"))
        .flat_map(|cell| {
            let span = cell
                .value()
                .attr("colspan")
                .and_then(|span| span.trim().parse::<usize>().ok())
                .unwrap_or(1)
                .max(1);
            iter::repeat(cell_text(cell)).take(span)
        })
        .collect()
}

fn in_thead(row: ElementRef) -> bool {
    row.parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| parent.value().name() == "thead")
}

fn cell_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tokio::time::Instant;

    use super::*;
    use crate::REQUEST_DELAY;

    const PAGE: &str = r#"
        <html><body>
          <h1>Helgdagar 2024</h1>
          <table class="table">
            <thead>
              <tr><th>Datum</th><th>Veckodag</th><th>Namn</th><th>Vecka</th></tr>
            </thead>
            <tbody>
              <tr><td>2024-01-01</td><td>Måndag</td><td><a href="/nyarsdagen">Nyårsdagen</a></td><td>1</td></tr>
              <tr><td>2024-01-06</td><td>Lördag</td><td>Trettondedag  jul</td><td>1</td></tr>
            </tbody>
          </table>
          <table><tr><th>Annat</th></tr></table>
        </body></html>
    "#;

    #[test]
    fn parses_first_table_by_header_name() {
        let records = parse_table(PAGE, 2024).unwrap();

        assert_eq!(
            records,
            vec![
                HolidayRecord::new("Måndag", "2024-01-01", "Nyårsdagen"),
                HolidayRecord::new("Lördag", "2024-01-06", "Trettondedag jul"),
            ]
        );
    }

    #[test]
    fn page_without_table_is_an_error() {
        let err = parse_table("<html><body><p>Sidan finns inte</p></body></html>", 1850)
            .unwrap_err();

        assert!(matches!(err, FetchError::MissingTable { year: 1850 }));
        assert!(err.to_string().contains("1850"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let html = "<table><tr><th>Datum</th><th>Namn</th></tr>\
                    <tr><td>2024-01-01</td><td>Nyårsdagen</td></tr></table>";

        let err = parse_table(html, 2024).unwrap_err();
        assert!(matches!(
            err,
            FetchError::MissingColumn {
                year: 2024,
                column: WEEKDAY
            }
        ));
    }

    #[test]
    fn short_row_is_an_error() {
        let html = "<table><tr><th>Veckodag</th><th>Datum</th><th>Namn</th></tr>\
                    <tr><td>Måndag</td><td>2024-01-01</td></tr></table>";

        let err = parse_table(html, 2024).unwrap_err();
        assert!(matches!(err, FetchError::MissingColumn { column: NAME, .. }));
    }

    #[test]
    fn thead_headers_may_be_td_cells() {
        let html = "<table><thead><tr><td>Veckodag</td><td>Datum</td><td>Namn</td></tr></thead>\
                    <tbody><tr><td>Måndag</td><td>2024-01-01</td><td>Nyårsdagen</td></tr></tbody></table>";

        assert_eq!(
            parse_table(html, 2024).unwrap(),
            vec![HolidayRecord::new("Måndag", "2024-01-01", "Nyårsdagen")]
        );
    }

    #[test]
    fn colspan_header_covers_every_spanned_column() {
        let html = "<table>\
                      <tr><th>Veckodag</th><th colspan=\"2\">Datum</th><th>Namn</th></tr>\
                      <tr><td>Måndag</td><td>2024-01-01</td><td>v. 1</td><td>Nyårsdagen</td></tr>\
                    </table>";

        assert_eq!(
            parse_table(html, 2024).unwrap(),
            vec![HolidayRecord::new("Måndag", "2024-01-01", "Nyårsdagen")]
        );
    }

    #[test]
    fn url_appends_year() {
        let source = KalenderSource::new(crate::BASE_URL).unwrap();
        assert_eq!(source.url(2024), "https://www.kalender.se/helgdagar/2024");
    }

    struct Recorder {
        started: Instant,
        calls: RefCell<Vec<(i32, Duration)>>,
        fail_on: Option<i32>,
    }

    impl Recorder {
        fn new(fail_on: Option<i32>) -> Self {
            Self {
                started: Instant::now(),
                calls: RefCell::new(Vec::new()),
                fail_on,
            }
        }
    }

    impl HolidaySource for Recorder {
        async fn fetch_year(&self, year: i32) -> Result<Vec<HolidayRecord>, FetchError> {
            self.calls
                .borrow_mut()
                .push((year, self.started.elapsed()));

            if self.fail_on == Some(year) {
                return Err(FetchError::MissingTable { year });
            }

            Ok(vec![HolidayRecord::new(
                "Måndag",
                format!("{year}-01-01"),
                "Nyårsdagen",
            )])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_years_only() {
        let source = Recorder::new(None);
        let table = fetch(&source, &[2024, 2023, 2024], REQUEST_DELAY)
            .await
            .unwrap();

        let dates = table.iter().map(|r| r.date.as_str()).collect::<Vec<_>>();
        assert_eq!(dates, ["2024-01-01", "2023-01-01", "2024-01-01"]);

        let calls = source.calls.into_inner();
        assert_eq!(
            calls,
            vec![
                (2024, Duration::ZERO),
                (2023, REQUEST_DELAY),
                (2024, REQUEST_DELAY * 2),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn first_failure_aborts() {
        let source = Recorder::new(Some(2023));
        let err = fetch(&source, &[2024, 2023, 2022], Duration::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::MissingTable { year: 2023 }));
        let years = source
            .calls
            .into_inner()
            .into_iter()
            .map(|(year, _)| year)
            .collect::<Vec<_>>();
        assert_eq!(years, [2024, 2023]);
    }

    #[tokio::test]
    async fn no_years_no_requests() {
        let source = Recorder::new(None);
        let table = fetch(&source, &[], REQUEST_DELAY).await.unwrap();

        assert!(table.is_empty());
        assert!(source.calls.into_inner().is_empty());
    }
}
