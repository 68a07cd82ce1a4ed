//! Raw flight export -> canonical dashboard dataset
//!
//! Steps, in order:
//! 1. rename source columns to canonical names
//! 2. coerce `price` to a number
//! 3. parse `departure_date`, derive `Days_To_Departure` and `Season`
//! 4. parse `departure_time`, derive `Departure_Time`
//! 5. derive `route`
//!
//! Derived columns that already exist are overwritten, so running the
//! normalizer on its own output reproduces the same derived values.

use crate::errors::NormalizeError;
use crate::table::Table;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use flight_core::schema::{self, Season, TimeOfDay};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Day-first format of the raw export
pub const RAW_DATE_FORMAT: &str = "%d-%m-%Y";
/// Format written to the normalized file
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Counters reported after a normalization run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub rows: usize,
    pub unparsed_prices: usize,
    pub unparsed_dates: usize,
    pub unparsed_times: usize,
    /// Derived columns written to the output
    pub derived_columns: Vec<&'static str>,
    /// Derived columns skipped because their source column is absent
    pub skipped_columns: Vec<&'static str>,
}

/// Keep only ASCII digits and decimal points, then parse.
///
/// `"₹12,345"` becomes `12345.0`; anything left unparseable is `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok()
}

/// Float rendering used for the normalized price column (`12345.0`)
pub fn format_price(price: f64) -> String {
    format!("{:?}", price)
}

/// Parse a departure date written day-first, or an already normalized ISO date
pub fn parse_departure_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, RAW_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT))
        .ok()
}

/// Parse `HH:MM` (or `HH:MM:SS`)
pub fn parse_departure_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Whole days from `now` until midnight of `date`, rounded towards negative
/// infinity. A flight later today is `-1`.
pub fn days_to_departure(date: NaiveDate, now: NaiveDateTime) -> i64 {
    let whole_days = (date - now.date()).num_days();
    // Any time past midnight, down to the nanosecond, pushes the floor back a day
    whole_days - i64::from(now.time() > NaiveTime::MIN)
}

/// Normalize a table in memory. `now` is the processing instant used for
/// `Days_To_Departure`.
pub fn normalize_table(
    mut table: Table,
    now: NaiveDateTime,
) -> Result<(Table, NormalizeSummary), NormalizeError> {
    let mut summary = NormalizeSummary {
        rows: table.len(),
        ..Default::default()
    };

    for column in &mut table.columns {
        *column = schema::canonical_column(column).to_string();
    }

    // 1. price
    let price_idx = table
        .column_index(schema::PRICE)
        .ok_or(NormalizeError::MissingPriceColumn)?;
    for row in 0..table.len() {
        let parsed = table.cell(row, price_idx).and_then(parse_price);
        if parsed.is_none() {
            summary.unparsed_prices += 1;
        }
        table.set_cell(row, price_idx, parsed.map(format_price).unwrap_or_default());
    }

    // 2. departure date, days to departure, season
    match table.column_index(schema::DEPARTURE_DATE) {
        Some(date_idx) => {
            let dates: Vec<Option<NaiveDate>> = (0..table.len())
                .map(|row| table.cell(row, date_idx).and_then(parse_departure_date))
                .collect();

            summary.unparsed_dates = dates.iter().filter(|d| d.is_none()).count();
            for (row, date) in dates.iter().enumerate() {
                let formatted = date
                    .map(|d| d.format(ISO_DATE_FORMAT).to_string())
                    .unwrap_or_default();
                table.set_cell(row, date_idx, formatted);
            }

            let days = dates
                .iter()
                .map(|d| d.map(|d| days_to_departure(d, now).to_string()).unwrap_or_default())
                .collect();
            table.set_column(schema::DAYS_TO_DEPARTURE, days);

            let seasons = dates
                .iter()
                .map(|d| {
                    d.map(|d| Season::from_month(d.month()).to_string())
                        .unwrap_or_default()
                })
                .collect();
            table.set_column(schema::SEASON, seasons);

            summary.derived_columns.extend([schema::DAYS_TO_DEPARTURE, schema::SEASON]);
        }
        None => {
            warn!("'departure_date' column is missing. Skipping 'Days_To_Departure' and 'Season' calculation.");
            summary.skipped_columns.extend([schema::DAYS_TO_DEPARTURE, schema::SEASON]);
        }
    }

    // 3. departure time of day
    match table.column_index(schema::DEPARTURE_TIME) {
        Some(time_idx) => {
            let times: Vec<Option<NaiveTime>> = (0..table.len())
                .map(|row| table.cell(row, time_idx).and_then(parse_departure_time))
                .collect();

            summary.unparsed_times = times.iter().filter(|t| t.is_none()).count();
            for (row, time) in times.iter().enumerate() {
                let formatted = time
                    .map(|t| t.format(TIME_FORMAT).to_string())
                    .unwrap_or_default();
                table.set_cell(row, time_idx, formatted);
            }

            let buckets = times
                .iter()
                .map(|t| t.map(|t| TimeOfDay::from_hour(t.hour()).to_string()).unwrap_or_default())
                .collect();
            table.set_column(schema::TIME_OF_DAY, buckets);
            summary.derived_columns.push(schema::TIME_OF_DAY);
        }
        None => {
            warn!("'departure_time' column is missing. Skipping 'Departure_Time' calculation.");
            summary.skipped_columns.push(schema::TIME_OF_DAY);
        }
    }

    // 4. route
    match (
        table.column_index(schema::DEPARTURE_CITY),
        table.column_index(schema::ARRIVAL_CITY),
    ) {
        (Some(from_idx), Some(to_idx)) => {
            let routes = (0..table.len())
                .map(|row| match (table.cell(row, from_idx), table.cell(row, to_idx)) {
                    (Some(from), Some(to)) => format!("{}-{}", from, to),
                    _ => String::new(),
                })
                .collect();
            table.set_column(schema::ROUTE, routes);
            summary.derived_columns.push(schema::ROUTE);
        }
        _ => {
            warn!("'departure_city' or 'arrival_city' column is missing. Skipping 'route' calculation.");
            summary.skipped_columns.push(schema::ROUTE);
        }
    }

    Ok((table, summary))
}

/// Normalize `input` into a new file at `output`. The input is never modified.
pub fn normalize_file(
    input: &Path,
    output: &Path,
    now: NaiveDateTime,
) -> Result<NormalizeSummary, NormalizeError> {
    if !input.is_file() {
        return Err(NormalizeError::InputNotFound(input.to_path_buf()));
    }

    let canonical_input = fs::canonicalize(input)?;
    if fs::canonicalize(output).ok().as_ref() == Some(&canonical_input) {
        return Err(NormalizeError::OutputIsInput(input.to_path_buf()));
    }

    let table = Table::read_csv(input)?;
    info!("Loaded {} successfully ({} rows)", input.display(), table.len());

    let (table, summary) = normalize_table(table, now)?;
    table.write_csv(output)?;

    info!(
        rows = summary.rows,
        unparsed_prices = summary.unparsed_prices,
        unparsed_dates = summary.unparsed_dates,
        unparsed_times = summary.unparsed_times,
        "Updated dataset saved to {}",
        output.display()
    );

    Ok(summary)
}
