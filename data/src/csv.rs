//! CSV candle ingest, following the wire format in SPEC_FULL.md §6: rows of
//! `(timestamp, open, high, low, close, volume)` with timestamp `"YYYY-MM-DD HH:MM:SS"` (UTC),
//! and an optional leading index column.

use candela_core::{Candle, Chart, EngineError, TimeFrame};
use chrono::{NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::{io::Read, str::FromStr};

/// Width, in columns, of the optional leading index column a CSV source may carry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IndexColumn {
    /// No leading index column; the first field is the timestamp.
    Absent,
    /// One leading index column precedes the timestamp.
    Present,
}

impl IndexColumn {
    fn width(self) -> usize {
        match self {
            IndexColumn::Absent => 0,
            IndexColumn::Present => 1,
        }
    }
}

/// Reads a [`Chart`] from a CSV-style candle source.
#[derive(Debug, Clone, Copy)]
pub struct CsvChartReader {
    index_column: IndexColumn,
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl CsvChartReader {
    pub fn new(index_column: IndexColumn) -> Self {
        Self { index_column }
    }

    /// Parses every row of `reader` into a [`Chart`] for the given `timeframe`.
    pub fn read<R: Read>(&self, timeframe: TimeFrame, reader: R) -> Result<Chart, EngineError> {
        let mut csv_reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(reader);
        let mut chart = Chart::new(timeframe);
        let offset = self.index_column.width();

        for record in csv_reader.records() {
            let record = record.map_err(|error| EngineError::Io {
                detail: error.to_string(),
            })?;
            let field = |i: usize| record.get(offset + i).ok_or(EngineError::OutOfIndex {
                index: offset + i,
                length: record.len(),
            });

            let timestamp = field(0)?;
            let naive = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).map_err(|_| {
                EngineError::ParseField {
                    field: "timestamp".to_string(),
                    value: timestamp.to_string(),
                }
            })?;
            let close_time = Utc.from_utc_datetime(&naive);

            let decimal = |name: &'static str, i: usize| -> Result<Decimal, EngineError> {
                let raw = field(i)?;
                Decimal::from_str(raw).map_err(|_| EngineError::ParseField {
                    field: name.to_string(),
                    value: raw.to_string(),
                })
            };

            let candle = Candle::new(
                decimal("open", 1)?,
                decimal("high", 2)?,
                decimal("low", 3)?,
                decimal("close", 4)?,
                decimal("volume", 5)?,
                close_time,
            )?;
            chart.push(candle);
        }

        Ok(chart)
    }
}
