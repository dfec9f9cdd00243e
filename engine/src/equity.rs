//! [`Equity`]: an append-only history of total portfolio valuation, with an optional
//! per-currency snapshot at each sample.

use candela_core::{Currency, EngineError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Parallel `(timestamp, total value)` vectors, with an optional per-currency balance history
/// aligned one-to-one with the same timestamps (§3 Data Model, Equity entity).
#[derive(Debug, Clone, Default)]
pub struct Equity {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<Decimal>,
    history: Option<Vec<HashMap<Currency, Decimal>>>,
}

impl Equity {
    /// `track_history` controls whether per-currency snapshots are retained alongside the total.
    pub fn with_capacity(capacity: usize, track_history: bool) -> Self {
        Self {
            timestamps: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            history: track_history.then(|| Vec::with_capacity(capacity)),
        }
    }

    /// Appends one sample. `timestamp` must not precede the last recorded timestamp.
    pub fn add(
        &mut self,
        value: Decimal,
        timestamp: DateTime<Utc>,
        snapshot: Option<HashMap<Currency, Decimal>>,
    ) -> Result<(), EngineError> {
        if let Some(last) = self.timestamps.last() {
            if timestamp < *last {
                return Err(EngineError::OutOfOrder);
            }
        }
        self.timestamps.push(timestamp);
        self.values.push(value);
        if let Some(history) = &mut self.history {
            history.push(snapshot.unwrap_or_default());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[Decimal] {
        &self.values
    }

    pub fn history(&self) -> Option<&[HashMap<Currency, Decimal>]> {
        self.history.as_deref()
    }

    /// Writes `timestamp,total,<currency columns...>` rows, one per sample, currency columns
    /// sorted and named by `Currency`'s `"EXCHANGE:ASSET"` display form (§6 equity output).
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), EngineError> {
        let mut csv_writer = ::csv::Writer::from_writer(writer);

        let mut currencies = Vec::new();
        if let Some(history) = &self.history {
            let mut seen = HashSet::new();
            for snapshot in history {
                for currency in snapshot.keys() {
                    if seen.insert(currency.clone()) {
                        currencies.push(currency.clone());
                    }
                }
            }
            currencies.sort_by_key(|currency| currency.to_string());
        }

        let io_error = |error: ::csv::Error| EngineError::Io {
            detail: error.to_string(),
        };

        let mut header = vec!["timestamp".to_string(), "total".to_string()];
        header.extend(currencies.iter().map(ToString::to_string));
        csv_writer.write_record(&header).map_err(io_error)?;

        for index in 0..self.len() {
            let mut row = vec![self.timestamps[index].to_rfc3339(), self.values[index].to_string()];
            if let Some(history) = &self.history {
                let snapshot = &history[index];
                for currency in &currencies {
                    row.push(
                        snapshot
                            .get(currency)
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "0".to_string()),
                    );
                }
            }
            csv_writer.write_record(&row).map_err(io_error)?;
        }

        csv_writer.flush().map_err(|error| EngineError::Io {
            detail: error.to_string(),
        })
    }
}
