//! [`ChartContainer`]: a mapping of [`Instrument`] to [`Chart`], plus the multi-instrument merge.

use candela_core::{Candle, Chart, EngineError, Instrument, Period};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// A mapping `Instrument -> Chart`, the unit of data the chart merger and the backtest driver
/// operate over.
#[derive(Debug, Clone, Default)]
pub struct ChartContainer {
    charts: HashMap<Instrument, Chart>,
}

impl ChartContainer {
    pub fn new() -> Self {
        Self {
            charts: HashMap::new(),
        }
    }

    pub fn insert(&mut self, instrument: Instrument, chart: Chart) {
        self.charts.insert(instrument, chart);
    }

    pub fn chart(&self, instrument: &Instrument) -> Option<&Chart> {
        self.charts.get(instrument)
    }

    pub fn instruments(&self) -> impl Iterator<Item = &Instrument> {
        self.charts.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    /// The period spanning the earliest first timestamp to the latest last timestamp across
    /// every non-empty chart. Used by the backtest driver to size the equity timeline (§4.8).
    pub fn covering_period(&self) -> Result<Period, EngineError> {
        let mut start = None;
        let mut end = None;
        for chart in self.charts.values() {
            if chart.is_empty() {
                continue;
            }
            let first = chart.timestamps().first().expect("non-empty chart has a first moment");
            let last = chart.timestamps().last().expect("non-empty chart has a last moment");
            start = Some(start.map_or(first, |s: chrono::DateTime<chrono::Utc>| s.min(first)));
            end = Some(end.map_or(last, |e: chrono::DateTime<chrono::Utc>| e.max(last)));
        }
        match (start, end) {
            (Some(start), Some(end)) => Ok(Period::new(start, end)),
            _ => Err(EngineError::ZeroLength),
        }
    }

    /// Returns a new container with every chart sliced to `period` (§4.8 step 5, warmup slicing).
    pub fn slice(&self, period: Period) -> ChartContainer {
        ChartContainer {
            charts: self
                .charts
                .iter()
                .map(|(instrument, chart)| (instrument.clone(), chart.slice(period)))
                .collect(),
        }
    }

    /// Merges every chart into one non-decreasing, [`Instrument`]-tagged candle stream (§4.1).
    ///
    /// Ties (equal timestamps across instruments) are broken by the deterministic
    /// [`Instrument`] ordering: ascending timeframe duration, then symbol string. A min-heap
    /// keyed on `(timestamp, instrument)` keeps one entry per still-active chart, giving
    /// O(N log K) overall rather than rescanning all K charts at every step.
    pub fn merged_candles(&self) -> Vec<(Instrument, Candle)> {
        let entries: Vec<(&Instrument, &Chart)> = self
            .charts
            .iter()
            .filter(|(_, chart)| !chart.is_empty())
            .collect();

        let total: usize = entries.iter().map(|(_, chart)| chart.len()).sum();
        let mut cursors = vec![0usize; entries.len()];
        let mut heap: BinaryHeap<Reverse<(DateTime<Utc>, Instrument, usize)>> =
            BinaryHeap::with_capacity(entries.len());

        for (idx, (instrument, chart)) in entries.iter().enumerate() {
            let time = chart.candle_at(0).expect("non-empty chart").close_time;
            heap.push(Reverse((time, (*instrument).clone(), idx)));
        }

        let mut out = Vec::with_capacity(total);
        while let Some(Reverse((_, instrument, idx))) = heap.pop() {
            let candle = entries[idx]
                .1
                .candle_at(cursors[idx])
                .expect("cursor within bounds");
            out.push((instrument, candle));
            cursors[idx] += 1;

            if cursors[idx] < entries[idx].1.len() {
                let next_time = entries[idx]
                    .1
                    .candle_at(cursors[idx])
                    .expect("cursor within bounds")
                    .close_time;
                heap.push(Reverse((next_time, entries[idx].0.clone(), idx)));
            }
        }

        out
    }
}
