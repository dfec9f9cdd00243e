//! [`Chart`]: parallel OHLCV arrays plus a [`TimeStamp`] series, with binary-search slicing.

use crate::{
    candle::Candle,
    error::EngineError,
    time::{Period, TimeStamp},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Parallel OHLCV arrays aligned to a [`TimeStamp`] series.
///
/// Append-only during ingest (via [`Chart::push`]); read-only thereafter. All arrays share the
/// length of `timestamps`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Chart {
    open: Vec<Decimal>,
    high: Vec<Decimal>,
    low: Vec<Decimal>,
    close: Vec<Decimal>,
    volume: Vec<Decimal>,
    timestamps: TimeStamp,
}

impl Chart {
    pub fn new(timeframe: crate::time::TimeFrame) -> Self {
        Self {
            open: Vec::new(),
            high: Vec::new(),
            low: Vec::new(),
            close: Vec::new(),
            volume: Vec::new(),
            timestamps: TimeStamp::new(timeframe, Vec::new()),
        }
    }

    pub fn push(&mut self, candle: Candle) {
        self.open.push(candle.open);
        self.high.push(candle.high);
        self.low.push(candle.low);
        self.close.push(candle.close);
        self.volume.push(candle.volume);
        self.timestamps.push(candle.close_time);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &TimeStamp {
        &self.timestamps
    }

    pub fn candle_at(&self, index: usize) -> Option<Candle> {
        if index >= self.len() {
            return None;
        }
        Some(Candle {
            open: self.open[index],
            high: self.high[index],
            low: self.low[index],
            close: self.close[index],
            volume: self.volume[index],
            close_time: self.timestamps.as_slice()[index],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Candle> + '_ {
        (0..self.len()).filter_map(move |i| self.candle_at(i))
    }

    /// Returns the candles whose timestamps fall within `[period.start, period.end]` (§4.2).
    ///
    /// A `period.start` preceding the first timestamp yields an empty chart rather than
    /// propagating [`EngineError::ValueNotFound`], matching the reference "value not found
    /// produces an empty result" behaviour.
    pub fn slice(&self, period: Period) -> Chart {
        let Ok(start_idx) = self.timestamps.index_at_or_after(period.start) else {
            return Chart::new(self.timestamps.timeframe().clone());
        };
        let end_idx = self
            .timestamps
            .index_at_or_before(period.end)
            .unwrap_or(self.len().saturating_sub(1));

        if start_idx > end_idx || self.is_empty() {
            return Chart::new(self.timestamps.timeframe().clone());
        }

        let moments = self.timestamps.as_slice()[start_idx..=end_idx].to_vec();
        Chart {
            open: self.open[start_idx..=end_idx].to_vec(),
            high: self.high[start_idx..=end_idx].to_vec(),
            low: self.low[start_idx..=end_idx].to_vec(),
            close: self.close[start_idx..=end_idx].to_vec(),
            volume: self.volume[start_idx..=end_idx].to_vec(),
            timestamps: TimeStamp::new(self.timestamps.timeframe().clone(), moments),
        }
    }
}

impl TryFrom<(crate::time::TimeFrame, Vec<Candle>)> for Chart {
    type Error = EngineError;

    fn try_from((timeframe, candles): (crate::time::TimeFrame, Vec<Candle>)) -> Result<Self, Self::Error> {
        let mut chart = Chart::new(timeframe);
        for candle in candles {
            chart.push(candle);
        }
        Ok(chart)
    }
}
