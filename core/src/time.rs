//! Time primitives: [`TimeFrame`], [`Period`] and [`TimeStamp`].

use crate::error::EngineError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Number of seconds in a 365-day year, used to derive `candles_per_year`.
const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

/// Fixed interval between successive candle close times.
///
/// Immutable once constructed: [`TimeFrame::new`] enforces `duration > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TimeFrame {
    name: SmolStr,
    duration: TimeDelta,
}

impl TimeFrame {
    pub fn new(name: impl Into<SmolStr>, duration: TimeDelta) -> Result<Self, EngineError> {
        if duration <= TimeDelta::zero() {
            return Err(EngineError::IncorrectDuration(
                duration.num_milliseconds(),
            ));
        }
        Ok(Self {
            name: name.into(),
            duration,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> TimeDelta {
        self.duration
    }

    /// Number of candles of this timeframe that fit in a 365-day year.
    pub fn candles_per_year(&self) -> f64 {
        SECONDS_PER_YEAR as f64 / self.duration.num_seconds() as f64
    }
}

impl PartialOrd for TimeFrame {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeFrame {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.duration.cmp(&other.duration)
    }
}

/// A half-open or inclusive interval `[start, end]` in time.
///
/// Used both as a literal value type for slicing ([`Period::new`]) and as an accumulator via
/// [`Period::shift_start`] when the driver loop widens a period backwards by a warmup duration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Returns a new [`Period`] with `start` shifted backward by `duration`.
    pub fn shift_start(&self, duration: TimeDelta) -> Self {
        Self {
            start: self.start - duration,
            end: self.end,
        }
    }
}

/// Ordered sequence of moments spaced by a known [`TimeFrame`].
///
/// Append-only: once constructed from strictly increasing moments, a [`TimeStamp`] is read-only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimeStamp {
    timeframe: TimeFrame,
    moments: Vec<DateTime<Utc>>,
}

impl TimeStamp {
    /// Builds a [`TimeStamp`] from an already strictly-increasing sequence of moments.
    ///
    /// Does not itself validate monotonicity of externally-supplied data (ingest boundaries are
    /// responsible for that); synthesized series built with [`TimeStamp::synthesize`] are
    /// correct by construction.
    pub fn new(timeframe: TimeFrame, moments: Vec<DateTime<Utc>>) -> Self {
        Self { timeframe, moments }
    }

    /// Synthesizes `count` moments starting at `first`, spaced by `timeframe.duration()`.
    pub fn synthesize(timeframe: TimeFrame, first: DateTime<Utc>, count: usize) -> Self {
        let duration = timeframe.duration();
        let moments = (0..count as i64).map(|i| first + duration * i as i32).collect();
        Self { timeframe, moments }
    }

    pub fn timeframe(&self) -> &TimeFrame {
        &self.timeframe
    }

    /// Appends a moment to the end of the series. Caller is responsible for maintaining strict
    /// monotonicity; ingest paths are the only intended caller.
    pub fn push(&mut self, moment: DateTime<Utc>) {
        self.moments.push(moment);
    }

    pub fn len(&self) -> usize {
        self.moments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    pub fn as_slice(&self) -> &[DateTime<Utc>] {
        &self.moments
    }

    pub fn first(&self) -> Option<DateTime<Utc>> {
        self.moments.first().copied()
    }

    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.moments.last().copied()
    }

    /// Binary search for the first index whose moment is `>= target`. Fails with
    /// [`EngineError::ValueNotFound`] if `target` precedes the first moment.
    pub fn index_at_or_after(&self, target: DateTime<Utc>) -> Result<usize, EngineError> {
        if self.moments.is_empty() {
            return Err(EngineError::ZeroLength);
        }
        if target < self.moments[0] {
            return Err(EngineError::ValueNotFound);
        }
        match self.moments.binary_search(&target) {
            Ok(index) => Ok(index),
            Err(index) => Ok(index.min(self.moments.len() - 1)),
        }
    }

    /// Binary search for the last index whose moment is `<= target`, clamped to the last
    /// element when `target` is beyond the series.
    pub fn index_at_or_before(&self, target: DateTime<Utc>) -> Result<usize, EngineError> {
        if self.moments.is_empty() {
            return Err(EngineError::ZeroLength);
        }
        if target < self.moments[0] {
            return Err(EngineError::ValueNotFound);
        }
        let index = match self.moments.binary_search(&target) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        Ok(index.min(self.moments.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tf(secs: i64) -> TimeFrame {
        TimeFrame::new("test", TimeDelta::seconds(secs)).unwrap()
    }

    fn moment(offset_secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::seconds(offset_secs)
    }

    #[test]
    fn timeframe_rejects_non_positive_duration() {
        assert!(matches!(
            TimeFrame::new("bad", TimeDelta::zero()),
            Err(EngineError::IncorrectDuration(_))
        ));
        assert!(matches!(
            TimeFrame::new("bad", TimeDelta::seconds(-1)),
            Err(EngineError::IncorrectDuration(_))
        ));
    }

    #[test]
    fn timeframe_orders_by_duration() {
        let minute = tf(60);
        let hour = tf(3600);
        assert!(minute < hour);
    }

    #[test]
    fn timestamp_index_before_first_fails() {
        let ts = TimeStamp::synthesize(tf(60), moment(0), 3);
        assert!(matches!(
            ts.index_at_or_after(moment(-10)),
            Err(EngineError::ValueNotFound)
        ));
    }

    #[test]
    fn timestamp_index_clamped_to_last() {
        let ts = TimeStamp::synthesize(tf(60), moment(0), 3);
        assert_eq!(ts.index_at_or_before(moment(1000)).unwrap(), 2);
    }

    #[test]
    fn empty_timestamp_is_zero_length() {
        let ts = TimeStamp::new(tf(60), vec![]);
        assert!(matches!(
            ts.index_at_or_after(moment(0)),
            Err(EngineError::ZeroLength)
        ));
    }
}
