// Telemetry data domain models
use chrono::{Local, TimeZone};
use serde::Deserialize;
use std::collections::VecDeque;

/// How many chart points each series keeps (sliding window).
pub const SERIES_CAPACITY: usize = 30;

/// One raw sample as the platform delivers it: epoch millis plus a value
/// that arrives as text.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySample {
    pub ts: i64,
    #[serde(default)]
    pub value: String,
}

impl TelemetrySample {
    pub fn new(ts: i64, value: impl Into<String>) -> Self {
        Self {
            ts,
            value: value.into(),
        }
    }

    /// Numeric value of the sample; missing or non-numeric text reads as 0.
    pub fn value_f64(&self) -> f64 {
        self.value.trim().parse().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredValues {
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictedValues {
    pub temperature: f64,
    pub humidity: f64,
}

/// One point on a dashboard chart. Measured and predicted values come from
/// separate fetches, so a point carries one or the other.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub ts: i64,
    pub time: String,
    pub measured: Option<MeasuredValues>,
    pub predicted: Option<PredictedValues>,
}

impl ChartPoint {
    pub fn measured(ts: i64, values: MeasuredValues) -> Self {
        Self {
            ts,
            time: format_display_time(ts),
            measured: Some(values),
            predicted: None,
        }
    }

    pub fn predicted(ts: i64, values: PredictedValues) -> Self {
        Self {
            ts,
            time: format_display_time(ts),
            measured: None,
            predicted: Some(values),
        }
    }
}

/// Local wall-clock label for a chart point's x axis.
fn format_display_time(ts_ms: i64) -> String {
    Local
        .timestamp_millis_opt(ts_ms)
        .single()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Bounded, ordered, de-duplicated window of recent chart points.
///
/// Points must arrive with non-decreasing timestamps; the buffer never
/// re-sorts on append. A point whose timestamp equals the newest stored one
/// is dropped, which suppresses the repeated sample a `limit=1` poll returns
/// between sensor updates.
#[derive(Debug, Clone, Default)]
pub struct SeriesBuffer {
    points: VecDeque<ChartPoint>,
}

impl SeriesBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a buffer from an unordered history response: sort ascending by
    /// timestamp and keep only the most recent `SERIES_CAPACITY` points.
    pub fn from_history(mut points: Vec<ChartPoint>) -> Self {
        points.sort_by_key(|p| p.ts);
        points.dedup_by_key(|p| p.ts);
        let skip = points.len().saturating_sub(SERIES_CAPACITY);
        Self {
            points: points.into_iter().skip(skip).collect(),
        }
    }

    /// Append a point, evicting from the front once over capacity.
    pub fn append(&mut self, point: ChartPoint) {
        if self.points.back().is_some_and(|last| last.ts == point.ts) {
            return;
        }
        self.points.push_back(point);
        while self.points.len() > SERIES_CAPACITY {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&ChartPoint> {
        self.points.back()
    }

    /// Snapshot of the window, oldest first.
    pub fn points(&self) -> Vec<ChartPoint> {
        self.points.iter().cloned().collect()
    }
}
