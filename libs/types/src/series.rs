//! Historical price/volume series

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bucket width of a historical series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Daily,
    Hourly,
}

impl Resolution {
    pub fn bucket_secs(self) -> i64 {
        match self {
            Resolution::Daily => 86_400,
            Resolution::Hourly => 3_600,
        }
    }
}

/// One time bucket of pair activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// Bucket start, unix seconds
    pub timestamp: i64,
    pub reserve0: Decimal,
    pub reserve1: Decimal,
    pub reserve_usd: Decimal,
    pub volume_usd: Decimal,
    pub volume_token0: Decimal,
    pub volume_token1: Decimal,
}

/// Ordered, time-bucketed series covering `[since, now]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub resolution: Resolution,
    pub since: DateTime<Utc>,
    points: Vec<HistoricalPoint>,
}

impl HistoricalSeries {
    /// Build a series, ordering points by bucket start
    pub fn new(resolution: Resolution, since: DateTime<Utc>, mut points: Vec<HistoricalPoint>) -> Self {
        points.sort_by_key(|point| point.timestamp);
        Self {
            resolution,
            since,
            points,
        }
    }

    pub fn points(&self) -> &[HistoricalPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoricalPoint> {
        self.points.last()
    }

    /// Points whose bucket starts at or after `start`
    pub fn window(&self, start: DateTime<Utc>) -> &[HistoricalPoint] {
        let cutoff = start.timestamp();
        let first = self.points.partition_point(|point| point.timestamp < cutoff);
        &self.points[first..]
    }

    /// Total USD volume of buckets starting at or after `start`
    pub fn volume_since(&self, start: DateTime<Utc>) -> Decimal {
        self.window(start).iter().map(|point| point.volume_usd).sum()
    }
}
