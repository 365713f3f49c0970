//! Fixed-capacity, insertion-ordered store of telemetry samples.
//!
//! The buffer is the only mutable state the derive step reads from. Appending
//! past capacity evicts from the head (FIFO). Timestamp order is not enforced.

use chrono::{DateTime, Utc};
use pitwatch_traits::Sample;
use std::collections::VecDeque;

use crate::config::HistoryCfg;

/// A single channel value at an instant: one element of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Point {
    #[inline]
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Which reading of a sample forms a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Pit,
    /// Probe by position in `Sample::probes`.
    Probe(usize),
}

impl Channel {
    /// Read this channel from a sample; `None` when the probe is absent.
    #[inline]
    pub fn read(self, sample: &Sample) -> Option<f64> {
        match self {
            Channel::Pit => Some(sample.pit),
            Channel::Probe(i) => sample.probes.get(i).map(|p| p.temperature),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer. A capacity of 0 is raised to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append at the tail, evicting from the head until `len() <= capacity()`.
    /// Returns the number of evicted samples.
    pub fn append(&mut self, sample: Sample) -> usize {
        self.samples.push_back(sample);
        let mut evicted = 0;
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Current ordered contents. Not stable across the next `append`.
    #[inline]
    pub fn snapshot(&self) -> &VecDeque<Sample> {
        &self.samples
    }

    #[inline]
    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, Sample> {
        self.samples.iter()
    }

    #[inline]
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Extract one channel as a series, skipping samples that lack it.
    pub fn series(&self, channel: Channel) -> Vec<Point> {
        self.samples
            .iter()
            .filter_map(|s| channel.read(s).map(|v| Point::new(s.timestamp, v)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::with_capacity(HistoryCfg::default().capacity)
    }
}

impl From<HistoryCfg> for HistoryBuffer {
    fn from(cfg: HistoryCfg) -> Self {
        Self::with_capacity(cfg.capacity)
    }
}

impl<'a> IntoIterator for &'a HistoryBuffer {
    type Item = &'a Sample;
    type IntoIter = std::collections::vec_deque::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pitwatch_traits::Probe;

    fn sample(i: i64) -> Sample {
        let ts = Utc.timestamp_opt(1_700_000_000 + i, 0).unwrap();
        Sample::new(ts, 200.0 + i as f64, vec![Probe::new(1, "p", i as f64, 195.0)], 10)
    }

    #[test]
    fn evicts_oldest_first() {
        let mut h = HistoryBuffer::with_capacity(3);
        for i in 0..5 {
            h.append(sample(i));
        }
        assert_eq!(h.len(), 3);
        let pits: Vec<f64> = h.iter().map(|s| s.pit).collect();
        assert_eq!(pits, vec![202.0, 203.0, 204.0]);
    }

    #[test]
    fn append_reports_evictions() {
        let mut h = HistoryBuffer::with_capacity(1);
        assert_eq!(h.append(sample(0)), 0);
        assert_eq!(h.append(sample(1)), 1);
        assert_eq!(h.latest().map(|s| s.pit), Some(201.0));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut h = HistoryBuffer::with_capacity(0);
        h.append(sample(0));
        h.append(sample(1));
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn series_skips_missing_probe() {
        let mut h = HistoryBuffer::with_capacity(4);
        h.append(sample(0));
        let mut bare = sample(1);
        bare.probes.clear();
        h.append(bare);
        h.append(sample(2));
        assert_eq!(h.series(Channel::Pit).len(), 3);
        let probe = h.series(Channel::Probe(0));
        assert_eq!(probe.len(), 2);
        assert_eq!(probe[1].value, 2.0);
        assert!(h.series(Channel::Probe(5)).is_empty());
    }
}
