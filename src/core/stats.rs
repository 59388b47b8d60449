//! Descriptive Statistics
//!
//! Summary statistics, bucketed histograms and a bounded sample window for
//! inspecting generated number streams.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::{Serialize, Deserialize};

/// Default number of histogram buckets.
pub const DEFAULT_BUCKETS: u32 = 20;

/// Default number of samples kept by a [`RollingWindow`].
pub const DEFAULT_WINDOW: usize = 1000;

/// Summary statistics over a set of integer samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of samples.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Element at index `count / 2` of the sorted samples.
    pub median: i64,
    /// Most frequent value; ties go to the value that reached the count first.
    pub mode: i64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Smallest sample.
    pub min: i64,
    /// Largest sample.
    pub max: i64,
}

impl Summary {
    /// Compute a summary. Returns `None` for an empty sample set.
    pub fn from_samples(samples: &[i64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let count = samples.len();

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let median = sorted[count / 2];

        let mean = samples.iter().map(|&v| v as f64).sum::<f64>() / count as f64;
        let variance = samples
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / count as f64;

        // Mode: strict `>` keeps the earliest value to reach a new maximum.
        let mut frequency: BTreeMap<i64, usize> = BTreeMap::new();
        let mut mode = samples[0];
        let mut best = 0;
        for &v in samples {
            let entry = frequency.entry(v).or_insert(0);
            *entry += 1;
            if *entry > best {
                best = *entry;
                mode = v;
            }
        }

        Some(Self {
            count,
            mean,
            median,
            mode,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={} mean={:.2} median={} mode={} std_dev={:.2} range=[{}, {}]",
            self.count, self.mean, self.median, self.mode, self.std_dev, self.min, self.max
        )
    }
}

/// One histogram bucket covering `[start, end]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// First value in the bucket.
    pub start: i64,
    /// Last value in the bucket (inclusive).
    pub end: i64,
    /// Samples counted.
    pub count: u64,
}

impl Bucket {
    /// Label in `"start-end"` form.
    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// Equal-width histogram over an inclusive integer range.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Histogram {
    min: i64,
    max: i64,
    width: i128,
    buckets: Vec<Bucket>,
}

impl Histogram {
    /// Create an empty histogram over `[min, max]` with roughly `buckets` buckets.
    ///
    /// Bucket width is `ceil((max - min + 1) / buckets)`; the last bucket is
    /// truncated at `max`. Inverted ranges are swapped.
    pub fn new(min: i64, max: i64, buckets: u32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        // i128 holds the span of the full i64 range
        let span = i128::from(max) - i128::from(min) + 1;
        let buckets = i128::from(buckets.max(1));
        let width = ((span + buckets - 1) / buckets).max(1);

        let mut out = Vec::new();
        let mut start = i128::from(min);
        while start <= i128::from(max) {
            let end = (start + width - 1).min(i128::from(max));
            out.push(Bucket {
                start: start as i64,
                end: end as i64,
                count: 0,
            });
            start += width;
        }

        Self { min, max, width, buckets: out }
    }

    /// Count a sample. Out-of-range samples are ignored; returns whether it counted.
    pub fn record(&mut self, value: i64) -> bool {
        if value < self.min || value > self.max {
            return false;
        }
        let idx = ((i128::from(value) - i128::from(self.min)) / self.width) as usize;
        match self.buckets.get_mut(idx) {
            Some(bucket) => {
                bucket.count += 1;
                true
            }
            None => false,
        }
    }

    /// Build a histogram from samples in one go.
    pub fn from_samples(min: i64, max: i64, buckets: u32, samples: &[i64]) -> Self {
        let mut hist = Self::new(min, max, buckets);
        for &v in samples {
            hist.record(v);
        }
        hist
    }

    /// Buckets in ascending order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Width of every bucket except possibly the last.
    pub fn bucket_width(&self) -> i128 {
        self.width
    }

    /// Total samples counted.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// Keeps the most recent `capacity` samples.
#[derive(Clone, Debug)]
pub struct RollingWindow {
    capacity: usize,
    samples: VecDeque<i64>,
}

impl RollingWindow {
    /// Create a window holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Push a sample, evicting the oldest when full.
    pub fn push(&mut self, value: i64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples oldest first.
    pub fn to_vec(&self) -> Vec<i64> {
        self.samples.iter().copied().collect()
    }

    /// Summary of the current window.
    pub fn summary(&self) -> Option<Summary> {
        Summary::from_samples(&self.to_vec())
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
