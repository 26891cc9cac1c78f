// Rolling series domain model - bounded windows sharing a time axis
use super::metric::ParsedSample;
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_WINDOW: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingStats {
    pub min: f64,
    pub max: f64,
}

impl RollingStats {
    /// Min/max over `values`, skipping NaN. `None` when nothing is left to compare.
    pub fn compute(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some(Self { min: v, max: v }),
                Some(stats) => Some(Self {
                    min: stats.min.min(v),
                    max: stats.max.max(v),
                }),
            })
    }
}

/// Fixed-capacity FIFO of samples for one metric
#[derive(Debug, Clone)]
pub struct RollingSeries {
    samples: VecDeque<ParsedSample>,
    capacity: usize,
}

impl RollingSeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append at the tail, returning the evicted head once over capacity
    pub fn push(&mut self, sample: ParsedSample) -> Option<ParsedSample> {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedSample> {
        self.samples.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }

    pub fn latest(&self) -> Option<&ParsedSample> {
        self.samples.back()
    }

    /// Recomputed over the whole window on every call
    pub fn stats(&self) -> Option<RollingStats> {
        RollingStats::compute(self.values())
    }
}

/// Several series plotted against one shared time axis.
///
/// Every row appends one label and exactly one sample per series, so the axis
/// and all series always have the same length.
#[derive(Debug, Clone)]
pub struct SeriesWindow {
    labels: VecDeque<String>,
    columns: Vec<RollingSeries>,
    capacity: usize,
}

impl SeriesWindow {
    pub fn new(width: usize, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            labels: VecDeque::with_capacity(capacity),
            columns: (0..width).map(|_| RollingSeries::new(capacity)).collect(),
            capacity,
        }
    }

    /// Append one row. Missing trailing samples are filled with gaps and
    /// extra ones are dropped.
    pub fn push_row(&mut self, label: impl Into<String>, row: Vec<ParsedSample>) {
        self.labels.push_back(label.into());
        if self.labels.len() > self.capacity {
            self.labels.pop_front();
        }

        let mut row = row.into_iter();
        for column in &mut self.columns {
            column.push(row.next().unwrap_or_else(ParsedSample::gap));
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn column(&self, index: usize) -> Option<&RollingSeries> {
        self.columns.get(index)
    }

    pub fn columns(&self) -> &[RollingSeries] {
        &self.columns
    }
}
