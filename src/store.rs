//! Gap-free, self-compressing sample history.
//!
//! The series runs newest first: index 0 is the live sample. Every stored time
//! key is a multiple of the current quantum and neighbouring keys differ by
//! exactly one quantum. A sample taken at `t` lands in the slot
//! `ceil(t / quantum) * quantum`, so historical slot `k` holds the last sample
//! seen in `(k - quantum, k]`.
//!
//! Memory stays bounded two ways. Samples older than the retention window are
//! dropped from the tail, and whenever the series outgrows the sample limit it
//! is thinned in place by the next factor of [`COMPRESSION_MULTIPLIERS`],
//! permanently coarsening the quantum.

use std::collections::VecDeque;

use log::{debug, info};

use crate::sample::{synthesize, Sample, TimeKey};

/// Most samples retained before compression fires.
pub const MAX_SAMPLES: usize = 600;
/// Samples older than this (relative to the newest) are pruned.
pub const RETENTION_SECONDS: u64 = 24 * 60 * 60;
/// Cyclic quantum multipliers. Starting from 1s the cumulative products are
/// 5s, 15s, 30s, 1m, 5m, 15m, 30m, 1h, 4h, 12h, 1d, 2d, 4d, 8d.
pub const COMPRESSION_MULTIPLIERS: [u64; 14] = [5, 3, 2, 2, 5, 3, 2, 2, 4, 3, 2, 2, 2, 2];

/// Size and age bounds of a [`SampleStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    pub max_samples: usize,
    pub retention_secs: u64,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_samples: MAX_SAMPLES,
            retention_secs: RETENTION_SECONDS,
        }
    }
}

/// What [`SampleStore::append`] did with a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The store was empty; the sample is now its only element.
    Initialized,
    /// The sample belongs to a slot older than the newest one and was dropped.
    Stale,
    /// The sample refreshed the newest slot.
    Overwritten,
    /// The sample opened a new slot after `filled` synthesized slots.
    Appended { filled: u64, compressed: bool },
}

#[derive(Debug, Clone)]
pub struct SampleStore {
    series: VecDeque<Sample>,
    quantum: u64,
    stage: usize,
    limits: StoreLimits,
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SampleStore {
    /// Create an empty store whose slots start `initial_quantum` seconds wide.
    pub fn new(initial_quantum: u64) -> Self {
        Self::with_limits(initial_quantum, StoreLimits::default())
    }

    pub fn with_limits(initial_quantum: u64, limits: StoreLimits) -> Self {
        Self {
            series: VecDeque::with_capacity(limits.max_samples + 1),
            quantum: initial_quantum.max(1),
            stage: 0,
            limits: StoreLimits {
                max_samples: limits.max_samples.max(1),
                retention_secs: limits.retention_secs,
            },
        }
    }

    /// Seconds represented by one slot.
    pub fn quantum(&self) -> u64 {
        self.quantum
    }

    /// Number of compressions performed so far.
    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// The live sample.
    pub fn newest(&self) -> Option<&Sample> {
        self.series.front()
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.series.back()
    }

    /// Sample at `index`, counting from the newest.
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.series.get(index)
    }

    pub fn series(&self) -> &VecDeque<Sample> {
        &self.series
    }

    /// Newest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator + '_ {
        self.series.iter()
    }

    /// Slot key a sample taken at `time_key` would occupy right now.
    pub fn slot_key(&self, time_key: TimeKey) -> TimeKey {
        align_up(time_key, self.quantum)
    }

    /// Add a sample, filling any missing slots with carry-forward copies of
    /// the newest sample first.
    pub fn append(&mut self, mut sample: Sample) -> AppendOutcome {
        let key = self.slot_key(sample.time_key);
        let top = match self.series.front() {
            Some(front) => front.time_key,
            None => {
                sample.time_key = key;
                self.series.push_front(sample);
                self.stage = 0;
                return AppendOutcome::Initialized;
            }
        };

        if key < top {
            debug!(
                "dropping stale sample: slot {} is older than newest slot {}",
                key, top
            );
            return AppendOutcome::Stale;
        }
        if key == top {
            sample.time_key = key;
            self.series[0] = sample;
            return AppendOutcome::Overwritten;
        }

        let mut filled = self.skip_expired(key);
        let mut compressed = false;
        loop {
            // The quantum may have grown during the previous iteration.
            let key = self.slot_key(sample.time_key);
            let top = self.series[0].time_key;
            if key <= top {
                sample.time_key = top;
                self.series[0] = sample;
                break;
            }
            if key - top == self.quantum {
                sample.time_key = key;
                self.series.push_front(sample);
                compressed |= self.settle();
                break;
            }
            let carried = synthesize(&self.series[0], top + self.quantum);
            self.series.push_front(carried);
            filled += 1;
            compressed |= self.settle();
        }

        if filled > 0 {
            debug!(
                "filled {} missing slot(s) before t={} (quantum {}s)",
                filled, self.series[0].time_key, self.quantum
            );
        }
        AppendOutcome::Appended { filled, compressed }
    }

    /// Run one compression step regardless of the current size.
    pub fn force_compress(&mut self) {
        if !self.series.is_empty() {
            self.compress();
        }
    }

    /// When the whole retained history is already outside the retention
    /// window of the incoming slot, restart the series from the window edge
    /// instead of synthesizing slots that would be pruned immediately.
    fn skip_expired(&mut self, key: TimeKey) -> u64 {
        let horizon = key.saturating_sub(self.limits.retention_secs);
        let top = self.series[0].time_key;
        let restart = self.slot_key(horizon);
        if restart <= top || restart >= key {
            return 0;
        }
        let carried = synthesize(&self.series[0], restart);
        self.series.clear();
        self.series.push_front(carried);
        debug!(
            "history expired during a {}s gap; restarting at t={}",
            key - top,
            restart
        );
        (restart - top) / self.quantum
    }

    /// Prune, then compress if over the limit. Returns whether it compressed.
    fn settle(&mut self) -> bool {
        self.prune();
        if self.series.len() > self.limits.max_samples {
            self.compress();
            true
        } else {
            false
        }
    }

    fn prune(&mut self) {
        let newest = match self.series.front() {
            Some(front) => front.time_key,
            None => return,
        };
        let cutoff = newest.saturating_sub(self.limits.retention_secs);
        while self.series.len() > 1 {
            match self.series.back() {
                Some(oldest) if oldest.time_key < cutoff => {
                    self.series.pop_back();
                }
                _ => break,
            }
        }
    }

    fn compress(&mut self) {
        let factor = COMPRESSION_MULTIPLIERS[self.stage % COMPRESSION_MULTIPLIERS.len()];
        let quantum = self.quantum * factor;
        let before = self.series.len();

        let mut old = std::mem::take(&mut self.series).into_iter();
        let mut kept = VecDeque::with_capacity(self.limits.max_samples + 1);
        if let Some(mut newest) = old.next() {
            newest.time_key = align_up(newest.time_key, quantum);
            kept.push_back(newest);
        }
        kept.extend(old.filter(|s| s.time_key % quantum == 0));

        self.series = kept;
        self.quantum = quantum;
        self.stage += 1;
        info!(
            "compressed history x{}: {} -> {} samples, quantum now {}s",
            factor,
            before,
            self.series.len(),
            self.quantum
        );
    }
}

fn align_up(value: u64, step: u64) -> u64 {
    value.div_ceil(step) * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_bucket_end() {
        assert_eq!(align_up(0, 5), 0);
        assert_eq!(align_up(1, 5), 5);
        assert_eq!(align_up(5, 5), 5);
        assert_eq!(align_up(6, 5), 10);
        assert_eq!(align_up(17, 1), 17);
    }

    #[test]
    fn compress_rekeys_unaligned_newest() {
        let mut store = SampleStore::new(1);
        for t in 1..=13 {
            store.append(Sample::from_fields(t, [("x", t)]));
        }
        store.force_compress();
        assert_eq!(store.quantum(), 5);
        let keys: Vec<u64> = store.iter().map(|s| s.time_key).collect();
        assert_eq!(keys, [15, 10, 5]);
        assert_eq!(store.newest().and_then(|s| s.get("x")), Some(13));
    }
}
