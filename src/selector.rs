//! Choosing which stored samples become display columns.
//!
//! Two modes are supported. Uniform selection spreads the columns evenly over
//! the whole history and always follows the live edge. Fixed-interval
//! selection shows one column per interval boundary; its historical columns
//! stay put until the next boundary is crossed and can be panned through
//! history with [`PanCommand`]s.
//!
//! Columns are always returned oldest first and end with the live sample.

use std::collections::VecDeque;

use log::debug;

use crate::sample::{Sample, TimeKey};
use crate::store::SampleStore;

/// User request to move the fixed-interval view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanCommand {
    Leftmost,
    Rightmost,
    StepOlder,
    StepNewer,
    JumpOlder,
    JumpNewer,
}

impl PanCommand {
    /// Key binding used by the dashboard: `[ ] < > { }`.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '[' => Some(Self::Leftmost),
            ']' => Some(Self::Rightmost),
            '<' => Some(Self::StepOlder),
            '>' => Some(Self::StepNewer),
            '{' => Some(Self::JumpOlder),
            '}' => Some(Self::JumpNewer),
            _ => None,
        }
    }
}

/// Whether the fixed-interval view follows new data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Live,
    Pinned,
}

/// Rightmost historical column, resolved against the current store layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub index: usize,
    pub time_key: TimeKey,
}

/// Legal anchor positions for one selection call.
///
/// Positions are `rightmost.index + n * step_slots` for `n` in
/// `0..=max_steps`; the leftmost position still fills a whole page of
/// historical columns when the store is long enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorRange {
    pub rightmost: Anchor,
    pub max_steps: usize,
    pub step_slots: usize,
    pub interval: u64,
}

impl AnchorRange {
    /// Legal range for `interval_secs` and `column_budget`, or `None` when no
    /// historical column can be shown.
    pub fn compute(store: &SampleStore, interval_secs: u64, column_budget: usize) -> Option<Self> {
        if store.len() < 2 || column_budget < 2 {
            return None;
        }
        let quantum = store.quantum();
        let interval = effective_interval(interval_secs, quantum);
        let step_slots = (interval / quantum) as usize;

        let live_key = store.newest()?.time_key;
        let right_key = (live_key.checked_sub(1)? / interval) * interval;
        let right_index = ((live_key - right_key) / quantum) as usize;
        if right_index >= store.len() {
            return None;
        }
        debug_assert_eq!(store.get(right_index).map(|s| s.time_key), Some(right_key));

        let positions = (store.len() - 1 - right_index) / step_slots + 1;
        Some(Self {
            rightmost: Anchor {
                index: right_index,
                time_key: right_key,
            },
            max_steps: positions.saturating_sub(column_budget - 1),
            step_slots,
            interval,
        })
    }

    pub fn leftmost(&self) -> Anchor {
        self.at(self.max_steps)
    }

    /// Anchor `steps` intervals older than the rightmost, clamped.
    pub fn at(&self, steps: usize) -> Anchor {
        let steps = steps.min(self.max_steps);
        Anchor {
            index: self.rightmost.index + steps * self.step_slots,
            time_key: self.rightmost.time_key - steps as u64 * self.interval,
        }
    }

    fn steps_of(&self, anchor: Anchor) -> usize {
        (anchor.index.saturating_sub(self.rightmost.index) / self.step_slots).min(self.max_steps)
    }

    /// Apply one pan command; `jump_steps` is the size of a jump.
    pub fn pan(&self, anchor: Anchor, command: PanCommand, jump_steps: usize) -> Anchor {
        let steps = self.steps_of(anchor);
        match command {
            PanCommand::Leftmost => self.leftmost(),
            PanCommand::Rightmost => self.rightmost,
            PanCommand::StepOlder => self.at(steps + 1),
            PanCommand::StepNewer => self.at(steps.saturating_sub(1)),
            PanCommand::JumpOlder => self.at(steps + jump_steps),
            PanCommand::JumpNewer => self.at(steps.saturating_sub(jump_steps)),
        }
    }
}

/// Interval actually used for a requested interval at the given quantum:
/// the smallest multiple of `quantum` not below `interval_secs`.
pub fn effective_interval(interval_secs: u64, quantum: u64) -> u64 {
    let quantum = quantum.max(1);
    interval_secs.div_ceil(quantum).max(1) * quantum
}

/// Re-locate a pinned anchor by time key and clamp it into `range`.
pub fn resolve_anchor(time_key: TimeKey, range: &AnchorRange) -> Anchor {
    if time_key >= range.rightmost.time_key {
        return range.rightmost;
    }
    let behind = range.rightmost.time_key - time_key;
    range.at(div_round_even(behind, range.interval) as usize)
}

/// Steps moved by a jump: about an eighth of the history.
pub fn jump_steps(store_len: usize, step_slots: usize) -> usize {
    let eighth = div_round_even(store_len as u64, 8) as usize;
    (eighth / step_slots.max(1)).max(1)
}

/// Indices (newest-first numbering) picked by uniform selection, in display
/// order. Index `k` of `budget` is `round(k * (len-1) / (budget-1))`.
pub fn uniform_indices(store_len: usize, column_budget: usize) -> Vec<usize> {
    if store_len == 0 || column_budget == 0 {
        return Vec::new();
    }
    if store_len <= column_budget {
        return (0..store_len).rev().collect();
    }
    if column_budget == 1 {
        return vec![0];
    }
    let span = (store_len - 1) as u64;
    let denom = (column_budget - 1) as u64;
    (0..column_budget as u64)
        .rev()
        .map(|k| div_round_even(k * span, denom) as usize)
        .collect()
}

/// `n / d` rounded to nearest, ties to even.
fn div_round_even(n: u64, d: u64) -> u64 {
    let q = n / d;
    let r = n % d;
    match (2 * r).cmp(&d) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q & 1),
    }
}

/// Per-session column selection state: an optional pin plus queued pans.
#[derive(Debug, Clone, Default)]
pub struct ColumnSelector {
    pin: Option<TimeKey>,
    pending: VecDeque<PanCommand>,
}

impl ColumnSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a pan for the next fixed-interval selection.
    pub fn queue_pan(&mut self, command: PanCommand) {
        self.pending.push_back(command);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Time key of the pinned rightmost historical column, if any.
    pub fn pin(&self) -> Option<TimeKey> {
        self.pin
    }

    pub fn state(&self) -> ViewState {
        if self.pin.is_some() {
            ViewState::Pinned
        } else {
            ViewState::Live
        }
    }

    /// Forget the pin and any queued pans.
    pub fn reset(&mut self) {
        self.pin = None;
        self.pending.clear();
    }

    /// Spread up to `column_budget` columns evenly over the whole history.
    pub fn select_uniform<'a>(&mut self, store: &'a SampleStore, column_budget: usize) -> Vec<&'a Sample> {
        self.reset();
        let series = store.series();
        uniform_indices(series.len(), column_budget)
            .into_iter()
            .map(|i| &series[i])
            .collect()
    }

    /// One column per `interval_secs` boundary, ending with the live sample.
    ///
    /// Historical columns are anchored at the pinned position if one exists,
    /// otherwise at the newest boundary strictly older than the live sample.
    /// Queued pans are applied in order. A mode change drops both the pin and
    /// the queued pans.
    pub fn select_fixed_interval<'a>(
        &mut self,
        store: &'a SampleStore,
        interval_secs: u64,
        column_budget: usize,
        mode_changed: bool,
    ) -> Vec<&'a Sample> {
        if mode_changed {
            self.reset();
        }
        let live = match store.newest() {
            Some(live) => live,
            None => {
                self.reset();
                return Vec::new();
            }
        };
        let range = match AnchorRange::compute(store, interval_secs, column_budget) {
            Some(range) => range,
            None => {
                self.reset();
                return vec![live];
            }
        };

        let mut anchor = match self.pin {
            Some(time_key) => resolve_anchor(time_key, &range),
            None => range.rightmost,
        };
        let jump = jump_steps(store.len(), range.step_slots);
        while let Some(command) = self.pending.pop_front() {
            anchor = range.pan(anchor, command, jump);
            debug!("pan {:?} -> anchor t={}", command, anchor.time_key);
        }

        let series = store.series();
        let mut columns: Vec<&Sample> = (0..column_budget - 1)
            .map(|n| anchor.index + n * range.step_slots)
            .take_while(|&i| i < series.len())
            .map(|i| &series[i])
            .collect();
        columns.reverse();
        columns.push(live);

        self.pin = if anchor == range.rightmost {
            None
        } else {
            Some(anchor.time_key)
        };
        columns
    }
}
