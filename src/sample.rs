//! One polled set of named counters.
//!
//! A [`Sample`] is immutable once handed to the store, apart from the store
//! rewriting its time key to the slot it occupies. Gap filling never shares
//! state with the original: [`synthesize`] returns an independent copy.

use chrono::{DateTime, Local};

/// Integer seconds elapsed since the store (or its source) started.
pub type TimeKey = u64;

/// Named counter values captured at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Elapsed seconds; rewritten to the slot key when stored.
    pub time_key: TimeKey,
    /// Wall-clock time of the read, for display only.
    pub wall_clock: Option<DateTime<Local>>,
    /// True when the store fabricated this sample to fill a gap.
    pub synthetic: bool,
    fields: Vec<(String, u64)>,
}

impl Sample {
    pub fn new(time_key: TimeKey) -> Self {
        Self {
            time_key,
            wall_clock: None,
            synthetic: false,
            fields: Vec::new(),
        }
    }

    /// Build a sample from `(name, value)` pairs, keeping their order.
    pub fn from_fields<I, S>(time_key: TimeKey, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut sample = Self::new(time_key);
        for (name, value) in fields {
            sample.set(name, value);
        }
        sample
    }

    pub fn with_wall_clock(mut self, at: DateTime<Local>) -> Self {
        self.wall_clock = Some(at);
        self
    }

    /// Set a field, replacing an existing value of the same name.
    pub fn set<S: Into<String>>(&mut self, name: S, value: u64) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.fields.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Carry `previous` forward to `time_key`.
///
/// The result has the same field values and wall clock as `previous`, the new
/// time key, and is marked synthetic.
pub fn synthesize(previous: &Sample, time_key: TimeKey) -> Sample {
    Sample {
        time_key,
        wall_clock: previous.wall_clock,
        synthetic: true,
        fields: previous.fields.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_existing_field() {
        let mut s = Sample::from_fields(3, [("MemTotal", 10), ("MemFree", 4)]);
        s.set("MemFree", 5);
        assert_eq!(s.len(), 2);
        assert_eq!(s.get("MemFree"), Some(5));
        assert_eq!(s.field_names().collect::<Vec<_>>(), ["MemTotal", "MemFree"]);
    }

    #[test]
    fn synthesize_copies_values_only() {
        let original = Sample::from_fields(7, [("Cached", 42)]);
        let mut copy = synthesize(&original, 8);
        assert_eq!(copy.time_key, 8);
        assert!(copy.synthetic);
        assert_eq!(copy.get("Cached"), Some(42));

        copy.set("Cached", 1);
        assert_eq!(original.get("Cached"), Some(42));
        assert!(!original.synthetic);
    }
}
