//! Named tick counters.
//!
//! Timers are created (or restarted) by `add_timer` actions and read by
//! timer conditions. Every timer in the table advances by one on every
//! tick, unconditionally, before conditions are evaluated.

use std::collections::BTreeMap;

/// Table of named counters, each counting ticks since it was (re)started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerTable {
    timers: BTreeMap<String, u64>,
}

impl TimerTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            timers: BTreeMap::new(),
        }
    }

    /// Set the named timer to zero, creating it if needed.
    ///
    /// Returns `true` when a timer of that name already existed and was
    /// overwritten.
    pub fn start(&mut self, name: &str) -> bool {
        self.timers.insert(name.to_owned(), 0).is_some()
    }

    /// Advance every timer by one tick.
    pub fn advance_all(&mut self) {
        for value in self.timers.values_mut() {
            *value = value.saturating_add(1);
        }
    }

    /// Current value of the named timer.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.timers.get(name).copied()
    }

    /// Whether the named timer exists.
    pub fn contains(&self, name: &str) -> bool {
        self.timers.contains_key(name)
    }

    /// Remove every timer.
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Number of timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.timers.iter().map(|(name, &value)| (name.as_str(), value))
    }
}
