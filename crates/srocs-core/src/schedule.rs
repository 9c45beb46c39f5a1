//! Pending action schedule: target tick to scheduled actions.
//!
//! A multi-map ordered by target tick. Occurrences sharing a tick keep
//! their insertion order, which is the order conditions were evaluated and
//! actions listed, so dispatch is reproducible run to run. The same action
//! may appear any number of times; each occurrence executes separately.

use std::collections::BTreeMap;

use crate::action::ActionId;

/// Time-ordered queue of scheduled action occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSchedule {
    entries: BTreeMap<u64, Vec<ActionId>>,
    len: usize,
}

impl PendingSchedule {
    /// Create an empty schedule.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            len: 0,
        }
    }

    /// Schedule one occurrence of `action` at `tick`.
    pub fn insert(&mut self, tick: u64, action: ActionId) {
        self.entries.entry(tick).or_default().push(action);
        self.len = self.len.saturating_add(1);
    }

    /// Remove and return every occurrence due at or before `tick`, earliest
    /// first.
    ///
    /// Under a clock that advances by exactly one per step this is the set
    /// of occurrences targeting `tick` itself.
    pub fn take_due(&mut self, tick: u64) -> Vec<ActionId> {
        let later = match tick.checked_add(1) {
            Some(next) => self.entries.split_off(&next),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.entries, later);
        let actions: Vec<ActionId> = due.into_values().flatten().collect();
        self.len = self.len.saturating_sub(actions.len());
        actions
    }

    /// Occurrences scheduled for exactly `tick`, without removing them.
    pub fn at(&self, tick: u64) -> &[ActionId] {
        self.entries.get(&tick).map(Vec::as_slice).unwrap_or_default()
    }

    /// Earliest tick with a pending occurrence.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.keys().next().copied()
    }

    /// Drop every pending occurrence.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
    }

    /// Total number of pending occurrences.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is pending.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_due_returns_only_current_tick() {
        let mut schedule = PendingSchedule::new();
        schedule.insert(5, ActionId(0));
        schedule.insert(6, ActionId(1));
        schedule.insert(5, ActionId(2));

        assert_eq!(schedule.take_due(5), vec![ActionId(0), ActionId(2)]);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.next_due(), Some(6));
        assert!(schedule.take_due(5).is_empty());
        assert_eq!(schedule.take_due(6), vec![ActionId(1)]);
        assert!(schedule.is_empty());
    }

    #[test]
    fn duplicate_occurrences_are_kept() {
        let mut schedule = PendingSchedule::new();
        schedule.insert(3, ActionId(4));
        schedule.insert(3, ActionId(4));
        assert_eq!(schedule.at(3), &[ActionId(4), ActionId(4)]);
        assert_eq!(schedule.take_due(3).len(), 2);
    }

    #[test]
    fn clear_drops_everything() {
        let mut schedule = PendingSchedule::new();
        schedule.insert(1, ActionId(0));
        schedule.insert(9, ActionId(1));
        schedule.clear();
        assert!(schedule.is_empty());
        assert_eq!(schedule.next_due(), None);
        assert!(schedule.at(9).is_empty());
    }

    #[test]
    fn max_tick_is_reachable() {
        let mut schedule = PendingSchedule::new();
        schedule.insert(u64::MAX, ActionId(0));
        assert_eq!(schedule.take_due(u64::MAX), vec![ActionId(0)]);
    }
}
