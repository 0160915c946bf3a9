//! Bounded per-endpoint probe history.
//!
//! Each monitor keeps an insertion-ordered ring of probe outcomes. Appending
//! at capacity evicts the oldest entry, so memory per endpoint is fixed.
//! The ring is owned by the monitor actor; append and snapshot both run on
//! that task, which rules out torn reads without any locking.

use std::collections::VecDeque;

use chrono::{Duration, Utc};

use crate::probe::ProbeOutcome;

/// Default maximum retained outcomes per endpoint.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Time window filter for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    LastHour,
    LastSixHours,
    LastDay,
    LastWeek,
}

impl HistoryRange {
    /// Parse a query-string token. Unrecognized tokens mean "no filter" to
    /// callers, so this returns an `Option` rather than an error.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "1h" => Some(HistoryRange::LastHour),
            "6h" => Some(HistoryRange::LastSixHours),
            "24h" => Some(HistoryRange::LastDay),
            "7d" => Some(HistoryRange::LastWeek),
            _ => None,
        }
    }

    fn window(self) -> Duration {
        match self {
            HistoryRange::LastHour => Duration::hours(1),
            HistoryRange::LastSixHours => Duration::hours(6),
            HistoryRange::LastDay => Duration::hours(24),
            HistoryRange::LastWeek => Duration::days(7),
        }
    }
}

/// Capacity-bounded, insertion-ordered log of probe outcomes.
#[derive(Debug, Clone)]
pub struct HistoryRing {
    entries: VecDeque<ProbeOutcome>,
    capacity: usize,
}

impl HistoryRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild a ring from persisted entries, keeping the most recent
    /// `capacity` outcomes when the stored history is larger.
    pub fn restore(capacity: usize, entries: Vec<ProbeOutcome>) -> Self {
        let mut ring = Self::new(capacity);
        for outcome in entries {
            ring.append(outcome);
        }
        ring
    }

    /// Append an outcome, evicting the oldest entry when at capacity.
    pub fn append(&mut self, outcome: ProbeOutcome) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(outcome);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy out the retained outcomes, oldest first.
    ///
    /// `range` keeps only outcomes with `timestamp >= now - range`; `limit`
    /// then truncates to the most recent entries. Both filters preserve the
    /// original chronological order.
    pub fn snapshot(&self, range: Option<HistoryRange>, limit: Option<usize>) -> Vec<ProbeOutcome> {
        let mut outcomes: Vec<ProbeOutcome> = match range {
            Some(range) => {
                let cutoff = Utc::now() - range.window();
                self.entries
                    .iter()
                    .filter(|outcome| outcome.timestamp >= cutoff)
                    .cloned()
                    .collect()
            }
            None => self.entries.iter().cloned().collect(),
        };

        if let Some(limit) = limit
            && outcomes.len() > limit
        {
            outcomes.drain(..outcomes.len() - limit);
        }

        outcomes
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
