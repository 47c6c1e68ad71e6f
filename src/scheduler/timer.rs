//! Timer kinds and the virtual-time tick schedule.
//!
//! Every simulator mutation is triggered by one of a fixed set of periodic
//! timers. [`TickSchedule`] replays those timers against a virtual clock so
//! a whole run can be simulated without sleeping. A timer first fires one
//! full period after the schedule starts, like a browser interval.

use std::time::Duration;

use crate::pipeline::{Stage, TickPeriods};

/// A periodic trigger of one simulator tick.
///
/// Variant order is the tie-break order when two timers are due at the
/// same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    Spawn,
    Review,
    Decide,
    Settle,
    EvictVerified,
    EvictFlagged,
    Cleanup,
}

impl TimerKind {
    /// All timer kinds in tie-break order.
    pub const ALL: [TimerKind; 7] = [
        TimerKind::Spawn,
        TimerKind::Review,
        TimerKind::Decide,
        TimerKind::Settle,
        TimerKind::EvictVerified,
        TimerKind::EvictFlagged,
        TimerKind::Cleanup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::Spawn => "spawn",
            TimerKind::Review => "review",
            TimerKind::Decide => "decide",
            TimerKind::Settle => "settle",
            TimerKind::EvictVerified => "evict_verified",
            TimerKind::EvictFlagged => "evict_flagged",
            TimerKind::Cleanup => "cleanup",
        }
    }

    /// Returns the terminal lanes an eviction timer trims.
    pub fn evicted_stages(&self) -> &'static [Stage] {
        match self {
            TimerKind::EvictVerified => &[Stage::Verified],
            TimerKind::EvictFlagged => &[Stage::Flagged],
            TimerKind::Cleanup => &[Stage::Verified, Stage::Flagged],
            _ => &[],
        }
    }

    /// Returns this timer's period, or `None` when it is disabled.
    pub fn period(&self, periods: &TickPeriods) -> Option<Duration> {
        match self {
            TimerKind::Spawn => Some(periods.spawn),
            TimerKind::Review => Some(periods.review),
            TimerKind::Decide => Some(periods.decide),
            TimerKind::Settle => periods.settle,
            TimerKind::EvictVerified => periods.evict_verified,
            TimerKind::EvictFlagged => periods.evict_flagged,
            TimerKind::Cleanup => periods.cleanup,
        }
    }

    /// Returns every enabled timer with its period, in tie-break order.
    pub fn enabled(periods: &TickPeriods) -> Vec<(TimerKind, Duration)> {
        Self::ALL
            .iter()
            .filter_map(|kind| kind.period(periods).map(|p| (*kind, p)))
            .collect()
    }
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct Timer {
    kind: TimerKind,
    period: Duration,
    next_due: Duration,
}

/// Deterministic ordering of timer firings on a virtual clock.
#[derive(Debug, Clone)]
pub struct TickSchedule {
    timers: Vec<Timer>,
}

impl TickSchedule {
    /// Creates a schedule whose timers first fire one period after `start`.
    ///
    /// Zero periods are ignored; configuration validation rejects them.
    pub fn from_periods(periods: &TickPeriods, start: Duration) -> Self {
        let timers = TimerKind::enabled(periods)
            .into_iter()
            .filter(|(_, period)| !period.is_zero())
            .map(|(kind, period)| Timer {
                kind,
                period,
                next_due: start + period,
            })
            .collect();
        Self { timers }
    }

    /// Returns the earliest due firing without consuming it.
    pub fn peek(&self) -> Option<(Duration, TimerKind)> {
        self.earliest().map(|i| {
            let timer = &self.timers[i];
            (timer.next_due, timer.kind)
        })
    }

    /// Consumes the earliest due firing and reschedules its timer.
    pub fn pop(&mut self) -> Option<(Duration, TimerKind)> {
        let i = self.earliest()?;
        let timer = &mut self.timers[i];
        let fired = (timer.next_due, timer.kind);
        timer.next_due += timer.period;
        Some(fired)
    }

    /// Consumes the earliest firing if it is due at or before `deadline`.
    pub fn pop_until(&mut self, deadline: Duration) -> Option<(Duration, TimerKind)> {
        match self.peek() {
            Some((due, _)) if due <= deadline => self.pop(),
            _ => None,
        }
    }

    /// Returns the number of enabled timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Returns whether no timer is enabled.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    fn earliest(&self) -> Option<usize> {
        // Timers are stored in tie-break order, so the first minimum wins.
        self.timers
            .iter()
            .enumerate()
            .min_by_key(|(i, t)| (t.next_due, *i))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_enabled_timers_per_profile() {
        let pipeline: Vec<TimerKind> = TimerKind::enabled(&TickPeriods::pipeline())
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            pipeline,
            vec![
                TimerKind::Spawn,
                TimerKind::Review,
                TimerKind::Decide,
                TimerKind::EvictVerified,
                TimerKind::EvictFlagged,
            ]
        );

        let looped: Vec<TimerKind> = TimerKind::enabled(&TickPeriods::looped())
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            looped,
            vec![
                TimerKind::Spawn,
                TimerKind::Review,
                TimerKind::Decide,
                TimerKind::Settle,
                TimerKind::Cleanup,
            ]
        );
    }

    #[test]
    fn test_schedule_orders_firings() {
        let mut schedule = TickSchedule::from_periods(&TickPeriods::pipeline(), Duration::ZERO);
        let firings: Vec<(u64, TimerKind)> = std::iter::from_fn(|| schedule.pop_until(ms(1400)))
            .map(|(at, kind)| (at.as_millis() as u64, kind))
            .collect();

        assert_eq!(
            firings,
            vec![
                (600, TimerKind::EvictVerified),
                (600, TimerKind::EvictFlagged),
                (700, TimerKind::Spawn),
                (900, TimerKind::Review),
                (1100, TimerKind::Decide),
                (1200, TimerKind::EvictVerified),
                (1200, TimerKind::EvictFlagged),
                (1400, TimerKind::Spawn),
            ]
        );
    }

    #[test]
    fn test_ties_follow_declaration_order() {
        let periods = TickPeriods {
            spawn: ms(100),
            review: ms(100),
            decide: ms(50),
            settle: None,
            evict_verified: None,
            evict_flagged: None,
            cleanup: Some(ms(100)),
        };
        let mut schedule = TickSchedule::from_periods(&periods, Duration::ZERO);
        let kinds: Vec<TimerKind> = std::iter::from_fn(|| schedule.pop_until(ms(100)))
            .map(|(_, kind)| kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TimerKind::Decide,
                TimerKind::Spawn,
                TimerKind::Review,
                TimerKind::Decide,
                TimerKind::Cleanup,
            ]
        );
    }

    #[test]
    fn test_schedule_starts_at_offset() {
        let mut schedule = TickSchedule::from_periods(&TickPeriods::looped(), ms(5000));
        assert_eq!(schedule.peek(), Some((ms(5800), TimerKind::Settle)));
        assert!(schedule.pop_until(ms(5799)).is_none());
        assert_eq!(schedule.pop(), Some((ms(5800), TimerKind::Settle)));
        assert_eq!(schedule.len(), 5);
    }

    #[test]
    fn test_eviction_stages() {
        assert_eq!(TimerKind::EvictVerified.evicted_stages(), &[Stage::Verified]);
        assert_eq!(
            TimerKind::Cleanup.evicted_stages(),
            &[Stage::Verified, Stage::Flagged]
        );
        assert!(TimerKind::Spawn.evicted_stages().is_empty());
    }
}
