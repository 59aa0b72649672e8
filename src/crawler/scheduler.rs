//! Crawl termination state machine
//!
//! The scheduler owns the decision of when a crawl ends. It is a pure state
//! machine driven by events the coordinator observes (watchdog firing,
//! budget exhaustion, the frontier running dry), so every transition can be
//! tested without a clock or a network.
//!
//! ```text
//!            FrontierExhausted              GraceElapsed { work_pending: false }
//! Running ─────────────────────▶ Draining ──────────────────────────────▶ Terminated(Completed)
//!    ▲                              │
//!    └──────────────────────────────┘
//!        GraceElapsed { work_pending: true }
//!
//! Running | Draining ── BudgetExhausted ──▶ Terminated(BudgetExceeded)
//! Running | Draining ── IdleTimeout ──────▶ Terminated(IdleTimeout)
//! ```

use crate::state::TerminationReason;
use std::time::Duration;

/// Pause between seeing the frontier exhausted and declaring the crawl done
pub const DRAIN_GRACE: Duration = Duration::from_millis(50);

/// Lifecycle phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Workers are fetching
    Running,

    /// The frontier looked exhausted; waiting to confirm
    Draining,

    /// The crawl is over; absorbing
    Terminated(TerminationReason),
}

impl CrawlPhase {
    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated(_))
    }
}

/// Observations that drive the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// The reported error count reached the maximum
    BudgetExhausted,

    /// The idle watchdog fired
    IdleTimeout,

    /// Nothing queued and no worker mid-fetch
    FrontierExhausted,

    /// The drain grace period ended
    GraceElapsed {
        /// Whether new work appeared during the grace period
        work_pending: bool,
    },
}

/// Termination state machine
#[derive(Debug, Clone)]
pub struct Scheduler {
    phase: CrawlPhase,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Running,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Applies an event and returns the resulting phase
    pub fn handle(&mut self, event: SchedulerEvent) -> CrawlPhase {
        use CrawlPhase::*;
        use SchedulerEvent::*;

        if self.phase.is_terminated() {
            return self.phase;
        }

        let next = match (self.phase, event) {
            (_, BudgetExhausted) => Terminated(TerminationReason::BudgetExceeded),
            (_, IdleTimeout) => Terminated(TerminationReason::IdleTimeout),
            (Running, FrontierExhausted) => Draining,
            (Draining, GraceElapsed { work_pending: false }) => {
                Terminated(TerminationReason::Completed)
            }
            (Draining, GraceElapsed { work_pending: true }) => Running,
            (phase, _) => phase,
        };

        if next != self.phase {
            tracing::debug!("Scheduler: {:?} -> {:?} on {:?}", self.phase, next, event);
        }
        self.phase = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_running() {
        let scheduler = Scheduler::new();
        assert_eq!(scheduler.phase(), CrawlPhase::Running);
        assert!(!scheduler.phase().is_terminated());
    }

    #[test]
    fn test_budget_terminates() {
        let mut scheduler = Scheduler::new();
        assert_eq!(
            scheduler.handle(SchedulerEvent::BudgetExhausted),
            CrawlPhase::Terminated(TerminationReason::BudgetExceeded)
        );
    }

    #[test]
    fn test_idle_terminates_from_draining() {
        let mut scheduler = Scheduler::new();
        scheduler.handle(SchedulerEvent::FrontierExhausted);
        assert_eq!(
            scheduler.handle(SchedulerEvent::IdleTimeout),
            CrawlPhase::Terminated(TerminationReason::IdleTimeout)
        );
    }

    #[test]
    fn test_drain_completes() {
        let mut scheduler = Scheduler::new();
        assert_eq!(
            scheduler.handle(SchedulerEvent::FrontierExhausted),
            CrawlPhase::Draining
        );
        assert_eq!(
            scheduler.handle(SchedulerEvent::GraceElapsed {
                work_pending: false
            }),
            CrawlPhase::Terminated(TerminationReason::Completed)
        );
    }

    #[test]
    fn test_drain_resumes_when_work_appears() {
        let mut scheduler = Scheduler::new();
        scheduler.handle(SchedulerEvent::FrontierExhausted);
        assert_eq!(
            scheduler.handle(SchedulerEvent::GraceElapsed { work_pending: true }),
            CrawlPhase::Running
        );
    }

    #[test]
    fn test_grace_ignored_while_running() {
        let mut scheduler = Scheduler::new();
        assert_eq!(
            scheduler.handle(SchedulerEvent::GraceElapsed {
                work_pending: false
            }),
            CrawlPhase::Running
        );
    }

    #[test]
    fn test_terminated_is_absorbing() {
        let mut scheduler = Scheduler::new();
        scheduler.handle(SchedulerEvent::IdleTimeout);

        for event in [
            SchedulerEvent::BudgetExhausted,
            SchedulerEvent::FrontierExhausted,
            SchedulerEvent::GraceElapsed {
                work_pending: false,
            },
            SchedulerEvent::GraceElapsed { work_pending: true },
        ] {
            assert_eq!(
                scheduler.handle(event),
                CrawlPhase::Terminated(TerminationReason::IdleTimeout)
            );
        }
    }
}
