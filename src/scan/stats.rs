//! Per-session check-in counters

use std::fmt;

use super::state::ScanEvent;
use crate::checkin::{CheckinOutcome, CheckinResponse};

/// What kind of event was fed to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Decoded,
    Accepted,
    Rejected,
    Unreachable,
    ResumeElapsed,
}

impl EventKind {
    pub fn of(event: &ScanEvent) -> Self {
        match event {
            ScanEvent::Decoded(_) => EventKind::Decoded,
            ScanEvent::Responded { outcome, .. } => match outcome {
                CheckinOutcome::Answered(CheckinResponse::Accepted(_)) => EventKind::Accepted,
                CheckinOutcome::Answered(CheckinResponse::Rejected { .. }) => EventKind::Rejected,
                CheckinOutcome::Unreachable(_) => EventKind::Unreachable,
            },
            ScanEvent::ResumeElapsed { .. } => EventKind::ResumeElapsed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStatistics {
    pub cycles: usize,
    pub completed: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub unreachable: usize,
    pub ignored: usize,
}

impl ScanStatistics {
    pub fn record(&mut self, kind: EventKind, ignored: bool) {
        if ignored {
            self.ignored += 1;
            return;
        }
        match kind {
            EventKind::Decoded => self.cycles += 1,
            EventKind::Accepted => self.accepted += 1,
            EventKind::Rejected => self.rejected += 1,
            EventKind::Unreachable => self.unreachable += 1,
            EventKind::ResumeElapsed => self.completed += 1,
        }
    }
}

impl fmt::Display for ScanStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scan(s): {} accepted, {} rejected, {} unreachable",
            self.cycles, self.accepted, self.rejected, self.unreachable
        )?;
        if self.ignored > 0 {
            write!(f, ", {} ignored event(s)", self.ignored)?;
        }
        Ok(())
    }
}
