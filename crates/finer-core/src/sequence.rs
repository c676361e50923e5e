//! Per-slice request sequencing.
//!
//! Every AI call for a slice takes a ticket with a monotonically increasing
//! number. Only the holder of the latest ticket may write its response;
//! anything older is stale and is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use strum::{Display, EnumIter};

/// A part of the document written by exactly one kind of AI call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Slice {
    SeedChat,
    SeedRefine,
    Design,
    LiteratureQueries,
    LiteratureBackground,
    Analysis,
    Proposal,
}

/// What became of a step action's response.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    /// The response was the latest for its slice and was written.
    Applied(T),
    /// A newer request for the same slice was issued first.
    Discarded,
}

impl<T> StepOutcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(v) => Some(v),
            Self::Discarded => None,
        }
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded)
    }
}

#[derive(Debug, Default)]
struct SliceState {
    latest: u64,
    outstanding: bool,
}

/// Issues tickets. Cloning shares the counters.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    slices: Arc<Mutex<HashMap<Slice, SliceState>>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Slice, SliceState>> {
        // Counters stay consistent even if a holder panicked.
        self.slices.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Starts a request for `slice`, superseding any in flight.
    pub fn issue(&self, slice: Slice) -> Ticket {
        let mut slices = self.lock();
        let state = slices.entry(slice).or_default();
        state.latest += 1;
        state.outstanding = true;
        tracing::debug!("[Sequencer] {} ticket #{}", slice, state.latest);
        Ticket {
            slice,
            seq: state.latest,
            sequencer: self.clone(),
        }
    }

    /// True while the latest ticket for `slice` has not been dropped.
    pub fn is_busy(&self, slice: Slice) -> bool {
        self.lock().get(&slice).is_some_and(|s| s.outstanding)
    }

    pub fn latest(&self, slice: Slice) -> u64 {
        self.lock().get(&slice).map_or(0, |s| s.latest)
    }

    fn finish(&self, slice: Slice, seq: u64) {
        if let Some(state) = self.lock().get_mut(&slice) {
            if state.latest == seq {
                state.outstanding = false;
            }
        }
    }
}

/// Proof of an issued request. Dropping it ends the request.
#[derive(Debug)]
pub struct Ticket {
    slice: Slice,
    seq: u64,
    sequencer: RequestSequencer,
}

impl Ticket {
    pub fn slice(&self) -> Slice {
        self.slice
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Whether no newer ticket has been issued for this slice.
    pub fn is_current(&self) -> bool {
        self.sequencer.latest(self.slice) == self.seq
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.sequencer.finish(self.slice, self.seq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes() {
        let seq = RequestSequencer::new();
        let first = seq.issue(Slice::Design);
        let second = seq.issue(Slice::Design);
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(second.seq(), 2);
    }

    #[test]
    fn test_slices_are_independent() {
        let seq = RequestSequencer::new();
        let design = seq.issue(Slice::Design);
        let _analysis = seq.issue(Slice::Analysis);
        assert!(design.is_current());
    }

    #[test]
    fn test_busy_until_latest_dropped() {
        let seq = RequestSequencer::new();
        assert!(!seq.is_busy(Slice::Proposal));

        let first = seq.issue(Slice::Proposal);
        let second = seq.issue(Slice::Proposal);
        drop(first);
        assert!(seq.is_busy(Slice::Proposal));
        drop(second);
        assert!(!seq.is_busy(Slice::Proposal));
    }

    #[test]
    fn test_outcome_helpers() {
        assert_eq!(StepOutcome::Applied(3).applied(), Some(3));
        assert!(StepOutcome::<()>::Discarded.is_discarded());
    }

    #[test]
    fn test_slice_names() {
        assert_eq!(Slice::LiteratureQueries.to_string(), "literature-queries");
    }
}
