//! Active highlight state.
//!
//! Lookups for a highlight event are not cancellable, so a slow batch can finish
//! after a newer one. Every request takes a ticket stamped with a monotonically
//! increasing generation; a batch that settles with an outdated ticket is discarded.

use crate::model::HighlightSet;
use tracing::debug;

/// Stamp identifying one highlight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HighlightTicket(u64);

impl HighlightTicket {
    /// Generation this ticket was issued for.
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// What happened when a batch settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The batch's highlight is now active.
    Applied,
    /// The batch resolved nothing; see [`HighlightState::preserves_on_failure`].
    NothingToHighlight,
    /// A newer request was issued meanwhile; the batch was ignored.
    Stale,
}

/// Currently displayed highlight plus the request generation counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightState {
    generation: u64,
    active: Option<HighlightSet>,
    preserve_on_failure: bool,
}

impl HighlightState {
    /// Create empty state.
    ///
    /// With `preserve_on_failure` false, a new request clears the old highlight up
    /// front, so a batch that resolves nothing leaves nothing highlighted. With it
    /// true, the old highlight stays until a batch actually resolves something.
    pub fn new(preserve_on_failure: bool) -> Self {
        Self {
            generation: 0,
            active: None,
            preserve_on_failure,
        }
    }

    /// Highlight currently shown, if any.
    pub fn active(&self) -> Option<&HighlightSet> {
        self.active.as_ref()
    }

    /// Whether a failed batch keeps the previous highlight.
    pub fn preserves_on_failure(&self) -> bool {
        self.preserve_on_failure
    }

    /// Start a new request, superseding any batch still in flight.
    #[must_use]
    pub fn begin(mut self) -> (Self, HighlightTicket) {
        self.generation += 1;
        if !self.preserve_on_failure {
            self.active = None;
        }
        let ticket = HighlightTicket(self.generation);
        (self, ticket)
    }

    /// Apply the result of the batch started with `ticket`.
    #[must_use]
    pub fn settle(
        mut self,
        ticket: HighlightTicket,
        outcome: Option<HighlightSet>,
    ) -> (Self, Settled) {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "Discarding stale highlight batch"
            );
            return (self, Settled::Stale);
        }
        match outcome {
            Some(set) => {
                self.active = Some(set);
                (self, Settled::Applied)
            }
            None => {
                if !self.preserve_on_failure {
                    self.active = None;
                }
                (self, Settled::NothingToHighlight)
            }
        }
    }

    /// Drop the active highlight without starting a new request.
    #[must_use]
    pub fn clear(mut self) -> Self {
        self.active = None;
        self
    }
}
