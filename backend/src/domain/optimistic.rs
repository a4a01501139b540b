//! Optimistic update controller for interactive toggles.
//!
//! Models the client-side reconciliation loop as a pure state machine so the
//! behaviour is testable without a UI: a user action applies its tentative
//! state immediately, the server call resolves later, and the controller
//! either keeps the tentative value (correcting it if the authoritative
//! result differs) or rolls back to the snapshot taken before the action.
//!
//! A second trigger while a call is in flight is ignored, not queued; that
//! matches the interactive controls this models, where the button is simply
//! unresponsive until the first call settles.

/// Lifecycle of one optimistic update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No update in flight.
    Idle,
    /// Tentative state applied, awaiting the server result.
    Pending,
    /// Server confirmed; the visible state is authoritative.
    Committed,
    /// Server failed; the snapshot was restored.
    RolledBack,
}

/// Outcome of attempting to begin an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Begin {
    /// The tentative state was applied and a snapshot retained.
    Applied,
    /// An update is already in flight; the trigger was ignored.
    Ignored,
}

/// Optimistic controller over a cloneable view state.
///
/// # Examples
/// ```
/// use cheerfeed_backend::domain::optimistic::{Begin, OptimisticToggle};
///
/// // A cheer button: (is_cheered, count).
/// let mut control = OptimisticToggle::new((false, 3));
/// assert_eq!(control.begin((true, 4)), Begin::Applied);
/// assert_eq!(*control.state(), (true, 4));
/// // Server disagrees (a concurrent toggle landed first): correct in place.
/// control.commit(Some((false, 3)));
/// assert_eq!(*control.state(), (false, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticToggle<S: Clone> {
    state: S,
    snapshot: Option<S>,
    phase: Phase,
}

impl<S: Clone> OptimisticToggle<S> {
    /// Create a controller in the idle phase with the given visible state.
    #[must_use]
    pub fn new(state: S) -> Self {
        Self {
            state,
            snapshot: None,
            phase: Phase::Idle,
        }
    }

    /// Currently visible state.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Apply a tentative state and retain a snapshot of the prior one.
    ///
    /// Returns [`Begin::Ignored`] without touching the state when an update
    /// is already pending. Committed and rolled-back controllers accept a
    /// fresh update.
    pub fn begin(&mut self, tentative: S) -> Begin {
        if self.phase == Phase::Pending {
            return Begin::Ignored;
        }
        self.snapshot = Some(self.state.clone());
        self.state = tentative;
        self.phase = Phase::Pending;
        Begin::Applied
    }

    /// Resolve the in-flight update with the server's result.
    ///
    /// `authoritative` overrides the tentative state when the server's view
    /// differs (for example after racing toggles); `None` keeps it. Outside
    /// the pending phase this is a no-op.
    pub fn commit(&mut self, authoritative: Option<S>) {
        if self.phase != Phase::Pending {
            return;
        }
        if let Some(value) = authoritative {
            self.state = value;
        }
        self.snapshot = None;
        self.phase = Phase::Committed;
    }

    /// Restore the snapshot after a failed server call.
    ///
    /// Outside the pending phase this is a no-op.
    pub fn rollback(&mut self) {
        if self.phase != Phase::Pending {
            return;
        }
        if let Some(snapshot) = self.snapshot.take() {
            self.state = snapshot;
        }
        self.phase = Phase::RolledBack;
    }
}
