//! Dispatch arguments and results.

use crate::snapshot::Snapshot;

/// Result of a derivation callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derived<P> {
    /// Dispatch this payload.
    Payload(P),
    /// Skip the dispatch. Only a reset function, if given, still runs.
    Abort,
}

impl<P> From<Option<P>> for Derived<P> {
    fn from(value: Option<P>) -> Self {
        match value {
            Some(payload) => Derived::Payload(payload),
            None => Derived::Abort,
        }
    }
}

type DeriveFn<P, D> = Box<dyn FnOnce(&Snapshot<P, D>) -> Derived<P>>;

/// How the next payload is obtained.
pub enum Payloader<P, D> {
    /// Use this payload as is.
    Literal(P),
    /// Compute the payload from the snapshot of prior state.
    Derive(DeriveFn<P, D>),
}

impl<P, D> Payloader<P, D> {
    pub fn derive<F>(derive: F) -> Self
    where
        F: FnOnce(&Snapshot<P, D>) -> Derived<P> + 'static,
    {
        Payloader::Derive(Box::new(derive))
    }

    /// Turn this into a payload (or an abort) against `snapshot`.
    pub fn resolve(self, snapshot: &Snapshot<P, D>) -> Derived<P> {
        match self {
            Payloader::Literal(payload) => Derived::Payload(payload),
            Payloader::Derive(derive) => derive(snapshot),
        }
    }
}

impl<P, D> From<P> for Payloader<P, D> {
    fn from(payload: P) -> Self {
        Payloader::Literal(payload)
    }
}

impl<P: std::fmt::Debug, D> std::fmt::Debug for Payloader<P, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payloader::Literal(payload) => f.debug_tuple("Literal").field(payload).finish(),
            Payloader::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

/// What a dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A new request was installed and its fetch scheduled.
    Started { id: u64 },
    /// The derivation returned [`Derived::Abort`].
    Aborted,
    /// The coordinator was already disposed; nothing happened.
    Disposed,
}

impl DispatchOutcome {
    pub fn request_id(&self) -> Option<u64> {
        match self {
            DispatchOutcome::Started { id } => Some(*id),
            DispatchOutcome::Aborted | DispatchOutcome::Disposed => None,
        }
    }
}
