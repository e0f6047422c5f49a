//! Request identity tracking.

/// Identity + payload of one dispatch.
///
/// `id == 0` means nothing has been dispatched yet. Every dispatch replaces the
/// record wholesale with `previous.id + 1`, so comparing ids is enough to tell
/// whether a completion still belongs to the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord<P> {
    pub id: u64,
    pub payload: Option<P>,
}

impl<P> RequestRecord<P> {
    /// The "never dispatched" record.
    pub fn initial() -> Self {
        Self {
            id: 0,
            payload: None,
        }
    }

    /// Record for the dispatch that follows this one.
    pub fn next(&self, payload: P) -> Self {
        Self {
            id: self.id + 1,
            payload: Some(payload),
        }
    }

    /// Whether the executor has anything to run for this record.
    pub fn is_runnable(&self) -> bool {
        self.id != 0 && self.payload.is_some()
    }

    pub fn is_current(&self, id: u64) -> bool {
        self.id == id
    }
}

impl<P> Default for RequestRecord<P> {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_record_is_not_runnable() {
        let record: RequestRecord<u32> = RequestRecord::initial();
        assert_eq!(record.id, 0);
        assert!(!record.is_runnable());
    }

    #[test]
    fn next_increments_by_one() {
        let first = RequestRecord::initial().next("a");
        let second = first.next("b");
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.payload, Some("b"));
        assert!(second.is_runnable());
        assert!(second.is_current(2));
        assert!(!second.is_current(1));
    }

    #[test]
    fn zero_payload_is_still_runnable() {
        let record = RequestRecord::initial().next(0u32);
        assert!(record.is_runnable());
    }
}
