//! Synchronously readable shadow of the last committed state.
//!
//! Derivation callbacks read from here instead of from the published state so
//! a dispatch issued right after a completion sees that completion, even if no
//! subscriber has observed it yet.

/// What a derivation callback gets to look at.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<P, D> {
    pub is_loading: bool,
    pub previous_data: Option<D>,
    /// Payload of the last *successful* fetch.
    pub previous_payload: Option<P>,
}

#[derive(Debug)]
pub struct SnapshotCache<P, D> {
    current: Snapshot<P, D>,
}

impl<P: Clone, D: Clone> SnapshotCache<P, D> {
    pub fn new(is_loading: bool, data: Option<D>) -> Self {
        Self {
            current: Snapshot {
                is_loading,
                previous_data: data,
                previous_payload: None,
            },
        }
    }

    pub fn read(&self) -> Snapshot<P, D> {
        self.current.clone()
    }

    /// Mirror a committed transition.
    pub fn write(&mut self, is_loading: bool, data: Option<D>) {
        self.current.is_loading = is_loading;
        self.current.previous_data = data;
    }

    /// Record the payload whose fetch just succeeded.
    pub fn commit_payload(&mut self, payload: Option<P>) {
        self.current.previous_payload = payload;
    }

    pub fn previous_data(&self) -> Option<D> {
        self.current.previous_data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_does_not_touch_payload() {
        let mut cache: SnapshotCache<u32, &str> = SnapshotCache::new(true, None);
        cache.commit_payload(Some(1));
        cache.write(true, Some("items"));

        let snapshot = cache.read();
        assert!(snapshot.is_loading);
        assert_eq!(snapshot.previous_data, Some("items"));
        assert_eq!(snapshot.previous_payload, Some(1));
    }

    #[test]
    fn read_returns_a_detached_copy() {
        let mut cache: SnapshotCache<u32, String> = SnapshotCache::new(true, None);
        let before = cache.read();
        cache.write(false, Some("x".to_string()));
        assert_eq!(before.previous_data, None);
        assert_eq!(cache.previous_data(), Some("x".to_string()));
    }
}
