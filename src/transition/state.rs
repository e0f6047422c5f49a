//! Consumer-facing fetch state.

use std::sync::Arc;

use crate::mvi::State;
use crate::request::RequestRecord;

/// Everything a consumer can observe about the coordinator.
///
/// Published as a whole value after every transition; a reader never sees
/// `is_loading == false` paired with the previous request's data.
#[derive(Debug, Clone)]
pub struct FetchState<P, D> {
    pub data: Option<D>,
    pub error: Option<Arc<anyhow::Error>>,
    pub is_loading: bool,
    pub has_error: bool,
    /// The current request record.
    pub fetch_data: RequestRecord<P>,
}

/// Coarse view of where the current request is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    /// Nothing dispatched yet.
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl<P: Clone + Send + Sync + 'static, D: Clone + Send + Sync + 'static> State
    for FetchState<P, D>
{
}

impl<P, D> FetchState<P, D> {
    pub fn initial(is_loading: bool) -> Self {
        Self {
            data: None,
            error: None,
            is_loading,
            has_error: false,
            fetch_data: RequestRecord::initial(),
        }
    }

    pub fn request_id(&self) -> u64 {
        self.fetch_data.id
    }

    pub fn phase(&self) -> RequestPhase {
        if self.fetch_data.id == 0 {
            RequestPhase::Idle
        } else if self.is_loading {
            RequestPhase::Pending
        } else if self.has_error {
            RequestPhase::Failed
        } else {
            RequestPhase::Succeeded
        }
    }

    /// Error message, if the last request failed.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|err| format!("{err:#}"))
    }
}

impl<P, D> Default for FetchState<P, D> {
    fn default() -> Self {
        Self::initial(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_loading_without_data() {
        let state: FetchState<u32, String> = FetchState::default();
        assert!(state.is_loading);
        assert!(state.data.is_none());
        assert!(!state.has_error);
        assert_eq!(state.request_id(), 0);
        assert_eq!(state.phase(), RequestPhase::Idle);
    }

    #[test]
    fn phase_follows_flags() {
        let mut state: FetchState<u32, String> = FetchState::default();
        state.fetch_data = RequestRecord::initial().next(1);
        assert_eq!(state.phase(), RequestPhase::Pending);

        state.is_loading = false;
        assert_eq!(state.phase(), RequestPhase::Succeeded);

        state.has_error = true;
        state.error = Some(Arc::new(anyhow::anyhow!("bad gateway")));
        assert_eq!(state.phase(), RequestPhase::Failed);
        assert_eq!(state.error_message().as_deref(), Some("bad gateway"));
    }
}
