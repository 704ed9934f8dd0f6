use tracing::{debug, warn};

use crate::error::AnalysisError;

/// Identifies one started request. Only the latest token may settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Loading,
    Success {
        payload: T,
    },
    Error {
        message: String,
    },
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        RequestState::Idle
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestEvent<T> {
    Start,
    Succeed(T),
    Fail(String),
}

impl<T> RequestState<T> {
    /// Every event is accepted in every state. `Start` discards whatever the
    /// previous state held.
    pub fn next(self, event: RequestEvent<T>) -> Self {
        match event {
            RequestEvent::Start => RequestState::Loading,
            RequestEvent::Succeed(payload) => RequestState::Success { payload },
            RequestEvent::Fail(message) => RequestState::Error { message },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Loading => "loading",
            RequestState::Success { .. } => "success",
            RequestState::Error { .. } => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            RequestState::Success { payload } => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Error { message } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Owns the single `RequestState` slot of a session.
#[derive(Debug)]
pub struct RequestLifecycle<T> {
    state: RequestState<T>,
    latest: u64,
}

impl<T> Default for RequestLifecycle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestLifecycle<T> {
    pub fn new() -> Self {
        Self {
            state: RequestState::Idle,
            latest: 0,
        }
    }

    pub fn state(&self) -> &RequestState<T> {
        &self.state
    }

    /// Enter `Loading`, dropping any previous payload or error. Does not
    /// cancel a request already in flight; its token just stops being current.
    pub fn start(&mut self) -> RequestToken {
        self.latest += 1;
        self.apply(RequestEvent::Start);
        debug!("Request {} started", self.latest);
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest && self.state.is_loading()
    }

    /// Deliver the outcome of `token`'s request. Returns `false` and leaves
    /// the state alone if a newer request was started or this one already settled.
    pub fn settle(&mut self, token: RequestToken, outcome: Result<T, AnalysisError>) -> bool {
        if !self.is_current(token) {
            warn!(
                "Discarding response for request {} (current is {}, state {})",
                token.0,
                self.latest,
                self.state.name()
            );
            return false;
        }
        let event = match outcome {
            Ok(payload) => RequestEvent::Succeed(payload),
            Err(e) => RequestEvent::Fail(e.to_string()),
        };
        self.apply(event);
        debug!("Request {} settled: {}", token.0, self.state.name());
        true
    }

    /// Move to `Error` from wherever we are, e.g. when a delivered payload
    /// cannot be interpreted.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.apply(RequestEvent::Fail(message.into()));
    }

    fn apply(&mut self, event: RequestEvent<T>) {
        let prev = std::mem::take(&mut self.state);
        self.state = prev.next(event);
    }
}
