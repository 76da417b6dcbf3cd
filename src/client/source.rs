use crate::client::error::FetchError;

/// Status of one data source as the UI sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// Nothing requested yet.
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Identifies one issued request; only the latest ticket may write state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Fetch state of one source plus its retry counter and request generation.
/// `Loading` is only set by `begin`, so it always means a request is in flight.
#[derive(Debug)]
pub struct DataSource<T> {
    state: FetchState<T>,
    retries: u32,
    generation: u64,
}

impl<T> Default for DataSource<T> {
    fn default() -> Self {
        Self {
            state: FetchState::Idle,
            retries: 0,
            generation: 0,
        }
    }
}

impl<T> DataSource<T> {
    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Starts a request. A silent start keeps whatever is on screen.
    pub fn begin(&mut self, silent: bool) -> Ticket {
        self.generation += 1;
        if !silent {
            self.state = FetchState::Loading;
        }
        Ticket(self.generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Applies a result. Data is replaced wholesale on success and dropped on
    /// failure. Returns false when a newer request superseded this one.
    pub fn complete(&mut self, ticket: Ticket, result: Result<T, FetchError>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.state = match result {
            Ok(data) => FetchState::Ready(data),
            Err(e) => FetchState::Failed(e.user_message()),
        };
        true
    }

    pub fn record_retry(&mut self) -> u32 {
        self.retries += 1;
        self.retries
    }
}
