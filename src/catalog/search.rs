use std::time::{Duration, Instant};

/// Holds back a value until input has been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending value and restart the timer from `now`.
    pub fn schedule(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some((value.into(), now + self.delay));
    }

    /// The pending value once its deadline has passed; fires at most once.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// The query applied to the tables, plus input still waiting on the debounce.
#[derive(Debug, Clone)]
pub struct SearchState {
    query: String,
    debouncer: Debouncer,
}

impl SearchState {
    pub fn new(delay: Duration) -> Self {
        Self {
            query: String::new(),
            debouncer: Debouncer::new(delay),
        }
    }

    /// The last applied query; empty means paged mode.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    pub(crate) fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_string();
    }

    pub(crate) fn debouncer(&mut self) -> &mut Debouncer {
        &mut self.debouncer
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
