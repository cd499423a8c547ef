use std::time::{Duration, Instant};

/// A single cached value that expires `ttl` after it was stored.
///
/// Owned by the caller; nothing in the pipeline reads or refreshes it.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Option<(Instant, T)>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self) -> Option<&T> {
        self.get_at(Instant::now())
    }

    pub fn insert(&mut self, value: T) {
        self.insert_at(Instant::now(), value);
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    fn get_at(&self, now: Instant) -> Option<&T> {
        let (stored_at, value) = self.entry.as_ref()?;
        (now.saturating_duration_since(*stored_at) < self.ttl).then_some(value)
    }

    fn insert_at(&mut self, now: Instant, value: T) {
        self.entry = Some((now, value));
    }
}
