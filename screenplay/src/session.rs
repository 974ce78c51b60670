//! Re-parse bookkeeping for editors that parse on every change.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::{Analysis, analyze};

/// Identifies one parse request issued through a [`RequestGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Last-request-wins gate for overlapping parse requests.
///
/// Each [`begin`](RequestGate::begin) supersedes every earlier request; a
/// result delivered for a superseded generation is discarded. The gate can
/// be shared between threads.
#[derive(Debug, Default)]
pub struct RequestGate {
    latest: AtomicU64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request.
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::Acquire) == generation.0
    }

    /// Hand back `value` if `generation` is still the latest request.
    pub fn deliver<T>(&self, generation: Generation, value: T) -> Option<T> {
        if self.is_current(generation) {
            Some(value)
        } else {
            trace!(generation = generation.0, "discarding stale parse result");
            None
        }
    }
}

/// Single-entry cache of the last analyzed source.
#[derive(Debug, Default)]
pub struct LastParse {
    entry: Option<(String, Arc<Analysis>)>,
}

impl LastParse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached analysis when `source` is unchanged, otherwise
    /// analyze it and replace the entry.
    pub fn get_or_parse(&mut self, source: &str) -> Arc<Analysis> {
        if let Some((cached, analysis)) = &self.entry {
            if cached == source {
                trace!(bytes = source.len(), "reusing cached analysis");
                return Arc::clone(analysis);
            }
        }
        let analysis = Arc::new(analyze(source));
        self.entry = Some((source.to_string(), Arc::clone(&analysis)));
        analysis
    }

    pub fn is_cached(&self, source: &str) -> bool {
        self.entry.as_ref().is_some_and(|(cached, _)| cached == source)
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
