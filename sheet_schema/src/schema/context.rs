//! Per-run build state
//!
//! Everything an export run accumulates lives in one `BuildContext` that is
//! created at the start of the run and dropped after serialization.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::schema::diagnostics::Diagnostics;
use crate::schema::types::Id;

/// Monotonic identity counter shared by every entity kind
#[derive(Debug)]
pub struct IdGenerator {
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next identity
    pub fn next_id(&mut self) -> Id {
        let id = Id::new(self.next);
        self.next += 1;
        id
    }

    /// Number of identities issued so far
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

/// Timestamp captured once per run and reused for every entity
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    started_at: DateTime<Utc>,
}

impl RunClock {
    pub fn now() -> Self {
        Self::fixed(Utc::now())
    }

    pub fn fixed(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    /// ISO-8601 text, used at the document root
    pub fn iso(&self) -> String {
        self.started_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Epoch milliseconds, used on nested entities
    pub fn epoch_millis(&self) -> i64 {
        self.started_at.timestamp_millis()
    }
}

/// Mutable state threaded through parse, resolve and assemble
#[derive(Debug)]
pub struct BuildContext {
    pub ids: IdGenerator,
    pub clock: RunClock,
    pub diagnostics: Diagnostics,
}

impl BuildContext {
    pub fn new(clock: RunClock) -> Self {
        Self {
            ids: IdGenerator::new(),
            clock,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn next_id(&mut self) -> Id {
        self.ids.next_id()
    }
}
