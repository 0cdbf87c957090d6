//! Clock and identifier sources.

use std::{cell::Cell, fmt::Debug};

use jiff::{Timestamp, Unit};
use uuid::Uuid;

use crate::records::RecordId;

/// Source of the current time.
pub trait Clock: Debug {
    /// Current instant.
    fn now(&self) -> Timestamp;
}

/// Wall clock, rounded to millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let now = Timestamp::now();

        now.round(Unit::Millisecond).unwrap_or(now)
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Source of fresh record identifiers.
pub trait IdGenerator: Debug {
    /// Produce an identifier not handed out before.
    fn generate(&self) -> RecordId;
}

/// Time-ordered UUIDv7 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> RecordId {
        RecordId::from(Uuid::now_v7().to_string())
    }
}

/// Predictable `<prefix>-<n>` identifiers, counting up from 1.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: &'static str,
    next: Cell<u64>,
}

impl SequentialIds {
    /// Create a generator using the given prefix.
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: Cell::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> RecordId {
        let n = self.next.get();
        self.next.set(n + 1);

        RecordId::from(format!("{}-{n}", self.prefix))
    }
}
