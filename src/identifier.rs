// Result identifiers: "A#" + YYYYMMDDHHMMSS + "-" + short suffix
use chrono::{Local, NaiveDateTime};
use std::cell::Cell;
use std::collections::HashSet;

pub const ID_PREFIX: &str = "A#";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const MAX_SUFFIX_ATTEMPTS: usize = 8;

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub trait SuffixSource {
    fn next_suffix(&self) -> String;
}

/// Eight random lowercase hex digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn next_suffix(&self) -> String {
        format!("{:08x}", rand::random::<u32>())
    }
}

/// Yields `00000001`, `00000002`, ... for reproducible identifiers.
#[derive(Debug, Default)]
pub struct SequentialSuffix {
    next: Cell<u32>,
}

impl SequentialSuffix {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SuffixSource for SequentialSuffix {
    fn next_suffix(&self) -> String {
        let value = self.next.get().wrapping_add(1);
        self.next.set(value);
        format!("{:08x}", value)
    }
}

// Hands out identifiers for one call, never the same one twice
pub struct IdGenerator<'a, C, S> {
    clock: &'a C,
    suffixes: &'a S,
    issued: HashSet<String>,
}

impl<'a, C: Clock, S: SuffixSource> IdGenerator<'a, C, S> {
    pub fn new(clock: &'a C, suffixes: &'a S) -> Self {
        Self {
            clock,
            suffixes,
            issued: HashSet::new(),
        }
    }

    pub fn next_id(&mut self) -> String {
        let stamp = self.clock.now().format(TIMESTAMP_FORMAT).to_string();

        for _ in 0..MAX_SUFFIX_ATTEMPTS {
            let id = format!("{}{}-{}", ID_PREFIX, stamp, self.suffixes.next_suffix());
            if self.issued.insert(id.clone()) {
                return id;
            }
        }

        // The suffix source keeps repeating itself; fall back to a counter
        let suffix = self.suffixes.next_suffix();
        let mut counter = self.issued.len();
        loop {
            let id = format!("{}{}-{}-{}", ID_PREFIX, stamp, suffix, counter);
            if self.issued.insert(id.clone()) {
                return id;
            }
            counter += 1;
        }
    }
}
