use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type TrialCount = u64;

/// Number of doors in the puzzle. Variants with more doors are not modelled.
pub const DOOR_COUNT: u8 = 3;

/// Per-strategy cap on recorded trials. A reset is required once reached.
pub const MAX_TRIALS: TrialCount = 10_000;

/// One of the three doors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Door(u8);

impl Door {
    pub const ALL: [Door; DOOR_COUNT as usize] = [Door(0), Door(1), Door(2)];

    pub fn new(index: u8) -> Option<Door> {
        if index < DOOR_COUNT {
            Some(Door(index))
        } else {
            None
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Door {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "door {}", self.0 + 1)
    }
}

/// What the contestant does after the host opens a door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Keep the initial choice
    Stay,
    /// Take the other unopened door
    Switch,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Stay, Strategy::Switch];

    pub fn label(self) -> &'static str {
        match self {
            Strategy::Stay => "stay",
            Strategy::Switch => "switch",
        }
    }

    /// Long-run win probability of the strategy.
    pub fn expected_win_rate(self) -> f64 {
        match self {
            Strategy::Stay => 100.0 / 3.0,
            Strategy::Switch => 200.0 / 3.0,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stay" => Ok(Strategy::Stay),
            "switch" => Ok(Strategy::Switch),
            other => Err(format!("unknown strategy '{}' (expected stay or switch)", other)),
        }
    }
}

/// Result of a single trial under one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub strategy: Strategy,
    pub win: bool,
}

/// Things the control layer reports while driving a session
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A trial was simulated and recorded
    TrialRecorded {
        outcome: Outcome,
        tried: TrialCount,
    },
    /// A batch finished (possibly cut short by the cap or a cancellation)
    BatchFinished {
        strategy: Strategy,
        requested: TrialCount,
        executed: TrialCount,
    },
    /// No trials could run because the strategy reached the cap
    CapacityExceeded {
        strategy: Strategy,
        limit: TrialCount,
    },
    /// All counters were cleared
    Reset,
}

/// Trait for consuming events from a session
pub trait EventSink {
    fn log(&mut self, event: Event);
}

/// No-op event sink
pub struct NoOpSink;

impl EventSink for NoOpSink {
    #[inline(always)]
    fn log(&mut self, _event: Event) {}
}

/// Collects every event, mostly useful in tests
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<Event>,
}

impl EventSink for CollectingSink {
    fn log(&mut self, event: Event) {
        self.events.push(event);
    }
}
