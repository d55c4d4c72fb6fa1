//! Interactive session control
//!
//! A [`Session`] is what the buttons of a front end talk to: it owns the
//! tracker, the current selections and the random source, and runs trials
//! one at a time on the caller's thread. Pacing between steps is injected
//! through [`Pacer`] so tests run without sleeping.

use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mh_interface::{Event, EventSink, Outcome, Strategy, TrialCount};
use crate::mh_stats::{CapacityError, RunningStats, StrategySnapshot};
use crate::mh_trial::run_trial;

/// Smallest batch the run-count control allows
pub const BATCH_MIN: TrialCount = 1;
/// Largest batch the run-count control allows
pub const BATCH_MAX: TrialCount = 100;
pub const DEFAULT_BATCH: TrialCount = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("strategy '{strategy}' reached {limit} trials, reset before running more")]
    CapacityExceeded {
        strategy: Strategy,
        limit: TrialCount,
    },

    #[error("no trials requested for strategy '{strategy}'")]
    EmptyBatch { strategy: Strategy },

    #[error("batch size {0} outside {min}..={max}", min = BATCH_MIN, max = BATCH_MAX)]
    BatchSizeOutOfRange(TrialCount),
}

impl From<CapacityError> for SessionError {
    fn from(err: CapacityError) -> Self {
        match err {
            CapacityError::Exhausted { strategy, limit } => {
                SessionError::CapacityExceeded { strategy, limit }
            }
            CapacityError::NothingRequested { strategy } => SessionError::EmptyBatch { strategy },
        }
    }
}

/// Animation speed between steps of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl Speed {
    pub fn delay(self) -> Duration {
        match self {
            Speed::Fast => Duration::ZERO,
            Speed::Normal => Duration::from_millis(50),
            Speed::Slow => Duration::from_millis(350),
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Speed::Fast => "fast",
            Speed::Normal => "normal",
            Speed::Slow => "slow",
        })
    }
}

impl FromStr for Speed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Speed::Fast),
            "normal" => Ok(Speed::Normal),
            "slow" => Ok(Speed::Slow),
            other => Err(format!("unknown speed '{}' (expected fast, normal or slow)", other)),
        }
    }
}

/// Waits between the steps of a batch.
pub trait Pacer {
    /// Pause for `delay`. Returning `false` stops the batch after the step
    /// that was just recorded.
    fn pause(&mut self, delay: Duration) -> bool;
}

/// Sleeps on the current thread
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn pause(&mut self, delay: Duration) -> bool {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        true
    }
}

/// Never waits
pub struct NoPacer;

impl Pacer for NoPacer {
    #[inline(always)]
    fn pause(&mut self, _delay: Duration) -> bool {
        true
    }
}

/// What a batch actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub strategy: Strategy,
    pub requested: TrialCount,
    pub executed: TrialCount,
    /// The request was cut down to the room left under the cap
    pub capped: bool,
}

/// One user's session: selections, counters and random source
pub struct Session {
    stats: RunningStats,
    strategy: Strategy,
    batch_size: TrialCount,
    speed: Speed,
    rng: StdRng,
    seed: [u8; 32],
}

impl Session {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            stats: RunningStats::new(),
            strategy: Strategy::Switch,
            batch_size: DEFAULT_BATCH,
            speed: Speed::default(),
            rng: StdRng::from_seed(seed),
            seed,
        }
    }

    pub fn seed(&self) -> [u8; 32] {
        self.seed
    }

    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn batch_size(&self) -> TrialCount {
        self.batch_size
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn snapshot(&self) -> StrategySnapshot {
        self.stats.snapshot(self.strategy)
    }

    pub fn select_strategy(&mut self, strategy: Strategy) {
        debug!("strategy selected: {}", strategy);
        self.strategy = strategy;
    }

    pub fn set_batch_size(&mut self, runs: TrialCount) -> Result<(), SessionError> {
        if !(BATCH_MIN..=BATCH_MAX).contains(&runs) {
            return Err(SessionError::BatchSizeOutOfRange(runs));
        }
        self.batch_size = runs;
        Ok(())
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    /// Run a single trial for the selected strategy.
    pub fn run_once(&mut self, sink: &mut dyn EventSink) -> Result<Outcome, SessionError> {
        if let Err(e) = self.stats.clamp_batch(self.strategy, 1) {
            return Err(self.refuse(e, sink));
        }
        Ok(self.step(sink))
    }

    /// Run the configured batch for the selected strategy.
    pub fn run_batch(
        &mut self,
        pacer: &mut dyn Pacer,
        sink: &mut dyn EventSink,
    ) -> Result<BatchReport, SessionError> {
        self.run_batch_with(self.batch_size, pacer, sink)
    }

    /// Run `requested` trials for the selected strategy, clamped to the cap.
    ///
    /// Fails without touching any counter when the strategy has no room
    /// left.
    pub fn run_batch_with(
        &mut self,
        requested: TrialCount,
        pacer: &mut dyn Pacer,
        sink: &mut dyn EventSink,
    ) -> Result<BatchReport, SessionError> {
        let strategy = self.strategy;
        let todo = match self.stats.clamp_batch(strategy, requested) {
            Ok(todo) => todo,
            Err(e) => return Err(self.refuse(e, sink)),
        };

        let delay = self.speed.delay();
        let mut executed = 0;
        while executed < todo {
            self.step(sink);
            executed += 1;
            if !pacer.pause(delay) {
                debug!("batch stopped after {} of {} trials", executed, todo);
                break;
            }
        }

        sink.log(Event::BatchFinished {
            strategy,
            requested,
            executed,
        });
        info!(
            "batch {}: {}/{} trials, total {}",
            strategy,
            executed,
            requested,
            self.stats.trials(strategy)
        );

        Ok(BatchReport {
            strategy,
            requested,
            executed,
            capped: todo < requested,
        })
    }

    /// Clear both strategies' counters. Selections are kept.
    pub fn reset(&mut self, sink: &mut dyn EventSink) {
        self.stats.reset();
        sink.log(Event::Reset);
        info!("session reset");
    }

    fn step(&mut self, sink: &mut dyn EventSink) -> Outcome {
        let outcome = run_trial(self.strategy, &mut self.rng);
        self.stats.record(outcome);
        sink.log(Event::TrialRecorded {
            outcome,
            tried: self.stats.trials(outcome.strategy),
        });
        outcome
    }

    fn refuse(&self, err: CapacityError, sink: &mut dyn EventSink) -> SessionError {
        let err = SessionError::from(err);
        if let SessionError::CapacityExceeded { strategy, limit } = err {
            warn!("{}", err);
            sink.log(Event::CapacityExceeded { strategy, limit });
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mh_interface::{CollectingSink, NoOpSink, MAX_TRIALS};

    fn session() -> Session {
        Session::new([7u8; 32])
    }

    /// Fills the selected strategy up to `count` trials
    fn fill(session: &mut Session, count: TrialCount) {
        let report = session
            .run_batch_with(count, &mut NoPacer, &mut NoOpSink)
            .unwrap();
        assert_eq!(report.executed, count);
    }

    struct CountingPacer {
        pauses: Vec<Duration>,
        stop_after: Option<usize>,
    }

    impl Pacer for CountingPacer {
        fn pause(&mut self, delay: Duration) -> bool {
            self.pauses.push(delay);
            self.stop_after.map_or(true, |n| self.pauses.len() < n)
        }
    }

    #[test]
    fn test_defaults() {
        let s = session();
        assert_eq!(s.strategy(), Strategy::Switch);
        assert_eq!(s.batch_size(), DEFAULT_BATCH);
        assert_eq!(s.speed(), Speed::Normal);
        assert_eq!(s.snapshot().tried, 0);
    }

    #[test]
    fn test_run_once_records_selected_strategy() {
        let mut s = session();
        s.select_strategy(Strategy::Stay);

        let outcome = s.run_once(&mut NoOpSink).unwrap();

        assert_eq!(outcome.strategy, Strategy::Stay);
        assert_eq!(s.stats().trials(Strategy::Stay), 1);
        assert_eq!(s.stats().trials(Strategy::Switch), 0);
    }

    #[test]
    fn test_batch_paces_every_step() {
        let mut s = session();
        s.set_speed(Speed::Slow);
        let mut pacer = CountingPacer {
            pauses: Vec::new(),
            stop_after: None,
        };

        let report = s.run_batch(&mut pacer, &mut NoOpSink).unwrap();

        assert_eq!(report.executed, DEFAULT_BATCH);
        assert!(!report.capped);
        assert_eq!(pacer.pauses.len(), DEFAULT_BATCH as usize);
        assert!(pacer.pauses.iter().all(|d| *d == Duration::from_millis(350)));
    }

    #[test]
    fn test_cancelled_batch_keeps_completed_steps() {
        let mut s = session();
        let mut pacer = CountingPacer {
            pauses: Vec::new(),
            stop_after: Some(4),
        };

        let report = s.run_batch_with(50, &mut pacer, &mut NoOpSink).unwrap();

        assert_eq!(report.executed, 4);
        assert!(!report.capped);
        assert_eq!(s.stats().trials(Strategy::Switch), 4);
    }

    #[test]
    fn test_batch_clamped_at_cap() {
        let mut s = session();
        s.select_strategy(Strategy::Stay);
        fill(&mut s, MAX_TRIALS - 5);
        let mut sink = CollectingSink::default();

        let report = s.run_batch_with(10, &mut NoPacer, &mut sink).unwrap();

        assert_eq!(report.executed, 5);
        assert!(report.capped);
        assert_eq!(s.stats().trials(Strategy::Stay), MAX_TRIALS);
        assert_eq!(
            sink.events.last(),
            Some(&Event::BatchFinished {
                strategy: Strategy::Stay,
                requested: 10,
                executed: 5
            })
        );
    }

    #[test]
    fn test_full_strategy_runs_nothing() {
        let mut s = session();
        s.select_strategy(Strategy::Stay);
        fill(&mut s, MAX_TRIALS);
        let before = s.stats().clone();
        let mut sink = CollectingSink::default();

        let err = s.run_batch_with(1, &mut NoPacer, &mut sink).unwrap_err();
        assert_eq!(
            err,
            SessionError::CapacityExceeded {
                strategy: Strategy::Stay,
                limit: MAX_TRIALS
            }
        );
        assert!(s.run_once(&mut sink).is_err());
        assert_eq!(s.stats(), &before);
        assert_eq!(sink.events.len(), 2);

        // switch still has room
        s.select_strategy(Strategy::Switch);
        assert!(s.run_once(&mut sink).is_ok());
    }

    #[test]
    fn test_reset_allows_running_again() {
        let mut s = session();
        fill(&mut s, MAX_TRIALS);
        assert!(s.run_once(&mut NoOpSink).is_err());

        let mut sink = CollectingSink::default();
        s.reset(&mut sink);

        assert_eq!(sink.events, vec![Event::Reset]);
        assert_eq!(s.stats(), &RunningStats::new());
        assert_eq!(s.strategy(), Strategy::Switch);
        assert!(s.run_once(&mut NoOpSink).is_ok());
    }

    #[test]
    fn test_empty_batch_is_not_capacity() {
        let mut s = session();
        let mut sink = CollectingSink::default();

        let err = s.run_batch_with(0, &mut NoPacer, &mut sink).unwrap_err();

        assert_eq!(
            err,
            SessionError::EmptyBatch {
                strategy: Strategy::Switch
            }
        );
        assert!(sink.events.is_empty());
        assert_eq!(s.stats(), &RunningStats::new());
    }

    #[test]
    fn test_batch_size_range() {
        let mut s = session();
        assert_eq!(s.set_batch_size(0), Err(SessionError::BatchSizeOutOfRange(0)));
        assert_eq!(s.set_batch_size(101), Err(SessionError::BatchSizeOutOfRange(101)));
        assert!(s.set_batch_size(100).is_ok());
        assert_eq!(s.batch_size(), 100);
    }

    #[test]
    fn test_events_follow_trials() {
        let mut s = session();
        let mut sink = CollectingSink::default();

        s.run_batch_with(3, &mut NoPacer, &mut sink).unwrap();

        let tried: Vec<TrialCount> = sink
            .events
            .iter()
            .filter_map(|e| match e {
                Event::TrialRecorded { tried, .. } => Some(*tried),
                _ => None,
            })
            .collect();
        assert_eq!(tried, vec![1, 2, 3]);
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut a = session();
        let mut b = session();

        fill(&mut a, 200);
        fill(&mut b, 200);

        assert_eq!(a.stats(), b.stats());
        assert_eq!(a.seed(), b.seed());
    }

    #[test]
    fn test_switch_converges() {
        let mut s = Session::new([3u8; 32]);
        fill(&mut s, MAX_TRIALS);
        let rate = s.snapshot().win_rate;
        assert!((rate - 66.7).abs() < 3.0, "switch rate {}", rate);

        s.select_strategy(Strategy::Stay);
        fill(&mut s, MAX_TRIALS);
        let rate = s.snapshot().win_rate;
        assert!((rate - 33.3).abs() < 3.0, "stay rate {}", rate);
    }

    #[test]
    fn test_speed_parse() {
        assert_eq!("Slow".parse::<Speed>(), Ok(Speed::Slow));
        assert_eq!(Speed::Fast.delay(), Duration::ZERO);
        assert!("warp".parse::<Speed>().is_err());
    }
}
