//! Running Statistics Tracker
//!
//! Four monotonically increasing counters, one per (strategy, result) pair.
//! Trial counts are derived from them so they can never drift apart.

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::mh_interface::{Outcome, Strategy, TrialCount, MAX_TRIALS};

/// Cap policy violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityError {
    /// The strategy already holds the maximum number of trials
    #[error("strategy '{strategy}' reached {limit} trials, reset before running more")]
    Exhausted {
        strategy: Strategy,
        limit: TrialCount,
    },

    /// A batch of zero trials was requested
    #[error("no trials requested for strategy '{strategy}'")]
    NothingRequested { strategy: Strategy },
}

/// Session-lifetime win/lose counters for both strategies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunningStats {
    stay_win: TrialCount,
    stay_lose: TrialCount,
    switch_win: TrialCount,
    switch_lose: TrialCount,
}

/// Derived view of one strategy's counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategySnapshot {
    pub strategy: Strategy,
    pub wins: TrialCount,
    pub losses: TrialCount,
    pub tried: TrialCount,
    /// Percentage in [0, 100]; 0.0 when nothing was tried
    pub win_rate: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one completed trial.
    ///
    /// The caller checks the cap beforehand (see [`RunningStats::clamp_batch`]).
    pub fn record(&mut self, outcome: Outcome) {
        let counter = match (outcome.strategy, outcome.win) {
            (Strategy::Stay, true) => &mut self.stay_win,
            (Strategy::Stay, false) => &mut self.stay_lose,
            (Strategy::Switch, true) => &mut self.switch_win,
            (Strategy::Switch, false) => &mut self.switch_lose,
        };
        *counter += 1;
    }

    pub fn wins(&self, strategy: Strategy) -> TrialCount {
        match strategy {
            Strategy::Stay => self.stay_win,
            Strategy::Switch => self.switch_win,
        }
    }

    pub fn losses(&self, strategy: Strategy) -> TrialCount {
        match strategy {
            Strategy::Stay => self.stay_lose,
            Strategy::Switch => self.switch_lose,
        }
    }

    pub fn trials(&self, strategy: Strategy) -> TrialCount {
        self.wins(strategy) + self.losses(strategy)
    }

    /// Trials still allowed before the cap
    pub fn remaining(&self, strategy: Strategy) -> TrialCount {
        MAX_TRIALS.saturating_sub(self.trials(strategy))
    }

    pub fn is_full(&self, strategy: Strategy) -> bool {
        self.remaining(strategy) == 0
    }

    pub fn snapshot(&self, strategy: Strategy) -> StrategySnapshot {
        let wins = self.wins(strategy);
        let losses = self.losses(strategy);
        let tried = wins + losses;

        StrategySnapshot {
            strategy,
            wins,
            losses,
            tried,
            win_rate: wins as f64 / tried.max(1) as f64 * 100.0,
        }
    }

    /// Clamp a requested batch to the room left under the cap.
    pub fn clamp_batch(
        &self,
        strategy: Strategy,
        requested: TrialCount,
    ) -> Result<TrialCount, CapacityError> {
        if requested == 0 {
            return Err(CapacityError::NothingRequested { strategy });
        }

        let todo = requested.min(self.remaining(strategy));
        if todo == 0 {
            return Err(CapacityError::Exhausted {
                strategy,
                limit: MAX_TRIALS,
            });
        }
        Ok(todo)
    }

    pub fn reset(&mut self) {
        debug!("stats reset from {:?}", self);
        *self = Self::default();
    }
}
