//! Scenario runner

use super::config::ScenarioFile;
use super::stats::{BatchResult, ScenarioResult};
use log::{info, warn};
use mh_rust::{NoOpSink, NoPacer, Session, SessionError, Strategy};

/// Runs the batches of a scenario against one session
pub struct ScenarioRunner {
    scenario: ScenarioFile,
    session: Session,
}

impl ScenarioRunner {
    pub fn new(scenario: ScenarioFile, seed: [u8; 32]) -> Self {
        Self {
            scenario,
            session: Session::new(seed),
        }
    }

    /// Main scenario loop
    pub fn run(mut self) -> ScenarioResult {
        let mut batches = Vec::with_capacity(self.scenario.batches.len());

        for plan in &self.scenario.batches {
            if plan.reset_before {
                self.session.reset(&mut NoOpSink);
            }
            self.session.select_strategy(plan.strategy);

            let result = match self
                .session
                .run_batch_with(plan.runs, &mut NoPacer, &mut NoOpSink)
            {
                Ok(report) => BatchResult {
                    strategy: plan.strategy,
                    requested: plan.runs,
                    executed: report.executed,
                    hit_cap: report.capped,
                },
                Err(SessionError::CapacityExceeded { strategy, limit }) => {
                    warn!("{} skipped: already at {} trials", strategy, limit);
                    BatchResult {
                        strategy: plan.strategy,
                        requested: plan.runs,
                        executed: 0,
                        hit_cap: true,
                    }
                }
                Err(e) => {
                    warn!("batch skipped: {}", e);
                    BatchResult {
                        strategy: plan.strategy,
                        requested: plan.runs,
                        executed: 0,
                        hit_cap: false,
                    }
                }
            };

            info!(
                "{}: {}/{} trials",
                result.strategy, result.executed, result.requested
            );
            batches.push(result);
        }

        ScenarioResult {
            seed_used: self.session.seed(),
            batches,
            snapshots: Strategy::ALL
                .iter()
                .map(|s| self.session.stats().snapshot(*s))
                .collect(),
        }
    }
}
