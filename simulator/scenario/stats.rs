//! Statistics and results for scenario runs

use mh_rust::{Strategy, StrategySnapshot, TrialCount};

/// Outcome of one scheduled batch
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchResult {
    pub strategy: Strategy,
    pub requested: TrialCount,
    pub executed: TrialCount,
    /// Batch was refused or cut short by the per-strategy cap
    pub hit_cap: bool,
}

/// Scenario result
#[derive(Debug, serde::Serialize)]
pub struct ScenarioResult {
    /// Seed used for the run
    pub seed_used: [u8; 32],

    pub batches: Vec<BatchResult>,

    /// Final counters per strategy
    pub snapshots: Vec<StrategySnapshot>,
}

impl ScenarioResult {
    pub fn total_executed(&self) -> TrialCount {
        self.batches.iter().map(|b| b.executed).sum()
    }

    /// Print a summary of the scenario results
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        Monty Hall Scenario Results                     ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Batches:");
        for (i, batch) in self.batches.iter().enumerate() {
            println!(
                "  {:>3}. {:<6} requested={:<6} executed={:<6}{}",
                i + 1,
                batch.strategy,
                batch.requested,
                batch.executed,
                if batch.hit_cap { " (cap reached)" } else { "" }
            );
        }
        println!("  Total trials: {}\n", self.total_executed());

        println!("Strategies:");
        for snap in &self.snapshots {
            let expected = snap.strategy.expected_win_rate();
            if snap.tried == 0 {
                println!("  {:<6} no trials", snap.strategy);
                continue;
            }
            println!(
                "  {:<6} tried={:<6} wins={:<6} losses={:<6} rate={:>5.1}% (expected {:.1}%, diff {:+.1})",
                snap.strategy,
                snap.tried,
                snap.wins,
                snap.losses,
                snap.win_rate,
                expected,
                snap.win_rate - expected
            );
        }
        println!();
    }
}
