//! # mhRust - Monty Hall simulator
//!
//! Simulates the three door Monty Hall puzzle one trial at a time and keeps
//! running win/lose statistics for the two contestant strategies, *stay* and
//! *switch*.
//!
//! ## Core Components
//!
//! - **run_trial**: one independent round of the puzzle, judged for a single strategy
//! - **RunningStats**: four counters plus derived trial counts, capped at `MAX_TRIALS` per strategy
//! - **Session**: the control layer a front end drives (selections, batches, pacing, reset)
//! - **mh_display**: numbers and text for charts and summaries
//!
//! ```no_run
//! use mh_rust::{NoOpSink, NoPacer, Session, Strategy};
//!
//! let mut session = Session::new([0u8; 32]);
//! session.select_strategy(Strategy::Stay);
//!
//! match session.run_batch_with(100, &mut NoPacer, &mut NoOpSink) {
//!     Ok(report) => println!("ran {} trials", report.executed),
//!     Err(e) => println!("{}", e),
//! }
//! println!("{:.1}%", session.snapshot().win_rate);
//! ```
//!
//! The binaries in this package (`monty_hall`, `scenario_runner`) are thin
//! terminal front ends over these types.

pub mod mh_config;
pub mod mh_display;
pub mod mh_interface;
pub mod mh_session;
pub mod mh_stats;
pub mod mh_trial;

// Re-export commonly used types
pub use mh_interface::{
    CollectingSink, Door, Event, EventSink, NoOpSink, Outcome, Strategy, TrialCount, MAX_TRIALS,
};
pub use mh_session::{BatchReport, NoPacer, Pacer, Session, SessionError, SleepPacer, Speed};
pub use mh_stats::{CapacityError, RunningStats, StrategySnapshot};
pub use mh_trial::{run_trial, Round};
