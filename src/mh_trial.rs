//! Trial Simulator
//!
//! Models one independent round of the three door puzzle. A [`Round`] is
//! drawn fresh for every trial, asked for the outcome of a single strategy
//! and then dropped. Nothing here touches shared statistics.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::mh_interface::{Door, Outcome, Strategy, DOOR_COUNT};

// door indices always sum to 0 + 1 + 2
const INDEX_SUM: u8 = DOOR_COUNT * (DOOR_COUNT - 1) / 2;

/// One simulated round of the puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    prize: Door,
    initial_choice: Door,
    opened: Door,
    switch_target: Door,
}

impl Round {
    /// Draw a round: prize and initial choice independently and uniformly,
    /// then the host opens a door that is neither of them.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let prize = random_door(rng);
        let initial_choice = random_door(rng);

        // one candidate when the contestant picked the prize, two otherwise
        let mut candidates = [prize; 2];
        let mut count = 0;
        for door in Door::ALL {
            if door != prize && door != initial_choice {
                candidates[count] = door;
                count += 1;
            }
        }
        // never empty: at most two of the three doors are excluded
        let opened = *candidates[..count].choose(rng).unwrap_or(&candidates[0]);

        Self {
            prize,
            initial_choice,
            opened,
            switch_target: remaining_door(initial_choice, opened),
        }
    }

    /// Build a round from an explicit triple. Returns `None` when the host
    /// would be opening the prize or the contestant's door.
    pub fn from_parts(prize: Door, initial_choice: Door, opened: Door) -> Option<Self> {
        if opened == prize || opened == initial_choice {
            return None;
        }

        Some(Self {
            prize,
            initial_choice,
            opened,
            switch_target: remaining_door(initial_choice, opened),
        })
    }

    pub fn prize(&self) -> Door {
        self.prize
    }

    pub fn initial_choice(&self) -> Door {
        self.initial_choice
    }

    pub fn opened(&self) -> Door {
        self.opened
    }

    /// The door a switching contestant ends up with
    pub fn switch_target(&self) -> Door {
        self.switch_target
    }

    /// The door the contestant finally holds under `strategy`
    pub fn final_door(&self, strategy: Strategy) -> Door {
        match strategy {
            Strategy::Stay => self.initial_choice,
            Strategy::Switch => self.switch_target,
        }
    }

    pub fn outcome(&self, strategy: Strategy) -> Outcome {
        Outcome {
            strategy,
            win: self.final_door(strategy) == self.prize,
        }
    }
}

/// Simulate one trial for `strategy`.
pub fn run_trial<R: Rng + ?Sized>(strategy: Strategy, rng: &mut R) -> Outcome {
    let round = Round::draw(rng);
    let outcome = round.outcome(strategy);

    debug!(
        "trial: prize={} choice={} opened={} strategy={} win={}",
        round.prize.index(),
        round.initial_choice.index(),
        round.opened.index(),
        strategy,
        outcome.win
    );

    outcome
}

fn random_door<R: Rng + ?Sized>(rng: &mut R) -> Door {
    Door::ALL[rng.gen_range(0..Door::ALL.len())]
}

fn remaining_door(a: Door, b: Door) -> Door {
    Door::ALL[(INDEX_SUM - a.index() - b.index()) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn all_rounds() -> Vec<Round> {
        let mut rounds = Vec::new();
        for prize in Door::ALL {
            for choice in Door::ALL {
                for opened in Door::ALL {
                    if let Some(round) = Round::from_parts(prize, choice, opened) {
                        rounds.push(round);
                    }
                }
            }
        }
        rounds
    }

    #[test]
    fn test_from_parts_rejects_invalid_host() {
        let [a, b, c] = Door::ALL;
        assert!(Round::from_parts(a, b, a).is_none());
        assert!(Round::from_parts(a, b, b).is_none());
        assert!(Round::from_parts(a, a, a).is_none());

        let round = Round::from_parts(a, b, c).unwrap();
        assert_eq!(round.switch_target(), a);
    }

    #[test]
    fn test_every_valid_triple_enumerated() {
        // 3 rounds with two host options, 6 rounds with one
        assert_eq!(all_rounds().len(), 3 * 2 + 6);
    }

    #[test]
    fn test_complementary_strategies() {
        for round in all_rounds() {
            let stay = round.outcome(Strategy::Stay);
            let switch = round.outcome(Strategy::Switch);
            assert_ne!(stay.win, switch.win, "{:?}", round);

            if round.initial_choice() == round.prize() {
                assert_ne!(round.switch_target(), round.prize());
            } else {
                assert_eq!(round.switch_target(), round.prize());
            }
        }
    }

    #[test]
    fn test_drawn_rounds_are_distinct() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..5_000 {
            let round = Round::draw(&mut rng);

            assert_ne!(round.opened(), round.initial_choice());
            assert_ne!(round.opened(), round.prize());
            assert_ne!(round.switch_target(), round.initial_choice());
            assert_ne!(round.switch_target(), round.opened());
            assert_eq!(Round::from_parts(round.prize(), round.initial_choice(), round.opened()), Some(round));
        }
    }

    #[test]
    fn test_host_chooses_both_goats() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut opened = [0usize; 3];

        for _ in 0..20_000 {
            let round = Round::draw(&mut rng);
            if round.prize() == Door::ALL[0] && round.initial_choice() == Door::ALL[0] {
                opened[round.opened().index() as usize] += 1;
            }
        }

        assert_eq!(opened[0], 0);
        assert!(opened[1] > 0 && opened[2] > 0);
        let share = opened[1] as f64 / (opened[1] + opened[2]) as f64;
        assert!((share - 0.5).abs() < 0.1, "share {}", share);
    }

    #[test]
    fn test_forced_host_door() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut forced = 0;

        for _ in 0..2_000 {
            let round = Round::draw(&mut rng);
            if round.prize() != round.initial_choice() {
                // only one goat left for the host
                forced += 1;
                let expected = remaining_door(round.prize(), round.initial_choice());
                assert_eq!(round.opened(), expected);
                assert_eq!(round.switch_target(), round.prize());
            }
        }
        assert!(forced > 0);
    }

    #[test]
    fn test_outcome_carries_strategy() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(run_trial(Strategy::Stay, &mut rng).strategy, Strategy::Stay);
        assert_eq!(run_trial(Strategy::Switch, &mut rng).strategy, Strategy::Switch);
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);

        let first: Vec<bool> = (0..100).map(|_| run_trial(Strategy::Switch, &mut a).win).collect();
        let second: Vec<bool> = (0..100).map(|_| run_trial(Strategy::Switch, &mut b).win).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_long_run_convergence() {
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 10_000;

        for strategy in Strategy::ALL {
            let wins = (0..trials).filter(|_| run_trial(strategy, &mut rng).win).count();
            let rate = wins as f64 / trials as f64 * 100.0;
            assert!(
                (rate - strategy.expected_win_rate()).abs() < 3.0,
                "{} rate {:.1}",
                strategy,
                rate
            );
        }
    }
}
