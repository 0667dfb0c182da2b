//! Scoring of rollout end positions.

use crate::mcts::config::RolloutScorer;
use crate::scoring::PositionScorer;
use ofc_core::{PlayerId, Position};
use rand::Rng;
use rand::rngs::StdRng;

/// Values a rollout's final position for `perspective`, in [-1, 1].
pub trait RolloutEvaluator {
    fn evaluate(&self, position: &Position, perspective: PlayerId, rng: &mut StdRng) -> f64;
}

/// Placeholder scoring that ignores the cards entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomBaseline;

impl RolloutEvaluator for RandomBaseline {
    fn evaluate(&self, position: &Position, _perspective: PlayerId, rng: &mut StdRng) -> f64 {
        if position.is_terminal_position() {
            rng.gen_range(-1.0..=1.0)
        } else {
            rng.gen_range(-0.5..=0.5)
        }
    }
}

#[derive(Debug, Default)]
pub struct HeuristicRollout {
    scorer: PositionScorer,
}

impl RolloutEvaluator for HeuristicRollout {
    fn evaluate(&self, position: &Position, perspective: PlayerId, _rng: &mut StdRng) -> f64 {
        self.scorer.relative_value(position, perspective)
    }
}

pub fn evaluator_for(scorer: RolloutScorer) -> Box<dyn RolloutEvaluator> {
    match scorer {
        RolloutScorer::Heuristic => Box::new(HeuristicRollout::default()),
        RolloutScorer::Random => Box::new(RandomBaseline),
    }
}

#[cfg(test)]
mod tests {
    use super::{RandomBaseline, RolloutEvaluator, evaluator_for};
    use crate::mcts::config::RolloutScorer;
    use ofc_core::{GameRules, Layout, PlayerId, Position, Seat};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn empty_position() -> Position {
        Position::new(
            "r",
            vec![Seat { player: PlayerId(0), layout: Layout::new() }],
            vec![],
            PlayerId(0),
            1,
            GameRules::pineapple(1),
        )
        .unwrap()
    }

    #[test]
    fn random_baseline_stays_in_half_range_before_the_end() {
        let mut rng = StdRng::seed_from_u64(1);
        let position = empty_position();
        for _ in 0..100 {
            let value = RandomBaseline.evaluate(&position, PlayerId(0), &mut rng);
            assert!((-0.5..=0.5).contains(&value));
        }
    }

    #[test]
    fn heuristic_scores_empty_board_as_neutral() {
        let mut rng = StdRng::seed_from_u64(1);
        let evaluator = evaluator_for(RolloutScorer::Heuristic);
        assert_eq!(evaluator.evaluate(&empty_position(), PlayerId(0), &mut rng), 0.0);
    }
}
