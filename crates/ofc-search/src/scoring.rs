//! Static value of a layout, used for rollouts and as a tree leaf score.

use crate::tree::GameTreeNode;
use ofc_core::{HandEvaluator, Layout, PlayerId, Position, Row};

const FANTASY_BONUS: f64 = 20.0;
const FOUL_PENALTY: f64 = 30.0;
/// Scale that maps score differentials into tanh's responsive range.
const SQUASH_SCALE: f64 = 25.0;

/// Scores layouts as weighted hand types (top x1, middle x2, bottom x3) plus
/// royalties, with a Fantasy Land bonus and a flat foul penalty.
#[derive(Debug, Default)]
pub struct PositionScorer {
    evaluator: HandEvaluator,
}

impl PositionScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score_layout(&self, layout: &Layout) -> f64 {
        if self.evaluator.is_fouled(layout).unwrap_or(false) {
            return -FOUL_PENALTY;
        }
        let mut score = 0.0;
        for (row, weight) in [(Row::Top, 1.0), (Row::Middle, 2.0), (Row::Bottom, 3.0)] {
            let cards = layout.row(row);
            if cards.len() < 3 {
                continue;
            }
            if let Ok(ranking) = self.evaluator.evaluate_row(cards, row) {
                score += f64::from(ranking.hand_type.value()) * weight;
                if cards.len() == row.capacity() {
                    score += f64::from(ranking.royalty);
                }
            }
        }
        if layout.top().len() == 3 && self.evaluator.is_fantasy_land_qualifying(layout.top()) {
            score += FANTASY_BONUS;
        }
        score
    }

    pub fn score_node(&self, node: &GameTreeNode) -> f64 {
        self.score_layout(&node.layout)
    }

    /// `player`'s score minus the mean of the other seats, squashed to
    /// [-1, 1]. With one seat the raw score is squashed directly.
    pub fn relative_value(&self, position: &Position, player: PlayerId) -> f64 {
        let mut own = 0.0;
        let mut others = 0.0;
        let mut opponents = 0usize;
        for seat in position.seats() {
            let score = self.score_layout(&seat.layout);
            if seat.player == player {
                own = score;
            } else {
                others += score;
                opponents += 1;
            }
        }
        let baseline = if opponents == 0 {
            0.0
        } else {
            others / opponents as f64
        };
        ((own - baseline) / SQUASH_SCALE).tanh()
    }
}

#[cfg(test)]
mod tests {
    use super::PositionScorer;
    use ofc_core::model::parse_cards;
    use ofc_core::{GameRules, Layout, PlayerId, Position, Seat};

    fn layout(top: &str, middle: &str, bottom: &str) -> Layout {
        Layout::from_rows(
            parse_cards(top).unwrap(),
            parse_cards(middle).unwrap(),
            parse_cards(bottom).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn fouled_layout_is_penalised() {
        let scorer = PositionScorer::new();
        let fouled = layout("Ah Ad Ac", "2c 3d 4h 5s 7c", "9h 9d Ts Kc Qd");
        assert_eq!(scorer.score_layout(&fouled), -30.0);
    }

    #[test]
    fn weights_rows_and_adds_bonuses() {
        let scorer = PositionScorer::new();
        // top pair of queens: 1 + 7 royalty + 20 FL; middle two pair: 2*2; bottom flush: 5*3 + 4.
        let sound = layout("Qh Qd 2c", "5c 5d 8s 8c Kd", "2h 6h 9h Jh Ah");
        assert_eq!(scorer.score_layout(&sound), 1.0 + 7.0 + 20.0 + 4.0 + 15.0 + 4.0);
        assert_eq!(scorer.score_layout(&Layout::new()), 0.0);
    }

    #[test]
    fn relative_value_is_bounded() {
        let scorer = PositionScorer::new();
        let strong = layout("Qh Qd 2c", "5c 5d 8s 8c Kd", "2h 6h 9h Jh Ah");
        let fouled = layout("As Ad Ac", "2d 3d 4h 5s 7c", "9s 9d Ts Kc Jd");
        let position = Position::new(
            "g",
            vec![
                Seat { player: PlayerId(0), layout: strong },
                Seat { player: PlayerId(1), layout: fouled },
            ],
            vec![],
            PlayerId(0),
            1,
            GameRules::default(),
        )
        .unwrap();
        let value = scorer.relative_value(&position, PlayerId(0));
        assert!(value > 0.9 && value <= 1.0);
        let mirrored = scorer.relative_value(&position, PlayerId(1));
        assert!((value + mirrored).abs() < 1e-12);
    }
}
