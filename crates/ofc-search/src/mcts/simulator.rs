use crate::error::SearchError;
use crate::mcts::config::MctsConfig;
use crate::mcts::node::{MctsNodeId, MctsTree};
use crate::mcts::rollout::{RolloutEvaluator, evaluator_for};
use core::marker::PhantomData;
use ofc_core::{Move, PlayerId, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::time::{Duration, Instant};
use tracing::{Level, event};

const CONVERGENCE_BONUS: f64 = 0.2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub simulations: u32,
    pub converged: bool,
    pub convergence_simulation: Option<u32>,
    pub timed_out: bool,
    pub elapsed_ms: u64,
    pub best_move_changes: u32,
    /// Longest select/expand path seen, in nodes.
    pub max_depth: usize,
    pub transposition_hits: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub best_move: Option<Move>,
    pub expected_value: f64,
    pub confidence: f64,
    pub nodes_evaluated: usize,
    pub stats: SearchStats,
}

/// UCB1 score of a child seen from its parent. `child_value` must already be
/// expressed from the parent's point of view. Unvisited children score
/// positive infinity.
pub fn ucb1(child_value: f64, child_visits: u32, parent_visits: u32, exploration: f64) -> f64 {
    if child_visits == 0 {
        return f64::INFINITY;
    }
    let parent = f64::from(parent_visits.max(1));
    let child = f64::from(child_visits);
    child_value + exploration * (parent.ln() / child).sqrt()
}

/// Single-request Monte Carlo tree search.
///
/// Statistics are stored with alternating sign along the search path: the
/// root and every even level hold values for the player to move at the
/// root, odd levels hold the negation. A parent therefore reads its
/// children's averages negated when it applies UCB1.
///
/// The simulator owns its RNG and rollout evaluator and is `!Sync`.
pub struct MctsSimulator {
    config: MctsConfig,
    evaluator: Box<dyn RolloutEvaluator>,
    rng: StdRng,
    _single_owner: PhantomData<Cell<()>>,
}

impl MctsSimulator {
    pub fn new(config: MctsConfig) -> Result<Self, SearchError> {
        let evaluator = evaluator_for(config.scorer);
        Self::with_evaluator(config, evaluator)
    }

    pub fn with_evaluator(
        config: MctsConfig,
        evaluator: Box<dyn RolloutEvaluator>,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            evaluator,
            rng,
            _single_owner: PhantomData,
        })
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Runs simulations in batches until the budget is spent, the timeout
    /// passes, or the best move settles. Time and convergence are checked
    /// only between batches.
    pub fn analyze(&mut self, position: &Position) -> AnalysisResult {
        let start = Instant::now();
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let budget = self.config.num_simulations;
        let threshold = self.config.convergence_threshold;
        let perspective = position.current_player();

        let mut tree = MctsTree::new(position.clone());
        let mut stats = SearchStats::default();
        let mut last_best: Option<Move> = None;
        let mut unchanged = 0u32;

        while stats.simulations < budget {
            if start.elapsed() > timeout {
                stats.timed_out = true;
                tracing::warn!(
                    target: "ofc_search::mcts",
                    simulations = stats.simulations,
                    timeout_ms = self.config.timeout_ms,
                    message = "search timed out; returning best move so far"
                );
                break;
            }

            let batch = self.config.batch_size.min(budget - stats.simulations);
            for _ in 0..batch {
                let depth = self.simulate(&mut tree, perspective);
                stats.max_depth = stats.max_depth.max(depth);
            }
            stats.simulations += batch;

            let best = tree.best_move();
            if best != last_best {
                stats.best_move_changes += 1;
                last_best = best;
                unchanged = 0;
            } else {
                unchanged += batch;
            }
            if unchanged >= threshold && tree.get(tree.root()).visits >= threshold {
                stats.converged = true;
                stats.convergence_simulation = Some(stats.simulations);
                break;
            }
        }

        stats.elapsed_ms = start.elapsed().as_millis() as u64;
        stats.transposition_hits = tree.transposition_hits();

        let root = tree.get(tree.root());
        let mut confidence = (f64::from(stats.simulations) / f64::from(budget)).min(1.0);
        if stats.converged {
            confidence = (confidence + CONVERGENCE_BONUS).min(1.0);
        }
        let result = AnalysisResult {
            best_move: tree.best_move(),
            expected_value: root.average_value(),
            confidence,
            nodes_evaluated: tree.len(),
            stats,
        };

        event!(
            target: "ofc_search::mcts",
            Level::INFO,
            position = %position.get_position_hash(),
            simulations = result.stats.simulations,
            converged = result.stats.converged,
            timed_out = result.stats.timed_out,
            elapsed_ms = result.stats.elapsed_ms,
            nodes = result.nodes_evaluated,
            best_move = ?result.best_move.map(|mv| mv.to_string()),
            expected_value = result.expected_value,
            confidence = result.confidence,
        );
        result
    }

    /// One select, expand, rollout, backpropagate pass. Returns the path length.
    fn simulate(&mut self, tree: &mut MctsTree, perspective: PlayerId) -> usize {
        let mut path = vec![tree.root()];
        let mut current = tree.root();

        while !tree.get(current).is_frontier() {
            current = self.select_child(tree, current);
            path.push(current);
        }

        if let Some(child) = self.expand(tree, current) {
            path.push(child);
            current = child;
        }

        let value = self.rollout(&tree.get(current).position, perspective);

        for (depth, id) in path.iter().enumerate() {
            let signed = if depth % 2 == 0 { value } else { -value };
            tree.get_mut(*id).record(signed);
        }
        path.len()
    }

    fn select_child(&self, tree: &MctsTree, parent: MctsNodeId) -> MctsNodeId {
        let node = tree.get(parent);
        let mut best = (node.children[0].1, f64::NEG_INFINITY);
        for (_, child) in &node.children {
            let stats = tree.get(*child);
            let score = ucb1(
                -stats.average_value(),
                stats.visits,
                node.visits,
                self.config.exploration,
            );
            if score > best.1 {
                best = (*child, score);
            }
        }
        best.0
    }

    fn expand(&mut self, tree: &mut MctsTree, id: MctsNodeId) -> Option<MctsNodeId> {
        let node = tree.get(id);
        if node.is_terminal || node.visits == 0 || node.untried.is_empty() {
            return None;
        }
        let pick = self.rng.gen_range(0..node.untried.len());
        let mv = tree.get_mut(id).untried.swap_remove(pick);
        let next = tree.get(id).position.apply_move(mv).ok()?;
        let (child, _) = tree.intern(next);
        tree.get_mut(id).children.push((mv, child));
        Some(child)
    }

    fn rollout(&mut self, start: &Position, perspective: PlayerId) -> f64 {
        let mut position = start.clone();
        for _ in 0..self.config.max_simulation_depth {
            if position.is_terminal_position() {
                break;
            }
            let moves = position.get_legal_moves();
            if moves.is_empty() {
                break;
            }
            let mv = moves[self.rng.gen_range(0..moves.len())];
            match position.apply_move(mv) {
                Ok(next) => position = next,
                Err(_) => break,
            }
        }
        self.evaluator.evaluate(&position, perspective, &mut self.rng)
    }
}

impl core::fmt::Debug for MctsSimulator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MctsSimulator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{MctsSimulator, ucb1};
    use crate::mcts::config::{MctsConfig, RolloutScorer};
    use ofc_core::{Deck, GameRules, Layout, PlayerId, Position, Seat};

    fn opening(seed: u64) -> Position {
        let deck = Deck::shuffled_with_seed(seed).into_cards();
        let hand_a = Layout::new().with_dealt(&deck[..5]).unwrap();
        let hand_b = Layout::new().with_dealt(&deck[5..10]).unwrap();
        Position::new(
            "mcts",
            vec![
                Seat { player: PlayerId(0), layout: hand_a },
                Seat { player: PlayerId(1), layout: hand_b },
            ],
            deck[10..].to_vec(),
            PlayerId(0),
            1,
            GameRules::default(),
        )
        .unwrap()
    }

    #[test]
    fn ucb1_prefers_unvisited_children() {
        assert!(ucb1(0.0, 0, 10, 1.4).is_infinite());
        let explored = ucb1(0.5, 10, 100, 2f64.sqrt());
        let expected = 0.5 + 2f64.sqrt() * ((100f64).ln() / 10.0).sqrt();
        assert!((explored - expected).abs() < 1e-12);
    }

    #[test]
    fn best_move_is_legal() {
        let position = opening(3);
        let mut simulator = MctsSimulator::new(MctsConfig::for_testing()).unwrap();
        let result = simulator.analyze(&position);
        let best = result.best_move.expect("opening has legal moves");
        assert!(position.get_legal_moves().contains(&best));
        assert_eq!(result.stats.simulations, 200);
        assert!((result.confidence - 1.0).abs() < 1e-12);
        assert!(result.nodes_evaluated > 1);
        assert!((-1.0..=1.0).contains(&result.expected_value));
    }

    #[test]
    fn seeded_searches_are_reproducible() {
        let position = opening(8);
        let config = MctsConfig::for_testing().with_scorer(RolloutScorer::Random);
        let a = MctsSimulator::new(config.clone()).unwrap().analyze(&position);
        let b = MctsSimulator::new(config).unwrap().analyze(&position);
        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.nodes_evaluated, b.nodes_evaluated);
        assert_eq!(a.expected_value, b.expected_value);
    }

    #[test]
    fn convergence_stops_early_and_adds_bonus() {
        let position = opening(5);
        let config = MctsConfig::for_testing()
            .with_simulations(1_000)
            .with_batch_size(10)
            .with_convergence_threshold(50)
            .with_seed(5);
        let result = MctsSimulator::new(config).unwrap().analyze(&position);
        assert!(result.stats.converged);
        assert!(!result.stats.timed_out);
        assert_eq!(result.stats.simulations, 750);
        assert_eq!(result.stats.convergence_simulation, Some(750));
        assert!((result.confidence - 0.95).abs() < 1e-12);
    }

    #[test]
    fn timeout_returns_best_move_so_far() {
        let position = opening(5);
        let budget = 5_000_000;
        let config = MctsConfig::for_testing()
            .with_simulations(budget)
            .with_batch_size(1)
            .with_convergence_threshold(budget)
            .with_timeout_ms(5);
        let result = MctsSimulator::new(config).unwrap().analyze(&position);
        assert!(result.stats.timed_out);
        assert!(!result.stats.converged);
        assert!(result.stats.simulations < budget);
        let best = result.best_move.expect("search ran at least one batch");
        assert!(position.get_legal_moves().contains(&best));
        assert!(result.confidence < 1.0);
    }

    #[test]
    fn no_moves_means_no_recommendation() {
        let deck = Deck::standard().into_cards();
        let position = Position::new(
            "empty-hand",
            vec![Seat { player: PlayerId(0), layout: Layout::new() }],
            deck,
            PlayerId(0),
            1,
            GameRules::pineapple(1),
        )
        .unwrap();
        let result = MctsSimulator::new(MctsConfig::for_testing())
            .unwrap()
            .analyze(&position);
        assert_eq!(result.best_move, None);
        assert_eq!(result.nodes_evaluated, 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(MctsSimulator::new(MctsConfig::default().with_simulations(0)).is_err());
    }
}
