//! MCTS configuration parameters.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};

const DEFAULT_SIMULATIONS: u32 = 10_000;
const DEFAULT_MAX_DEPTH: u32 = 20;
const DEFAULT_BATCH_SIZE: u32 = 100;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CONVERGENCE: u32 = 100;

/// Which function scores a rollout's final position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutScorer {
    /// Row strength, royalties, Fantasy Land and foul penalties.
    #[default]
    Heuristic,
    /// Uniform noise: [-1, 1] at terminal positions, [-0.5, 0.5] otherwise.
    /// A baseline only, not a real evaluator.
    Random,
}

impl RolloutScorer {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Some(RolloutScorer::Heuristic),
            "random" | "baseline" => Some(RolloutScorer::Random),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Simulation budget.
    pub num_simulations: u32,
    /// UCB1 exploration constant.
    pub exploration: f64,
    /// Cap on random moves per rollout.
    pub max_simulation_depth: u32,
    /// Simulations between timeout and convergence checks.
    pub batch_size: u32,
    pub timeout_ms: u64,
    /// Simulations without a best-move change (and minimum root visits)
    /// before the search is declared converged.
    pub convergence_threshold: u32,
    /// Fixed seed for reproducible searches; `None` draws from entropy.
    pub seed: Option<u64>,
    pub scorer: RolloutScorer,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: DEFAULT_SIMULATIONS,
            exploration: std::f64::consts::SQRT_2,
            max_simulation_depth: DEFAULT_MAX_DEPTH,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            convergence_threshold: DEFAULT_CONVERGENCE,
            seed: None,
            scorer: RolloutScorer::default(),
        }
    }
}

impl MctsConfig {
    /// Small, seeded configuration for tests.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 200,
            batch_size: 20,
            timeout_ms: 10_000,
            convergence_threshold: 1_000,
            seed: Some(7),
            ..Self::default()
        }
    }

    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_batch_size(mut self, size: u32) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_convergence_threshold(mut self, threshold: u32) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_scorer(mut self, scorer: RolloutScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        let invalid = |field: &'static str, message: &str| {
            Err(SearchError::InvalidConfig {
                field,
                message: message.to_string(),
            })
        };
        if self.num_simulations == 0 {
            return invalid("num_simulations", "must be greater than zero");
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return invalid("exploration", "must be a finite, non-negative number");
        }
        if self.batch_size == 0 {
            return invalid("batch_size", "must be greater than zero");
        }
        if self.timeout_ms == 0 {
            return invalid("timeout_ms", "must be greater than zero");
        }
        Ok(())
    }

    /// Defaults overridden by `OFC_MCTS_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `read`; unparsable values keep the default.
    pub fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let num = |raw: Option<String>| raw.and_then(|raw| raw.trim().parse::<u32>().ok());

        let num_simulations = num(read("OFC_MCTS_SIMULATIONS"))
            .filter(|value| *value > 0)
            .unwrap_or(defaults.num_simulations);
        let exploration = read("OFC_MCTS_EXPLORATION")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value >= 0.0)
            .unwrap_or(defaults.exploration);
        let max_simulation_depth =
            num(read("OFC_MCTS_MAX_DEPTH")).unwrap_or(defaults.max_simulation_depth);
        let batch_size = num(read("OFC_MCTS_BATCH_SIZE"))
            .filter(|value| *value > 0)
            .unwrap_or(defaults.batch_size);
        let timeout_ms = read("OFC_MCTS_TIMEOUT_MS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.timeout_ms);
        let convergence_threshold =
            num(read("OFC_MCTS_CONVERGENCE")).unwrap_or(defaults.convergence_threshold);
        let seed = read("OFC_MCTS_SEED").and_then(|raw| raw.trim().parse::<u64>().ok());
        let scorer = read("OFC_MCTS_SCORER")
            .and_then(|raw| RolloutScorer::parse(&raw))
            .unwrap_or(defaults.scorer);

        Self {
            num_simulations,
            exploration,
            max_simulation_depth,
            batch_size,
            timeout_ms,
            convergence_threshold,
            seed,
            scorer,
        }
    }
}
