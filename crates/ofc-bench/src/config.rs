use ofc_search::{MctsConfig, TreeConfig};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_PLAYERS: u8 = 2;
const DEFAULT_INITIAL_CARDS: usize = 5;
const MAX_PLAYERS: u8 = 4;
const MAX_TREE_DEPTH: u32 = 6;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root benchmark configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub deals: DealConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Worker threads for independent requests; `None` uses rayon's default.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.deals.validate()?;
        validate_tree(&self.tree)?;
        self.mcts
            .validate()
            .map_err(|err| ValidationError::InvalidField {
                field: "mcts".to_string(),
                message: err.to_string(),
            })?;
        self.outputs.validate(&self.run_id)?;
        if self.threads == Some(0) {
            return Err(ValidationError::InvalidField {
                field: "threads".to_string(),
                message: "thread count must be greater than zero".to_string(),
            });
        }
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// Which positions get analysed: one request per deal.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DealConfig {
    pub seed: Option<u64>,
    pub count: usize,
    #[serde(default = "default_players")]
    pub players: u8,
    /// Cards dealt to each player before the first decision.
    #[serde(default = "default_initial_cards")]
    pub initial_cards: usize,
}

impl DealConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::InvalidField {
                field: "deals.count".to_string(),
                message: "number of deals must be greater than zero".to_string(),
            });
        }

        if self.players == 0 || self.players > MAX_PLAYERS {
            return Err(ValidationError::InvalidField {
                field: "deals.players".to_string(),
                message: format!("players must be between 1 and {MAX_PLAYERS}"),
            });
        }

        if self.initial_cards == 0 || self.initial_cards > ofc_core::model::layout::LAYOUT_SIZE {
            return Err(ValidationError::InvalidField {
                field: "deals.initial_cards".to_string(),
                message: "initial cards must be between 1 and 13".to_string(),
            });
        }

        Ok(())
    }
}

fn default_players() -> u8 {
    DEFAULT_PLAYERS
}

fn default_initial_cards() -> usize {
    DEFAULT_INITIAL_CARDS
}

fn validate_tree(tree: &TreeConfig) -> Result<(), ValidationError> {
    if tree.max_depth > MAX_TREE_DEPTH {
        return Err(ValidationError::InvalidField {
            field: "tree.max_depth".to_string(),
            message: format!("depth may not exceed {MAX_TREE_DEPTH}"),
        });
    }
    Ok(())
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofc_search::{PlacementPolicy, RolloutScorer};

    const BASIC_YAML: &str = r#"
run_id: "pineapple_smoke"
deals:
  seed: 123
  count: 8
tree:
  max_depth: 2
  placement: "exhaustive"
mcts:
  num_simulations: 300
  scorer: "random"
outputs:
  jsonl: "bench/out/{run_id}/requests.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.deals.players, DEFAULT_PLAYERS);
        assert_eq!(cfg.deals.initial_cards, DEFAULT_INITIAL_CARDS);
        assert_eq!(cfg.tree.placement, PlacementPolicy::Exhaustive);
        assert!(cfg.tree.use_transpositions);
        assert_eq!(cfg.mcts.num_simulations, 300);
        assert_eq!(cfg.mcts.batch_size, MctsConfig::default().batch_size);
        assert_eq!(cfg.mcts.scorer, RolloutScorer::Random);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("bench/out/pineapple_smoke/requests.jsonl")
        );
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("pineapple_smoke", "pineapple smoke");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn rejects_zero_simulations() {
        let yaml = BASIC_YAML.replace("num_simulations: 300", "num_simulations: 0");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("zero simulations");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, message } if field == "mcts" && message.contains("num_simulations")
        ));
    }

    #[test]
    fn rejects_too_many_players() {
        let yaml = BASIC_YAML.replace("count: 8", "count: 8\n  players: 5");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("five players");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "deals.players"
        ));
    }

    #[test]
    fn rejects_deep_trees() {
        let yaml = BASIC_YAML.replace("max_depth: 2", "max_depth: 9");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn outputs_resolve_template_multiple_occurrences() {
        let yaml = BASIC_YAML.replace(
            "bench/out/{run_id}/summary.md",
            "bench/out/{run_id}/{run_id}.md",
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(
            cfg.resolved_outputs().summary_md,
            PathBuf::from("bench/out/pineapple_smoke/pineapple_smoke.md")
        );
    }
}
