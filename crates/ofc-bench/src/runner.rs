use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use ofc_core::{
    Card, Deck, GameRules, Layout, LayoutError, PlayerId, Position, PositionError, Row, Seat,
};
use ofc_search::{MctsSimulator, SearchError, TreeBuilder};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{BenchmarkConfig, ResolvedOutputs};
use crate::summary::BenchSummary;

/// Runs one independent analysis request per deal, in parallel, and writes
/// the results in deal order.
pub struct BenchRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub requests: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub summary: BenchSummary,
}

/// One JSONL line: the tree build and MCTS analysis of a single deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRow {
    pub run_id: String,
    pub request_id: String,
    pub deal_seed: u64,
    pub players: u8,
    pub position_hash: String,
    pub best_move: Option<String>,
    pub best_row: Option<Row>,
    pub expected_value: f64,
    pub confidence: f64,
    pub simulations: u32,
    pub converged: bool,
    pub timed_out: bool,
    pub mcts_nodes: usize,
    pub tree_nodes: usize,
    pub tree_leaves: usize,
    pub tree_fouled: usize,
    pub transposition_hits: u64,
    pub tree_ms: u64,
    pub analysis_ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct Request {
    index: usize,
    seed: u64,
}

impl BenchRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let needed = usize::from(config.deals.players) * config.deals.initial_cards;
        if needed > Deck::standard().len() {
            return Err(RunnerError::DeckTooSmall { needed });
        }
        Ok(Self { config, outputs })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Execute every request, then write JSONL rows and the Markdown summary.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let requests = self.plan_requests();
        let started = Instant::now();
        let rows = match self.config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(|| self.run_all(&requests))?,
            None => self.run_all(&requests)?,
        };
        let wall_ms = started.elapsed().as_millis() as u64;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        for row in &rows {
            serde_json::to_writer(&mut writer, row)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        let summary = BenchSummary::from_rows(&self.config.run_id, &rows, wall_ms);
        summary.write_markdown(&self.outputs.summary_md)?;

        Ok(RunSummary {
            requests: requests.len(),
            rows_written: rows.len(),
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            summary,
        })
    }

    /// Deal seeds are drawn sequentially so the plan does not depend on the
    /// thread count.
    fn plan_requests(&self) -> Vec<Request> {
        let mut rng = StdRng::seed_from_u64(self.config.deals.seed.unwrap_or(0));
        (0..self.config.deals.count)
            .map(|index| Request {
                index,
                seed: rng.next_u64(),
            })
            .collect()
    }

    fn run_all(&self, requests: &[Request]) -> Result<Vec<RequestRow>, RunnerError> {
        requests
            .par_iter()
            .map(|request| self.run_request(*request))
            .collect()
    }

    fn run_request(&self, request: Request) -> Result<RequestRow, RunnerError> {
        let deals = &self.config.deals;
        let cards = Deck::shuffled_with_seed(request.seed).into_cards();
        let hand_size = deals.initial_cards;
        let dealt = usize::from(deals.players) * hand_size;
        let remaining = &cards[dealt..];

        let tree_started = Instant::now();
        let mut builder = TreeBuilder::new(self.config.tree);
        let root_layout = opening_layout(&cards[..hand_size])?;
        builder.build(&root_layout, remaining);
        let tree_stats = builder.get_tree_stats();
        let transposition_hits = builder.transposition_stats().hits;
        let tree_ms = tree_started.elapsed().as_millis() as u64;

        let position = deal_position(request, &cards, deals.players, hand_size)?;
        let mut mcts = self.config.mcts.clone();
        mcts.seed = Some(mcts.seed.map_or(request.seed, |seed| seed ^ request.seed));
        let result = MctsSimulator::new(mcts)?.analyze(&position);

        let row = RequestRow {
            run_id: self.config.run_id.clone(),
            request_id: format!("R{:05}", request.index),
            deal_seed: request.seed,
            players: deals.players,
            position_hash: position.get_position_hash().to_string(),
            best_move: result.best_move.map(|mv| mv.to_string()),
            best_row: result.best_move.map(|mv| mv.row),
            expected_value: result.expected_value,
            confidence: result.confidence,
            simulations: result.stats.simulations,
            converged: result.stats.converged,
            timed_out: result.stats.timed_out,
            mcts_nodes: result.nodes_evaluated,
            tree_nodes: tree_stats.total_nodes,
            tree_leaves: tree_stats.leaf_nodes,
            tree_fouled: tree_stats.fouled_nodes,
            transposition_hits,
            tree_ms,
            analysis_ms: result.stats.elapsed_ms,
        };

        event!(
            target: "ofc_bench::runner",
            Level::INFO,
            request = %row.request_id,
            deal_seed = row.deal_seed,
            best_move = ?row.best_move,
            expected_value = row.expected_value,
            confidence = row.confidence,
            tree_nodes = row.tree_nodes,
            analysis_ms = row.analysis_ms,
        );
        Ok(row)
    }
}

/// Lays the first player's opening cards bottom-up so the tree starts from
/// a hand with nothing left to place.
fn opening_layout(cards: &[Card]) -> Result<Layout, LayoutError> {
    let mut layout = Layout::new();
    for card in cards {
        let row = [Row::Bottom, Row::Middle, Row::Top]
            .into_iter()
            .find(|row| layout.has_capacity(*row))
            .unwrap_or(Row::Top);
        layout = layout.place_card(*card, row)?;
    }
    Ok(layout)
}

fn deal_position(
    request: Request,
    cards: &[Card],
    players: u8,
    hand_size: usize,
) -> Result<Position, PositionError> {
    let mut seats = Vec::with_capacity(usize::from(players));
    for player in 0..players {
        let start = usize::from(player) * hand_size;
        seats.push(Seat {
            player: PlayerId(player),
            layout: Layout::new().with_dealt(&cards[start..start + hand_size])?,
        });
    }
    let dealt = usize::from(players) * hand_size;
    Position::new(
        format!("R{:05}", request.index),
        seats,
        cards[dealt..].to_vec(),
        PlayerId(0),
        1,
        GameRules::pineapple(players),
    )
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize request row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
    #[error("could not deal position: {0}")]
    Position(#[from] PositionError),
    #[error("could not lay out opening hand: {0}")]
    Layout(#[from] LayoutError),
    #[error("deal needs {needed} cards but a deck holds 52")]
    DeckTooSmall { needed: usize },
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
