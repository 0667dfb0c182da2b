use std::fs;
use std::path::Path;

use ofc_core::Row;
use serde::Serialize;

use crate::runner::RequestRow;

/// Aggregates over every request of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchSummary {
    pub run_id: String,
    pub requests: usize,
    pub avg_expected_value: f64,
    pub avg_confidence: f64,
    pub converged: usize,
    pub timed_out: usize,
    pub avg_simulations: f64,
    pub avg_mcts_nodes: f64,
    pub avg_tree_nodes: f64,
    pub transposition_hits: u64,
    pub avg_analysis_ms: f64,
    pub max_analysis_ms: u64,
    pub wall_ms: u64,
    /// Recommendations per row, in top, middle, bottom order.
    pub best_rows: [usize; 3],
    pub no_recommendation: usize,
}

impl BenchSummary {
    pub fn from_rows(run_id: &str, rows: &[RequestRow], wall_ms: u64) -> Self {
        let mut best_rows = [0usize; 3];
        let mut no_recommendation = 0;
        for row in rows {
            match row.best_row {
                Some(best) => {
                    if let Some(slot) = Row::ALL.iter().position(|candidate| *candidate == best) {
                        best_rows[slot] += 1;
                    }
                }
                None => no_recommendation += 1,
            }
        }

        Self {
            run_id: run_id.to_string(),
            requests: rows.len(),
            avg_expected_value: mean(rows.iter().map(|row| row.expected_value)),
            avg_confidence: mean(rows.iter().map(|row| row.confidence)),
            converged: rows.iter().filter(|row| row.converged).count(),
            timed_out: rows.iter().filter(|row| row.timed_out).count(),
            avg_simulations: mean(rows.iter().map(|row| f64::from(row.simulations))),
            avg_mcts_nodes: mean(rows.iter().map(|row| row.mcts_nodes as f64)),
            avg_tree_nodes: mean(rows.iter().map(|row| row.tree_nodes as f64)),
            transposition_hits: rows.iter().map(|row| row.transposition_hits).sum(),
            avg_analysis_ms: mean(rows.iter().map(|row| row.analysis_ms as f64)),
            max_analysis_ms: rows.iter().map(|row| row.analysis_ms).max().unwrap_or(0),
            wall_ms,
            best_rows,
            no_recommendation,
        }
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let mut out = String::new();
        out.push_str(&format!("# Analysis Summary: {}\n\n", self.run_id));
        out.push_str(&format!(
            "{} requests in {} ms wall time\n\n",
            self.requests, self.wall_ms
        ));
        out.push_str("| Metric | Value |\n");
        out.push_str("|--------|-------|\n");
        for (label, value) in [
            ("Avg expected value", format!("{:+.3}", self.avg_expected_value)),
            ("Avg confidence", format!("{:.3}", self.avg_confidence)),
            ("Converged", format!("{}/{}", self.converged, self.requests)),
            ("Timed out", format!("{}/{}", self.timed_out, self.requests)),
            ("Avg simulations", format!("{:.1}", self.avg_simulations)),
            ("Avg MCTS nodes", format!("{:.1}", self.avg_mcts_nodes)),
            ("Avg tree nodes", format!("{:.1}", self.avg_tree_nodes)),
            ("Transposition hits", self.transposition_hits.to_string()),
            ("Avg ms/analysis", format!("{:.2}", self.avg_analysis_ms)),
            ("Max ms/analysis", self.max_analysis_ms.to_string()),
        ] {
            out.push_str(&format!("| {label} | {value} |\n"));
        }

        out.push_str("\n## Recommended rows\n\n");
        out.push_str("| Row | Count |\n");
        out.push_str("|-----|-------|\n");
        for (row, count) in Row::ALL.iter().zip(self.best_rows) {
            out.push_str(&format!("| {row} | {count} |\n"));
        }
        if self.no_recommendation > 0 {
            out.push_str(&format!("| none | {} |\n", self.no_recommendation));
        }

        fs::write(path.as_ref(), out)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::{BenchSummary, mean};
    use crate::runner::RequestRow;
    use ofc_core::Row;

    fn row(best_row: Option<Row>, expected_value: f64, converged: bool) -> RequestRow {
        RequestRow {
            run_id: "t".to_string(),
            request_id: "R00000".to_string(),
            deal_seed: 1,
            players: 2,
            position_hash: String::new(),
            best_move: None,
            best_row,
            expected_value,
            confidence: 1.0,
            simulations: 100,
            converged,
            timed_out: false,
            mcts_nodes: 10,
            tree_nodes: 4,
            tree_leaves: 3,
            tree_fouled: 0,
            transposition_hits: 2,
            tree_ms: 0,
            analysis_ms: 5,
        }
    }

    #[test]
    fn aggregates_rows() {
        let rows = vec![
            row(Some(Row::Bottom), 0.5, true),
            row(Some(Row::Bottom), -0.1, false),
            row(None, 0.2, false),
        ];
        let summary = BenchSummary::from_rows("t", &rows, 42);
        assert_eq!(summary.requests, 3);
        assert_eq!(summary.best_rows, [0, 0, 2]);
        assert_eq!(summary.no_recommendation, 1);
        assert_eq!(summary.converged, 1);
        assert_eq!(summary.transposition_hits, 6);
        assert!((summary.avg_expected_value - 0.2).abs() < 1e-12);
    }

    #[test]
    fn empty_run_has_zero_means() {
        assert_eq!(mean(std::iter::empty()), 0.0);
        let summary = BenchSummary::from_rows("t", &[], 0);
        assert_eq!(summary.max_analysis_ms, 0);
    }
}
