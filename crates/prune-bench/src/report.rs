//! Comparison metrics and the fixed-width results table.
//!
//! Only trials in which both workflows ran every call successfully are
//! compared. A workflow with a failed or skipped call processed fewer tokens
//! than a finished one would have, so its totals would inflate the reduction.
//! Those trials still show up in the call-failure warnings.

use std::fmt::Write as _;
use std::ops::Add;

use crate::error::ReportError;
use crate::stats::Summary;
use crate::workflow::{Trial, WorkflowResult};

const WIDE_RULE: usize = 40;
const TABLE_RULE: usize = 45;

/// Banner printed before the first workflow runs.
pub fn start_banner(device: &str) -> String {
    format!("--- STARTING EXPERIMENT ON {device} ---")
}

/// Percentage of baseline tokens the graph workflow saved.
///
/// Negative when the graph workflow processed more tokens. Undefined when the
/// baseline processed none.
pub fn token_reduction_pct(base_tokens: u64, graph_tokens: u64) -> Result<f64, ReportError> {
    if base_tokens == 0 {
        return Err(ReportError::ZeroBaseline);
    }
    let diff = base_tokens as f64 - graph_tokens as f64;
    Ok(100.0 * diff / base_tokens as f64)
}

/// Baseline-versus-graph deltas for one trial, or summed over several.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub base_time: f64,
    pub graph_time: f64,
    pub base_tokens: u64,
    pub graph_tokens: u64,
}

impl Comparison {
    pub fn new(baseline: &WorkflowResult, graph: &WorkflowResult) -> Self {
        Self {
            base_time: baseline.total_duration.as_secs_f64(),
            graph_time: graph.total_duration.as_secs_f64(),
            base_tokens: baseline.total_tokens,
            graph_tokens: graph.total_tokens,
        }
    }

    /// Seconds saved by the graph workflow.
    pub fn time_diff(&self) -> f64 {
        self.base_time - self.graph_time
    }

    /// Tokens saved by the graph workflow.
    pub fn token_diff(&self) -> i64 {
        self.base_tokens as i64 - self.graph_tokens as i64
    }

    pub fn token_reduction_pct(&self) -> Result<f64, ReportError> {
        token_reduction_pct(self.base_tokens, self.graph_tokens)
    }
}

impl From<&Trial> for Comparison {
    fn from(trial: &Trial) -> Self {
        Comparison::new(&trial.baseline, &trial.graph)
    }
}

impl Add for Comparison {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            base_time: self.base_time + other.base_time,
            graph_time: self.graph_time + other.graph_time,
            base_tokens: self.base_tokens + other.base_tokens,
            graph_tokens: self.graph_tokens + other.graph_tokens,
        }
    }
}

/// Per-workflow statistics.
///
/// `duration`, `tokens` and `total_tokens` cover compared trials only.
/// `failed_calls` and `skipped_calls` count every trial that ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowStats {
    pub duration: Summary,
    pub tokens: Summary,
    pub total_tokens: u64,
    pub failed_calls: u32,
    pub skipped_calls: u32,
}

impl WorkflowStats {
    fn from_results<'a>(
        compared: impl Iterator<Item = &'a WorkflowResult> + Clone,
        all: impl Iterator<Item = &'a WorkflowResult> + Clone,
    ) -> Self {
        let durations: Vec<f64> = compared
            .clone()
            .map(|r| r.total_duration.as_secs_f64())
            .collect();
        let tokens: Vec<f64> = compared.clone().map(|r| r.total_tokens as f64).collect();
        Self {
            duration: Summary::from_samples(&durations).unwrap_or_default(),
            tokens: Summary::from_samples(&tokens).unwrap_or_default(),
            total_tokens: compared.map(|r| r.total_tokens).sum(),
            failed_calls: all.clone().map(|r| r.failed_calls).sum(),
            skipped_calls: all.map(|r| r.skipped_calls).sum(),
        }
    }

    fn incomplete_note(&self, name: &str) -> Option<String> {
        if self.failed_calls == 0 && self.skipped_calls == 0 {
            return None;
        }
        Some(format!(
            "WARNING: {name} had {} failed and {} skipped call(s).",
            self.failed_calls, self.skipped_calls
        ))
    }
}

/// Final report over one or more trials.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Trials that ran, compared or not.
    pub trials: usize,
    pub baseline: WorkflowStats,
    pub graph: WorkflowStats,
    /// Sum over compared trials. `None` when no trial completed.
    pub overall: Option<Comparison>,
}

impl Report {
    pub fn from_trials(trials: &[Trial]) -> Self {
        let complete = || trials.iter().filter(|t| t.is_complete());
        Self {
            trials: trials.len(),
            baseline: WorkflowStats::from_results(
                complete().map(|t| &t.baseline),
                trials.iter().map(|t| &t.baseline),
            ),
            graph: WorkflowStats::from_results(
                complete().map(|t| &t.graph),
                trials.iter().map(|t| &t.graph),
            ),
            overall: complete().map(Comparison::from).reduce(Comparison::add),
        }
    }

    /// Number of trials in which both workflows completed.
    pub fn compared(&self) -> usize {
        self.baseline.duration.count
    }

    /// Mean seconds saved per compared trial. 0 when nothing was compared.
    pub fn time_diff(&self) -> f64 {
        match self.overall {
            Some(total) => total.time_diff() / self.compared() as f64,
            None => 0.0,
        }
    }

    /// Tokens saved over all compared trials.
    pub fn token_diff(&self) -> i64 {
        self.overall.map_or(0, |total| total.token_diff())
    }

    pub fn token_reduction_pct(&self) -> Result<f64, ReportError> {
        self.overall
            .ok_or(ReportError::IncompleteWorkflow)?
            .token_reduction_pct()
    }

    fn duration_cell(&self, stats: &WorkflowStats) -> String {
        if self.overall.is_none() {
            return "n/a".into();
        }
        format!("{:.2}", stats.duration.mean)
    }

    fn token_cell(&self, stats: &WorkflowStats) -> String {
        match self.compared() {
            0 => "n/a".into(),
            1 => stats.total_tokens.to_string(),
            _ => format!("{:.1}", stats.tokens.mean),
        }
    }

    fn spread_block(&self, out: &mut String, rule: &str) {
        let compared = self.compared();
        if compared == self.trials {
            let _ = writeln!(out, "Trials: {} (mean ± sample std dev, min..max)", self.trials);
        } else {
            let _ = writeln!(
                out,
                "Trials: {compared} of {} compared (mean ± sample std dev, min..max)",
                self.trials
            );
        }
        if compared > 0 {
            let (base, graph) = (&self.baseline, &self.graph);
            let rows = [
                ("Duration (sec)", base.duration.display(2), graph.duration.display(2)),
                ("Duration range", base.duration.range(2), graph.duration.range(2)),
                ("Total Tokens", base.tokens.display(1), graph.tokens.display(1)),
                ("Token range", base.tokens.range(0), graph.tokens.range(0)),
            ];
            for (label, b, g) in rows {
                let _ = writeln!(out, "{label:<20} | {b} | {g}");
            }
        }
        let _ = writeln!(out, "{rule}");
    }

    fn savings_line(&self) -> String {
        if self.overall.is_none() {
            return format!("TIME SAVED: n/a ({})", ReportError::IncompleteWorkflow);
        }
        let diff = self.token_diff();
        let tokens = if diff >= 0 {
            format!("{diff} fewer")
        } else {
            format!("{} more", diff.unsigned_abs())
        };
        format!(
            "TIME SAVED: {:.2}s per run, {tokens} tokens in total.",
            self.time_diff()
        )
    }

    /// Render the fixed-width results table.
    pub fn render(&self) -> String {
        let wide = "=".repeat(WIDE_RULE);
        let rule = "-".repeat(TABLE_RULE);
        let mut out = String::new();

        let _ = writeln!(out, "\n{wide}");
        let _ = writeln!(out, "       EXPERIMENTAL RESULTS");
        let _ = writeln!(out, "{wide}");
        let _ = writeln!(out, "{:<20} | {:<10} | {:<10}", "Metric", "Baseline", "Graph (Yours)");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "{:<20} | {:<10} | {:<10}",
            "Duration (sec)",
            self.duration_cell(&self.baseline),
            self.duration_cell(&self.graph)
        );
        let _ = writeln!(
            out,
            "{:<20} | {:<10} | {:<10}",
            "Total Tokens",
            self.token_cell(&self.baseline),
            self.token_cell(&self.graph)
        );
        let _ = writeln!(out, "{rule}");

        if self.trials > 1 {
            self.spread_block(&mut out, &rule);
        }

        for note in [
            self.baseline.incomplete_note("baseline"),
            self.graph.incomplete_note("graph"),
        ]
        .into_iter()
        .flatten()
        {
            let _ = writeln!(out, "{note}");
        }
        let excluded = self.trials - self.compared();
        if excluded > 0 {
            let _ = writeln!(
                out,
                "WARNING: {excluded} of {} trial(s) excluded from the comparison.",
                self.trials
            );
        }

        let _ = writeln!(out, "{}", self.savings_line());
        match self.token_reduction_pct() {
            Ok(pct) => {
                let _ = writeln!(
                    out,
                    "EFFICIENCY GAIN: {pct:.2}% reduction in processing load."
                );
            }
            Err(e) => {
                let _ = writeln!(out, "EFFICIENCY GAIN: n/a ({e})");
            }
        }
        let _ = write!(out, "{wide}");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(tokens: u64, secs: f64) -> WorkflowResult {
        WorkflowResult {
            total_duration: Duration::from_secs_f64(secs),
            total_tokens: tokens,
            calls: 2,
            ..Default::default()
        }
    }

    fn failed_after_manager(tokens: u64, secs: f64) -> WorkflowResult {
        WorkflowResult {
            calls: 1,
            failed_calls: 1,
            ..result(tokens, secs)
        }
    }

    #[test]
    fn reduction_matches_hand_computation() {
        let pct = token_reduction_pct(1000, 400).unwrap();
        assert!((pct - 60.0).abs() < 1e-9);
        assert_eq!(format!("{pct:.2}"), "60.00");
    }

    #[test]
    fn reduction_with_zero_baseline_is_an_error() {
        assert_eq!(token_reduction_pct(0, 0), Err(ReportError::ZeroBaseline));
        assert_eq!(token_reduction_pct(0, 50), Err(ReportError::ZeroBaseline));
    }

    #[test]
    fn reduction_can_be_negative() {
        let pct = token_reduction_pct(100, 150).unwrap();
        assert!((pct + 50.0).abs() < 1e-9);
    }

    #[test]
    fn comparison_deltas_add_across_trials() {
        let first = Comparison::new(&result(1000, 10.0), &result(400, 4.5));
        assert!((first.time_diff() - 5.5).abs() < 1e-9);
        assert_eq!(first.token_diff(), 600);
        assert!((first.token_reduction_pct().unwrap() - 60.0).abs() < 1e-9);

        let both = first + Comparison::new(&result(1000, 10.0), &result(1000, 10.0));
        assert_eq!(both.base_tokens, 2000);
        assert_eq!(both.token_diff(), 600);
        assert!((both.token_reduction_pct().unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn render_single_trial_table() {
        let trials = [Trial {
            baseline: result(1000, 12.5),
            graph: result(400, 5.25),
        }];
        let text = Report::from_trials(&trials).render();

        assert!(text.contains("       EXPERIMENTAL RESULTS"));
        assert!(text.contains("Metric               | Baseline   | Graph (Yours)"));
        assert!(text.contains("Duration (sec)       | 12.50      | 5.25"));
        assert!(text.contains("Total Tokens         | 1000       | 400"));
        assert!(text.contains("TIME SAVED: 7.25s per run, 600 fewer tokens in total."));
        assert!(text.contains("EFFICIENCY GAIN: 60.00% reduction in processing load."));
        assert!(!text.contains("Trials:"));
        assert!(!text.contains("WARNING"));
    }

    #[test]
    fn render_words_token_increase_as_more() {
        let trials = [Trial {
            baseline: result(100, 2.0),
            graph: result(150, 3.0),
        }];
        let text = Report::from_trials(&trials).render();
        assert!(text.contains("TIME SAVED: -1.00s per run, 50 more tokens in total."));
        assert!(!text.contains("fewer"));
        assert!(text.contains("EFFICIENCY GAIN: -50.00% reduction in processing load."));
    }

    #[test]
    fn render_zero_baseline_reports_na() {
        // Both calls succeeded but the server reported no counters.
        let trials = [Trial {
            baseline: result(0, 1.0),
            graph: result(55, 1.0),
        }];
        let report = Report::from_trials(&trials);
        assert_eq!(report.token_reduction_pct(), Err(ReportError::ZeroBaseline));
        let text = report.render();
        assert!(text.contains("EFFICIENCY GAIN: n/a (baseline processed no tokens)"));
        assert!(!text.contains("WARNING"));
    }

    #[test]
    fn failed_graph_is_not_reported_as_efficient() {
        let trials = [Trial {
            baseline: result(180, 5.0),
            graph: WorkflowResult {
                failed_calls: 1,
                skipped_calls: 1,
                ..Default::default()
            },
        }];
        let report = Report::from_trials(&trials);

        assert_eq!(report.compared(), 0);
        assert_eq!(
            report.token_reduction_pct(),
            Err(ReportError::IncompleteWorkflow)
        );
        let text = report.render();
        assert!(text.contains("Duration (sec)       | n/a        | n/a"));
        assert!(text.contains("Total Tokens         | n/a        | n/a"));
        assert!(text.contains("WARNING: graph had 1 failed and 1 skipped call(s)."));
        assert!(text.contains("WARNING: 1 of 1 trial(s) excluded from the comparison."));
        assert!(text.contains("TIME SAVED: n/a (no trial completed both workflows)"));
        assert!(text.contains("EFFICIENCY GAIN: n/a (no trial completed both workflows)"));
        assert!(!text.contains("100.00%"));
    }

    #[test]
    fn incomplete_trial_is_left_out_of_means_and_totals() {
        let trials = [
            Trial {
                baseline: result(180, 5.0),
                graph: result(55, 1.25),
            },
            Trial {
                baseline: result(180, 5.0),
                graph: failed_after_manager(30, 0.5),
            },
        ];
        let report = Report::from_trials(&trials);

        assert_eq!(report.compared(), 1);
        assert_eq!(report.graph.total_tokens, 55);
        assert_eq!(report.baseline.total_tokens, 180);
        assert_eq!(report.graph.tokens.std_dev, 0.0);
        assert_eq!(report.graph.failed_calls, 1);
        assert_eq!(report.token_diff(), 125);
        assert!((report.time_diff() - 3.75).abs() < 1e-9);

        let text = report.render();
        assert!(text.contains("Total Tokens         | 180        | 55"));
        assert!(text.contains("Trials: 1 of 2 compared"));
        assert!(text.contains("WARNING: 1 of 2 trial(s) excluded from the comparison."));
        assert!(text.contains("EFFICIENCY GAIN: 69.44% reduction in processing load."));
    }

    #[test]
    fn render_multiple_trials_shows_spread() {
        let trials = [
            Trial {
                baseline: result(200, 10.0),
                graph: result(50, 4.0),
            },
            Trial {
                baseline: result(100, 8.0),
                graph: result(50, 2.0),
            },
        ];
        let report = Report::from_trials(&trials);
        assert!((report.time_diff() - 6.0).abs() < 1e-9);
        assert_eq!(report.token_diff(), 200);

        let text = report.render();
        assert!(text.contains("Total Tokens         | 150.0      | 50.0"));
        assert!(text.contains("Trials: 2 (mean ± sample std dev, min..max)"));
        assert!(text.contains("Duration range       | 8.00..10.00 | 2.00..4.00"));
        assert!(text.contains("Token range          | 100..200 | 50..50"));
        // 300 baseline vs 100 graph tokens overall.
        assert!(text.contains("EFFICIENCY GAIN: 66.67%"));
    }

    #[test]
    fn banner_includes_device() {
        assert_eq!(
            start_banner("device: unknown"),
            "--- STARTING EXPERIMENT ON device: unknown ---"
        );
    }
}
