//! Aggregation for display
//!
//! Turns the tracker's counters into the per-category numbers the terminal
//! front end draws. Only the two categories of the selected strategy are
//! produced.

use serde::Serialize;

use crate::mh_interface::{Strategy, TrialCount};
use crate::mh_stats::{RunningStats, StrategySnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    StayWin,
    StayLose,
    SwitchWin,
    SwitchLose,
}

impl Category {
    pub fn of(strategy: Strategy, win: bool) -> Self {
        match (strategy, win) {
            (Strategy::Stay, true) => Category::StayWin,
            (Strategy::Stay, false) => Category::StayLose,
            (Strategy::Switch, true) => Category::SwitchWin,
            (Strategy::Switch, false) => Category::SwitchLose,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::StayWin => "stay - win",
            Category::StayLose => "stay - lose",
            Category::SwitchWin => "switch - win",
            Category::SwitchLose => "switch - lose",
        }
    }

    /// Bar colour as a hex RGB string
    pub fn color(self) -> &'static str {
        match self {
            Category::StayWin => "#3b82f6",
            Category::StayLose => "#f59e0b",
            Category::SwitchWin => "#22c55e",
            Category::SwitchLose => "#ef4444",
        }
    }
}

/// One bar of the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBar {
    pub category: Category,
    pub count: TrialCount,
    /// Share of the strategy's trials, rounded to one decimal
    pub percent: f64,
}

impl CategoryBar {
    /// e.g. `"7 runs (70.0%)"`
    pub fn label_text(&self) -> String {
        format!("{} runs ({:.1}%)", self.count, self.percent)
    }
}

/// Per-category counts and percentages for `strategy`.
///
/// Categories without any recorded trial are left out, so an untouched
/// strategy yields an empty list.
pub fn breakdown(stats: &RunningStats, strategy: Strategy) -> Vec<CategoryBar> {
    let total = stats.trials(strategy);
    if total == 0 {
        return Vec::new();
    }

    [
        (Category::of(strategy, true), stats.wins(strategy)),
        (Category::of(strategy, false), stats.losses(strategy)),
    ]
    .into_iter()
    .filter(|(_, count)| *count > 0)
    .map(|(category, count)| CategoryBar {
        category,
        count,
        percent: round_one_decimal(count as f64 / total as f64 * 100.0),
    })
    .collect()
}

pub fn headline(stats: &RunningStats, strategy: Strategy) -> String {
    format!(
        "Strategy: {} (total {} runs)",
        strategy,
        stats.trials(strategy)
    )
}

pub fn summary_line(snapshot: &StrategySnapshot) -> String {
    format!(
        "Result - total {} | wins {} / losses {} | win rate {:.1}%",
        snapshot.tried, snapshot.wins, snapshot.losses, snapshot.win_rate
    )
}

/// Plain-text horizontal bar chart, bars scaled to the largest count.
pub fn render_chart(bars: &[CategoryBar], width: usize) -> String {
    if bars.is_empty() {
        return "No runs yet. Start a run to see results.\n".to_string();
    }

    let max = bars.iter().map(|b| b.count).max().unwrap_or(1).max(1);
    let label_width = bars
        .iter()
        .map(|b| b.category.label().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for bar in bars {
        let len = ((bar.count as f64 / max as f64) * width as f64).round() as usize;
        out.push_str(&format!(
            "{:<lw$} |{:<w$}| {}\n",
            bar.category.label(),
            "#".repeat(len),
            bar.label_text(),
            lw = label_width,
            w = width
        ));
    }
    out
}

// ties go to the even digit: 6.25 -> 6.2, 93.75 -> 93.8
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
