//! Formatted terminal output.
//!
//! Formatting lives in one place so the analytics code stays free of
//! presentation concerns and output changes stay localized.

use crate::analytics::{IndicatorSnapshot, OSCILLATOR_WINDOW, OVERBOUGHT, OVERSOLD, SMA_LONG, SMA_SHORT};
use crate::app::pipeline::{AssetReport, PortfolioRun, SingleRun, WeightOutcome};
use crate::domain::{ContributionPlan, PortfolioStats, SimulationResult};
use crate::portfolio::WeightStatus;

/// Format a currency amount with thousands separators and 2 decimals.
pub fn format_money(v: f64) -> String {
    let s = format!("{:.2}", v.abs());
    let (int, frac) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && s != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

/// Per-asset performance tables.
pub fn format_performance(reports: &[AssetReport]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&format!("{} ({} observations)\n", report.ticker, report.observations));
        if report.performance.is_empty() {
            out.push_str("  no data for the selected range\n\n");
            continue;
        }
        out.push_str(format!("  {:<6} {:>6} {:>10} {:>10}", "window", "days", "return%", "vol%").trim_end());
        out.push('\n');
        out.push_str(format!("  {:-<6} {:-<6} {:-<10} {:-<10}", "", "", "", "").trim_end());
        out.push('\n');
        for row in &report.performance {
            let vol = row
                .stats
                .volatility_pct
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "n/a".to_string());
            out.push_str(&format!(
                "  {:<6} {:>6} {:>10.2} {:>10}\n",
                row.window, row.days, row.stats.return_pct, vol
            ));
        }
        out.push('\n');
    }
    out
}

/// Weight table plus the balance status line.
pub fn format_weights(outcome: &WeightOutcome) -> String {
    let mut out = String::new();
    out.push_str("Weights:\n");
    for w in outcome.weights.iter() {
        out.push_str(&format!("  {:<6} {:>8.2}%\n", w.asset, w.percent));
    }

    match (outcome.normalized, outcome.edited_status) {
        (true, WeightStatus::Unbalanced { total }) => {
            out.push_str(&format!("  normalized to 100% (entered total {total:.2}%)\n"));
        }
        (_, WeightStatus::Balanced) => out.push_str("  total 100.00%\n"),
        (false, WeightStatus::Unbalanced { total }) => {
            out.push_str(&format!(
                "  total {total:.2}%: weights do not add up to 100% (pass --normalize to rescale)\n"
            ));
        }
    }
    out
}

pub fn format_portfolio_stats(stats: Option<&PortfolioStats>) -> String {
    match stats {
        Some(s) => format!(
            "Portfolio: expected return {:.2}% | volatility {:.2}% (annualized)\n",
            s.expected_return_pct, s.volatility_pct
        ),
        None => "Portfolio: no data for the selected assets and range\n".to_string(),
    }
}

/// Yearly trajectories and the final values.
pub fn format_simulation(plan: &ContributionPlan, result: &SimulationResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Simulation: initial {} + {} x {}/year over {} years at {:.2}%/year\n",
        format_money(plan.initial_amount),
        format_money(plan.periodic_amount),
        plan.contributions_per_year,
        plan.horizon_years,
        plan.annual_rate * 100.0
    ));
    out.push_str(format!("  {:>4} {:>16} {:>16}", "year", "with return", "contributions").trim_end());
    out.push('\n');
    out.push_str(format!("  {:-<4} {:-<16} {:-<16}", "", "", "").trim_end());
    out.push('\n');
    for (year, (with_return, flat)) in result.with_return.iter().zip(&result.flat).enumerate() {
        out.push_str(&format!(
            "  {:>4} {:>16} {:>16}\n",
            year,
            format_money(*with_return),
            format_money(*flat)
        ));
    }
    out.push_str(&format!("Final value with return: {}\n", format_money(result.final_with_return())));
    out.push_str(&format!("Total contributed:       {}\n", format_money(result.final_flat())));
    out
}

/// Latest close, moving averages and the momentum oscillator.
pub fn format_indicators(snapshot: Option<&IndicatorSnapshot>) -> String {
    let Some(s) = snapshot else {
        return "Indicators: no data\n".to_string();
    };

    let opt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "n/a".to_string());
    let mut out = String::new();
    out.push_str(&format!("Indicators as of {}:\n", s.date));
    out.push_str(&format!("  close      {:.2}\n", s.close));
    out.push_str(&format!("  SMA{SMA_SHORT:<7} {}\n", opt(s.sma_short)));
    out.push_str(&format!("  SMA{SMA_LONG:<7} {}\n", opt(s.sma_long)));

    let zone = match s.oscillator {
        Some(v) if v >= OVERBOUGHT => " (overbought)",
        Some(v) if v <= OVERSOLD => " (oversold)",
        _ => "",
    };
    out.push_str(&format!(
        "  RSI{OSCILLATOR_WINDOW:<7} {}{zone}  [bands {OVERSOLD:.0}/{OVERBOUGHT:.0}]\n",
        opt(s.oscillator)
    ));

    if let (Some(short), Some(long)) = (s.sma_short, s.sma_long) {
        let trend = if short >= long { "above" } else { "below" };
        out.push_str(&format!("  SMA{SMA_SHORT} is {trend} SMA{SMA_LONG}\n"));
    }
    out
}

fn format_notes(notes: &[String]) -> String {
    let mut out = String::new();
    if !notes.is_empty() {
        out.push_str("\nNotes:\n");
        for note in notes {
            out.push_str(&format!("- {note}\n"));
        }
    }
    out
}

/// Full `portfolio` output.
pub fn format_portfolio_run(run: &PortfolioRun) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== etfsim - ETF portfolio (as of {}) ===\n\n", run.asof));
    out.push_str(&format_performance(&run.assets));
    out.push_str(&format_weights(&run.weights));
    out.push('\n');
    out.push_str(&format_portfolio_stats(run.stats.as_ref()));
    if let (Some(plan), Some(result)) = (&run.plan, &run.simulation) {
        out.push('\n');
        out.push_str(&format_simulation(plan, result));
    }
    out.push_str(&format_notes(&run.notes));
    out
}

/// Full single-ETF `stats` output.
pub fn format_single_run(run: &SingleRun) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== etfsim - {} (as of {}) ===\n\n", run.ticker, run.asof));
    out.push_str(&format_performance(std::slice::from_ref(&run.report)));
    out.push_str(&format_indicators(run.indicators.latest().as_ref()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PerformanceRow, PeriodStats};
    use crate::portfolio::WeightSet;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn money_uses_thousands_separators() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(999.999), "1,000.00");
        assert_eq!(format_money(1234567.891), "1,234,567.89");
        assert_eq!(format_money(-12345.5), "-12,345.50");
        assert_eq!(format_money(-0.001), "0.00");
    }

    #[test]
    fn performance_table_lists_rows_or_no_data() {
        let reports = vec![
            AssetReport {
                ticker: "SPY".into(),
                observations: 300,
                performance: vec![PerformanceRow {
                    window: "1Y".into(),
                    days: 252,
                    stats: PeriodStats {
                        return_pct: 12.5,
                        volatility_pct: Some(15.25),
                    },
                }],
            },
            AssetReport {
                ticker: "QQQ".into(),
                observations: 0,
                performance: vec![],
            },
        ];
        let text = format_performance(&reports);
        assert!(text.contains("SPY (300 observations)"));
        assert!(text.contains("12.50"));
        assert!(text.contains("15.25"));
        assert!(text.contains("QQQ (0 observations)\n  no data"));
    }

    #[test]
    fn unbalanced_weights_show_total() {
        let weights = WeightSet::from_pairs([("SPY", dec!(60)), ("BND", dec!(35))]).unwrap();
        let outcome = WeightOutcome {
            edited_status: weights.status(),
            weights,
            normalized: false,
        };
        let text = format_weights(&outcome);
        assert!(text.contains("total 95.00%"));
        assert!(text.contains("--normalize"));
    }

    #[test]
    fn simulation_lists_each_year() {
        let plan = ContributionPlan {
            initial_amount: 1000.0,
            periodic_amount: 100.0,
            contributions_per_year: 12,
            horizon_years: 1,
            annual_rate: 0.0,
        };
        let result = SimulationResult {
            with_return: vec![1000.0, 2200.0],
            flat: vec![1000.0, 2200.0],
        };
        let text = format_simulation(&plan, &result);
        assert!(text.contains("Final value with return: 2,200.00"));
        assert!(text.contains("Total contributed:       2,200.00"));
        assert_eq!(text.lines().filter(|l| l.trim_start().starts_with('1')).count(), 1);
    }

    #[test]
    fn indicators_flag_overbought() {
        let snapshot = IndicatorSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            close: 101.0,
            sma_short: Some(100.0),
            sma_long: None,
            oscillator: Some(75.0),
        };
        let text = format_indicators(Some(&snapshot));
        assert!(text.contains("(overbought)"));
        assert!(text.contains("n/a"));
        assert!(!text.contains("is above"));
        assert_eq!(format_indicators(None), "Indicators: no data\n");
    }
}
