//! Contribution simulator.
//!
//! Two balances are stepped once per contribution period:
//!
//! - with return: `value += periodic; value *= 1 + annual_rate / k`
//! - flat:        `value += periodic`
//!
//! where `k` is the number of contributions per year. A snapshot of each is
//! taken after the last period of every year, so a plan over `n` years yields
//! `n + 1` points (year 0 is the initial amount). Negative rates compound the
//! same way as positive ones.

use tracing::debug;

use crate::domain::{ContributionPlan, SimulationResult};
use crate::error::AnalyticsError;

/// Longest horizon the simulator accepts.
pub const MAX_HORIZON_YEARS: u32 = 100;
/// Most contributions per year the simulator accepts (daily).
pub const MAX_CONTRIBUTIONS_PER_YEAR: u32 = 365;

pub fn simulate(plan: &ContributionPlan) -> Result<SimulationResult, AnalyticsError> {
    validate(plan)?;

    let k = plan.contributions_per_year;
    let growth = 1.0 + plan.annual_rate / k as f64;
    let years = plan.horizon_years as usize;

    let mut invested = plan.initial_amount;
    let mut saved = plan.initial_amount;
    let mut with_return = Vec::with_capacity(years + 1);
    let mut flat = Vec::with_capacity(years + 1);
    with_return.push(invested);
    flat.push(saved);

    for _year in 0..years {
        for _period in 0..k {
            invested += plan.periodic_amount;
            invested *= growth;
            saved += plan.periodic_amount;
        }
        with_return.push(invested);
        flat.push(saved);
    }

    debug!(
        years,
        per_year = k,
        final_with_return = invested,
        final_flat = saved,
        "simulated contribution plan"
    );
    Ok(SimulationResult { with_return, flat })
}

fn validate(plan: &ContributionPlan) -> Result<(), AnalyticsError> {
    if !(1..=MAX_HORIZON_YEARS).contains(&plan.horizon_years) {
        return Err(AnalyticsError::InvalidInput(format!(
            "horizon must be between 1 and {MAX_HORIZON_YEARS} years, got {}",
            plan.horizon_years
        )));
    }
    if !(1..=MAX_CONTRIBUTIONS_PER_YEAR).contains(&plan.contributions_per_year) {
        return Err(AnalyticsError::InvalidInput(format!(
            "contributions per year must be between 1 and {MAX_CONTRIBUTIONS_PER_YEAR}, got {}",
            plan.contributions_per_year
        )));
    }
    if !(plan.initial_amount.is_finite() && plan.initial_amount >= 0.0) {
        return Err(AnalyticsError::InvalidInput(format!(
            "initial amount must be non-negative, got {}",
            plan.initial_amount
        )));
    }
    if !(plan.periodic_amount.is_finite() && plan.periodic_amount >= 0.0) {
        return Err(AnalyticsError::InvalidInput(format!(
            "periodic amount must be non-negative, got {}",
            plan.periodic_amount
        )));
    }
    if !plan.annual_rate.is_finite() {
        return Err(AnalyticsError::InvalidInput("annual rate must be finite".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(initial: f64, periodic: f64, k: u32, rate: f64, years: u32) -> ContributionPlan {
        ContributionPlan {
            initial_amount: initial,
            periodic_amount: periodic,
            contributions_per_year: k,
            horizon_years: years,
            annual_rate: rate,
        }
    }

    #[test]
    fn monthly_plan_beats_saving() {
        let out = simulate(&plan(1000.0, 100.0, 12, 0.08, 5)).unwrap();
        assert_eq!(out.with_return.len(), 6);
        assert_eq!(out.flat.len(), 6);
        assert_eq!(out.with_return[0], 1000.0);
        assert_eq!(out.final_flat(), 7000.0);
        assert!(out.final_with_return() > 7000.0);
        assert!(out.with_return.windows(2).all(|w| w[1] >= w[0]));
        assert!(out.flat.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn zero_rate_matches_flat_trajectory() {
        for k in [1, 2, 12] {
            let out = simulate(&plan(500.0, 250.0, k, 0.0, 10)).unwrap();
            assert_eq!(out.with_return, out.flat);
        }
    }

    #[test]
    fn no_contributions_compound_the_initial_amount() {
        for k in [1u32, 2, 12] {
            let out = simulate(&plan(1000.0, 0.0, k, 0.06, 15)).unwrap();
            for (year, value) in out.with_return.iter().enumerate() {
                let expected = 1000.0 * (1.0 + 0.06 / k as f64).powi((k as usize * year) as i32);
                assert!((value - expected).abs() < 1e-6, "k={k} year={year}: {value} vs {expected}");
            }
            assert!(out.flat.iter().all(|v| *v == 1000.0));
        }
    }

    #[test]
    fn negative_rate_is_not_special_cased() {
        let out = simulate(&plan(1000.0, 0.0, 1, -0.1, 2)).unwrap();
        assert!((out.with_return[1] - 900.0).abs() < 1e-9);
        assert!((out.with_return[2] - 810.0).abs() < 1e-9);
    }

    #[test]
    fn contribution_lands_before_growth() {
        // One annual contribution: (0 + 100) * 1.1 = 110.
        let out = simulate(&plan(0.0, 100.0, 1, 0.1, 1)).unwrap();
        assert!((out.with_return[1] - 110.0).abs() < 1e-9);
        assert_eq!(out.flat[1], 100.0);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let cases = [
            plan(1000.0, 100.0, 12, 0.08, 0),
            plan(1000.0, 100.0, 0, 0.08, 5),
            plan(-1.0, 100.0, 12, 0.08, 5),
            plan(1000.0, -5.0, 12, 0.08, 5),
            plan(1000.0, 100.0, 12, f64::NAN, 5),
        ];
        for p in cases {
            assert!(matches!(simulate(&p), Err(AnalyticsError::InvalidInput(_))), "{p:?}");
        }
    }

    #[test]
    fn oversized_plans_are_rejected_before_allocating() {
        let err = simulate(&plan(1000.0, 100.0, 12, 0.05, u32::MAX)).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
        assert!(simulate(&plan(1000.0, 100.0, u32::MAX, 0.05, 5)).is_err());

        let longest = simulate(&plan(1000.0, 0.0, 1, 0.0, MAX_HORIZON_YEARS)).unwrap();
        assert_eq!(longest.with_return.len(), MAX_HORIZON_YEARS as usize + 1);
    }
}
