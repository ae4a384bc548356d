//! Margin calculator.
//!
//! [`compute`] is the one pure transform in the crate: a validated
//! [`Scenario`] plus the process-wide [`Defaults`] in, a [`Results`] record
//! out. No I/O, no shared state, deterministic, so it is safe to call
//! concurrently for distinct scenarios and trivially idempotent.
//!
//! All arithmetic is exact decimal; rounding happens only in the
//! [`Results::rounded`] display view.

mod error;

pub use error::CalcError;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::defaults::Defaults;
use crate::scenario::{Billing, Compensation, ContractorBonus, Scenario};

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Derived financial metrics for a scenario.
///
/// Money fields are dollars, percent fields are 0-100. Values carry full
/// precision; use [`Results::rounded`] for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    /// Hours the staff member is paid for each month.
    pub payable_hours_per_month: Decimal,
    /// Hourly cost before any burden or overhead.
    pub unburdened_hourly_cost: Decimal,
    /// Employer-side burden (taxes, benefits, bonus) per payable hour.
    pub burden_dollars_per_hour: Decimal,
    /// General overhead allocation per payable hour.
    pub overhead_per_hour: Decimal,
    /// Fully loaded hourly cost, excluding the HUBZone fee.
    pub burdened_hourly_cost: Decimal,
    /// Hourly rate effectively charged to the client.
    pub effective_bill_rate: Decimal,
    /// HUBZone fee per billable hour, as a share of the bill rate.
    pub hubzone_fee_per_hour: Decimal,
    pub profit_per_hour: Decimal,
    pub profit_per_hour_with_hubzone: Decimal,
    pub monthly_revenue: Decimal,
    pub monthly_margin: Decimal,
    pub annual_revenue: Decimal,
    pub annual_margin: Decimal,
    pub annual_margin_percent: Decimal,
    /// Bill rate needed to hit the resolved target margin.
    pub required_client_rate_for_target_margin: Decimal,
}

impl Results {
    /// Display view: money and hours at two decimal places, percents at one,
    /// midpoints away from zero.
    pub fn rounded(&self) -> Results {
        let money = |v: Decimal| v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Results {
            payable_hours_per_month: money(self.payable_hours_per_month),
            unburdened_hourly_cost: money(self.unburdened_hourly_cost),
            burden_dollars_per_hour: money(self.burden_dollars_per_hour),
            overhead_per_hour: money(self.overhead_per_hour),
            burdened_hourly_cost: money(self.burdened_hourly_cost),
            effective_bill_rate: money(self.effective_bill_rate),
            hubzone_fee_per_hour: money(self.hubzone_fee_per_hour),
            profit_per_hour: money(self.profit_per_hour),
            profit_per_hour_with_hubzone: money(self.profit_per_hour_with_hubzone),
            monthly_revenue: money(self.monthly_revenue),
            monthly_margin: money(self.monthly_margin),
            annual_revenue: money(self.annual_revenue),
            annual_margin: money(self.annual_margin),
            annual_margin_percent: self
                .annual_margin_percent
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
            required_client_rate_for_target_margin: money(
                self.required_client_rate_for_target_margin,
            ),
        }
    }
}

/// Compute the derived metrics for a validated scenario.
///
/// Resolution order for percent knobs: scenario-level value, then the
/// defaults record, then zero. Annual figures are monthly figures times
/// twelve regardless of the scenario period length.
pub fn compute(scenario: &Scenario, defaults: &Defaults) -> Result<Results, CalcError> {
    let payable_hours = scenario.payable_hours_per_month();
    if payable_hours.is_zero() {
        return Err(CalcError::DivisionByZero {
            denominator: "payableHoursPerMonth",
        });
    }
    if payable_hours.is_sign_negative() {
        return Err(CalcError::invalid("negative payable hours"));
    }

    let billable_hours = scenario.billable_hours;
    if billable_hours.is_zero() {
        return Err(CalcError::DivisionByZero {
            denominator: "billableHours",
        });
    }
    if billable_hours.is_sign_negative() {
        return Err(CalcError::invalid("negative billable hours"));
    }

    let unburdened_hourly_cost = match &scenario.compensation {
        Compensation::W2 { annual_salary, .. } => {
            *annual_salary / (payable_hours * MONTHS_PER_YEAR)
        }
        Compensation::Contractor { hourly_rate, .. } => *hourly_rate,
    };

    let burden_dollars_per_hour = match &scenario.compensation {
        Compensation::W2 {
            tax_rate_percent,
            benefits_rate_percent,
            bonus_rate_percent,
            ..
        } => {
            // W-2 bonus falls back to the process-wide default bonus rate.
            let bonus = bonus_rate_percent
                .or(defaults.bonus_percent)
                .unwrap_or(Decimal::ZERO);
            unburdened_hourly_cost * (*tax_rate_percent + *benefits_rate_percent + bonus) / HUNDRED
        }
        Compensation::Contractor { hourly_rate, bonus } => match bonus {
            Some(ContractorBonus::Percent(p)) => *hourly_rate * *p / HUNDRED,
            // Fixed bonuses amortize over the annual billable hours.
            Some(ContractorBonus::Fixed(amount)) => {
                *amount / (billable_hours * MONTHS_PER_YEAR)
            }
            None => Decimal::ZERO,
        },
    };

    let overhead_percent = scenario
        .overhead_percent
        .or(defaults.overhead_percent)
        .unwrap_or(Decimal::ZERO);
    let overhead_per_hour = unburdened_hourly_cost * overhead_percent / HUNDRED;

    let burdened_hourly_cost = unburdened_hourly_cost + burden_dollars_per_hour + overhead_per_hour;

    let effective_bill_rate = match scenario.billing {
        Billing::Hourly { bill_rate } => bill_rate,
        Billing::FixedPrice { fixed_fee } => fixed_fee / billable_hours,
    };

    let hubzone_percent = scenario.hubzone_fee_percent.unwrap_or(Decimal::ZERO);
    let hubzone_fee_per_hour = effective_bill_rate * hubzone_percent / HUNDRED;

    let profit_per_hour = effective_bill_rate - burdened_hourly_cost;
    let profit_per_hour_with_hubzone = profit_per_hour - hubzone_fee_per_hour;

    let monthly_revenue = effective_bill_rate * billable_hours;
    let monthly_margin = monthly_revenue - burdened_hourly_cost * payable_hours;
    let annual_revenue = monthly_revenue * MONTHS_PER_YEAR;
    let annual_margin = monthly_margin * MONTHS_PER_YEAR;

    if annual_revenue.is_zero() {
        return Err(CalcError::DivisionByZero {
            denominator: "annualRevenue",
        });
    }
    let annual_margin_percent = annual_margin / annual_revenue * HUNDRED;

    let target_margin_percent = scenario
        .overrides
        .target_margin_percent
        .or(defaults.target_margin_percent)
        .unwrap_or(Decimal::ZERO);
    if target_margin_percent >= HUNDRED {
        return Err(CalcError::DivisionByZero {
            denominator: "targetMarginPercent",
        });
    }
    let required_client_rate_for_target_margin =
        burdened_hourly_cost / (Decimal::ONE - target_margin_percent / HUNDRED);

    Ok(Results {
        payable_hours_per_month: payable_hours,
        unburdened_hourly_cost,
        burden_dollars_per_hour,
        overhead_per_hour,
        burdened_hourly_cost,
        effective_bill_rate,
        hubzone_fee_per_hour,
        profit_per_hour,
        profit_per_hour_with_hubzone,
        monthly_revenue,
        monthly_margin,
        annual_revenue,
        annual_margin,
        annual_margin_percent,
        required_client_rate_for_target_margin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Workload;
    use crate::test_support::{contractor_scenario, w2_scenario};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn w2_worked_example() {
        // 150000 salary, 7.65 tax, 20 benefits, 160 payable hours/month.
        let scenario = w2_scenario();
        let results = compute(&scenario, &Defaults::default()).unwrap();

        assert_eq!(results.payable_hours_per_month, dec!(160));
        assert_eq!(results.unburdened_hourly_cost, dec!(78.125));
        assert_eq!(results.burden_dollars_per_hour, dec!(21.6015625));
        assert_eq!(results.rounded().unburdened_hourly_cost, dec!(78.13));
        assert_eq!(results.rounded().burden_dollars_per_hour, dec!(21.60));
    }

    #[test]
    fn w2_salary_round_trips() {
        let scenario = w2_scenario();
        let results = compute(&scenario, &Defaults::default()).unwrap();
        assert_eq!(
            results.unburdened_hourly_cost * results.payable_hours_per_month * dec!(12),
            dec!(150000)
        );
    }

    #[test]
    fn hourly_revenue() {
        // billRate=200, billableHours=160 => monthlyRevenue=32000.
        let scenario = w2_scenario();
        let results = compute(&scenario, &Defaults::default()).unwrap();
        assert_eq!(results.monthly_revenue, dec!(32000));
        assert_eq!(results.annual_revenue, dec!(384000));
    }

    #[test]
    fn fixed_price_effective_rate() {
        let mut scenario = w2_scenario();
        scenario.billing = Billing::FixedPrice {
            fixed_fee: dec!(32000),
        };
        let results = compute(&scenario, &Defaults::default()).unwrap();
        assert_eq!(results.effective_bill_rate, dec!(200));
        assert_eq!(results.monthly_revenue, dec!(32000));
    }

    #[test]
    fn yearly_workload_divides_by_twelve() {
        let mut scenario = w2_scenario();
        scenario.workload = Workload::HoursPerYear(dec!(1920));
        let results = compute(&scenario, &Defaults::default()).unwrap();
        assert_eq!(results.payable_hours_per_month, dec!(160));
        assert_eq!(results.unburdened_hourly_cost, dec!(78.125));
    }

    #[test]
    fn hubzone_fee_never_increases_profit() {
        for fee in [dec!(0), dec!(1.5), dec!(3), dec!(10)] {
            let mut scenario = w2_scenario();
            scenario.hubzone_fee_percent = Some(fee);
            let results = compute(&scenario, &Defaults::default()).unwrap();
            assert!(results.profit_per_hour_with_hubzone <= results.profit_per_hour);
        }
    }

    #[test]
    fn hubzone_fee_is_share_of_bill_rate() {
        let mut scenario = w2_scenario();
        scenario.hubzone_fee_percent = Some(dec!(3));
        let results = compute(&scenario, &Defaults::default()).unwrap();
        assert_eq!(results.hubzone_fee_per_hour, dec!(6));
        assert_eq!(
            results.profit_per_hour - results.profit_per_hour_with_hubzone,
            dec!(6)
        );
    }

    #[test]
    fn required_rate_increases_with_target_margin() {
        let mut previous = Decimal::ZERO;
        for target in [dec!(0), dec!(10), dec!(25), dec!(50), dec!(90)] {
            let mut scenario = w2_scenario();
            scenario.overrides.target_margin_percent = Some(target);
            let results = compute(&scenario, &Defaults::default()).unwrap();
            assert!(results.required_client_rate_for_target_margin > previous);
            previous = results.required_client_rate_for_target_margin;
        }
    }

    #[test]
    fn required_rate_at_zero_target_is_burdened_cost() {
        let scenario = w2_scenario();
        let results = compute(&scenario, &Defaults::default()).unwrap();
        assert_eq!(
            results.required_client_rate_for_target_margin,
            results.burdened_hourly_cost
        );
    }

    #[test]
    fn full_target_margin_is_division_by_zero() {
        let mut scenario = w2_scenario();
        scenario.overrides.target_margin_percent = Some(dec!(100));
        let err = compute(&scenario, &Defaults::default()).unwrap_err();
        assert_eq!(
            err,
            CalcError::DivisionByZero {
                denominator: "targetMarginPercent"
            }
        );
    }

    #[test]
    fn zero_payable_hours_is_division_by_zero() {
        let mut scenario = w2_scenario();
        scenario.payable_hours_override = Some(dec!(0));
        let err = compute(&scenario, &Defaults::default()).unwrap_err();
        assert_eq!(
            err,
            CalcError::DivisionByZero {
                denominator: "payableHoursPerMonth"
            }
        );
    }

    #[test]
    fn zero_billable_hours_is_division_by_zero() {
        let mut scenario = w2_scenario();
        scenario.billable_hours = dec!(0);
        let err = compute(&scenario, &Defaults::default()).unwrap_err();
        assert_eq!(
            err,
            CalcError::DivisionByZero {
                denominator: "billableHours"
            }
        );
    }

    #[test]
    fn contractor_percent_bonus() {
        let mut scenario = contractor_scenario();
        if let Compensation::Contractor { bonus, .. } = &mut scenario.compensation {
            *bonus = Some(ContractorBonus::Percent(dec!(10)));
        }
        let results = compute(&scenario, &Defaults::default()).unwrap();
        assert_eq!(results.unburdened_hourly_cost, dec!(85));
        assert_eq!(results.burden_dollars_per_hour, dec!(8.5));
    }

    #[test]
    fn contractor_fixed_bonus_amortizes_over_annual_billable_hours() {
        let mut scenario = contractor_scenario();
        if let Compensation::Contractor { bonus, .. } = &mut scenario.compensation {
            *bonus = Some(ContractorBonus::Fixed(dec!(12000)));
        }
        // 12000 over 160 * 12 billable hours.
        let results = compute(&scenario, &Defaults::default()).unwrap();
        assert_eq!(results.burden_dollars_per_hour, dec!(6.25));
    }

    #[test]
    fn contractor_without_bonus_has_no_burden() {
        let results = compute(&contractor_scenario(), &Defaults::default()).unwrap();
        assert_eq!(results.burden_dollars_per_hour, dec!(0));
        assert_eq!(results.burdened_hourly_cost, dec!(85));
    }

    #[test]
    fn overhead_resolves_scenario_then_defaults_then_zero() {
        let scenario = w2_scenario();
        let no_defaults = compute(&scenario, &Defaults::default()).unwrap();
        assert_eq!(no_defaults.overhead_per_hour, dec!(0));

        let defaults = Defaults {
            overhead_percent: Some(dec!(16)),
            ..Defaults::default()
        };
        let from_defaults = compute(&scenario, &defaults).unwrap();
        assert_eq!(from_defaults.overhead_per_hour, dec!(12.50));

        let mut with_own = scenario.clone();
        with_own.overhead_percent = Some(dec!(8));
        let own_wins = compute(&with_own, &defaults).unwrap();
        assert_eq!(own_wins.overhead_per_hour, dec!(6.25));
    }

    #[test]
    fn w2_bonus_falls_back_to_default_bonus_rate() {
        let scenario = w2_scenario();
        let defaults = Defaults {
            bonus_percent: Some(dec!(10)),
            ..Defaults::default()
        };
        let results = compute(&scenario, &defaults).unwrap();
        // 78.125 * (7.65 + 20 + 10) / 100
        assert_eq!(results.burden_dollars_per_hour, dec!(29.4140625));
    }

    #[test]
    fn margins_tie_out() {
        let mut scenario = w2_scenario();
        scenario.overhead_percent = Some(dec!(15));
        let results = compute(&scenario, &Defaults::default()).unwrap();

        let expected_burdened = dec!(78.125) + dec!(21.6015625) + dec!(11.71875);
        assert_eq!(results.burdened_hourly_cost, expected_burdened);
        assert_eq!(
            results.monthly_margin,
            dec!(32000) - expected_burdened * dec!(160)
        );
        assert_eq!(results.annual_margin, results.monthly_margin * dec!(12));
        assert_eq!(
            results.annual_margin_percent,
            results.annual_margin / results.annual_revenue * dec!(100)
        );
    }

    #[test]
    fn compute_is_idempotent() {
        let scenario = w2_scenario();
        let defaults = crate::test_support::defaults();
        let first = compute(&scenario, &defaults).unwrap();
        let second = compute(&scenario, &defaults).unwrap();
        assert_eq!(first, second);
    }
}
