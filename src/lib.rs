//! Cost, revenue, and margin modelling for staffing scenarios.
//!
//! The crate models a single staffing arrangement (W-2 employee or 1099
//! contractor) as a [`Scenario`], validates raw input records against the
//! model invariants, and derives the financial metrics a pricing decision
//! needs: burdened hourly cost, effective bill rate, monthly and annual
//! margin, and the bill rate required to hit a target margin.
//!
//! The flow is: deserialize a flat [`ScenarioDraft`], [`validate`] it into a
//! [`Scenario`], then [`compute`] against the process-wide [`Defaults`].

pub mod calc;
pub mod defaults;
pub mod scenario;
pub mod store;

pub use calc::{CalcError, Results, compute};
pub use defaults::{Defaults, DefaultsError};
pub use scenario::{Scenario, ScenarioDraft, ValidationErrors, validate};
pub use store::{MemoryStore, ScenarioStore, StoreError};

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for unit tests.

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::defaults::Defaults;
    use crate::scenario::{
        Billing, Compensation, HubzoneResidency, OverrideSet, Scenario, Workload,
    };

    /// W-2 scenario matching the canonical worked example: 150k salary,
    /// 7.65% taxes, 20% benefits, 160 hours, billed hourly at 200.
    pub fn w2_scenario() -> Scenario {
        Scenario {
            id: Uuid::from_u128(1),
            full_name: "John Doe".to_string(),
            role_title: "Senior Developer".to_string(),
            project_name: "VA Modernization".to_string(),
            tracking_link: None,
            tags: ["proposal-ready".to_string()].into(),
            scenario_group: Some("VA Modernization Q3".to_string()),
            notes: None,
            workload: Workload::HoursPerMonth(dec!(160)),
            period_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            payable_hours_override: None,
            compensation: Compensation::W2 {
                annual_salary: dec!(150000),
                tax_rate_percent: dec!(7.65),
                benefits_rate_percent: dec!(20),
                bonus_rate_percent: None,
                hubzone_resident: HubzoneResidency::Yes,
            },
            billing: Billing::Hourly {
                bill_rate: dec!(200),
            },
            billable_hours: dec!(160),
            overhead_percent: None,
            hubzone_fee_percent: None,
            overrides: OverrideSet::default(),
        }
    }

    /// 1099 scenario: 85/hour contractor billed hourly at 130.
    pub fn contractor_scenario() -> Scenario {
        Scenario {
            id: Uuid::from_u128(2),
            full_name: "Jane Roe".to_string(),
            role_title: "Data Engineer".to_string(),
            project_name: "Analytics Platform".to_string(),
            tracking_link: None,
            tags: Default::default(),
            scenario_group: None,
            notes: None,
            workload: Workload::HoursPerMonth(dec!(160)),
            period_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            payable_hours_override: None,
            compensation: Compensation::Contractor {
                hourly_rate: dec!(85),
                bonus: None,
            },
            billing: Billing::Hourly {
                bill_rate: dec!(130),
            },
            billable_hours: dec!(160),
            overhead_percent: None,
            hubzone_fee_percent: None,
            overrides: OverrideSet::default(),
        }
    }

    pub fn defaults() -> Defaults {
        Defaults {
            payable_hours: Some(dec!(160)),
            billable_hours: Some(dec!(160)),
            billing_model: None,
            bonus_percent: Some(dec!(5)),
            employer_taxes_percent: Some(dec!(7.65)),
            benefits_percent: Some(dec!(15)),
            overhead_percent: Some(dec!(20)),
            target_margin_percent: Some(dec!(25)),
        }
    }
}
