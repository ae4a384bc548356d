//! Scenario domain model.
//!
//! A [`Scenario`] is a single staffing arrangement: one person, one project,
//! one billing agreement. The classification axes (staff type, billing type,
//! contractor bonus) are tagged unions so that a constructed scenario cannot
//! carry fields from the wrong branch; the flat, all-optional wire shape
//! lives in [`ScenarioDraft`] and only becomes a `Scenario` through
//! [`validate`].

mod draft;
mod validate;

pub use draft::{DraftError, FIELDS, ScenarioDraft};
pub use validate::{FieldError, FieldErrorCode, ValidationErrors, validate};

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Employment classification under U.S. tax treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffType {
    #[serde(rename = "W-2")]
    W2,
    #[serde(rename = "1099")]
    Contractor1099,
}

/// Wire discriminant for [`Workload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkloadMode {
    #[serde(rename = "Hours/Month")]
    HoursPerMonth,
    #[serde(rename = "Hours/Year")]
    HoursPerYear,
}

/// Wire discriminant for [`Billing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingType {
    Hourly,
    #[serde(rename = "Fixed Price")]
    FixedPrice,
}

/// Wire discriminant for [`ContractorBonus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusKind {
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "$")]
    Fixed,
}

/// How the scenario's working hours are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Workload {
    #[serde(rename = "Hours/Month")]
    HoursPerMonth(Decimal),
    #[serde(rename = "Hours/Year")]
    HoursPerYear(Decimal),
}

impl Workload {
    pub fn mode(&self) -> WorkloadMode {
        match self {
            Workload::HoursPerMonth(_) => WorkloadMode::HoursPerMonth,
            Workload::HoursPerYear(_) => WorkloadMode::HoursPerYear,
        }
    }

    /// Hours per month implied by the workload, before any override.
    pub fn hours_per_month(&self) -> Decimal {
        match *self {
            Workload::HoursPerMonth(h) => h,
            Workload::HoursPerYear(h) => h / Decimal::from(12),
        }
    }
}

/// HUBZone residency status for W-2 staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HubzoneResidency {
    Yes,
    No,
    #[serde(rename = "TBD")]
    Tbd,
}

/// Bonus arrangement for a 1099 contractor. Type and value travel together,
/// so a half-specified bonus is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContractorBonus {
    /// Percent of total compensation.
    #[serde(rename = "%")]
    Percent(Decimal),
    /// Fixed dollar amount over the scenario period.
    #[serde(rename = "$")]
    Fixed(Decimal),
}

/// Compensation branch, one per staff type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Compensation {
    /// W-2 employee: salary plus employer-side burden rates.
    W2 {
        annual_salary: Decimal,
        /// Employer payroll taxes, percent of salary.
        tax_rate_percent: Decimal,
        /// Employer benefits cost, percent of salary.
        benefits_rate_percent: Decimal,
        /// Expected bonus, percent of salary. Falls back to the defaults
        /// record when absent.
        bonus_rate_percent: Option<Decimal>,
        hubzone_resident: HubzoneResidency,
    },
    /// 1099 contractor: hourly rate, optionally with a bonus.
    Contractor {
        hourly_rate: Decimal,
        bonus: Option<ContractorBonus>,
    },
}

impl Compensation {
    pub fn staff_type(&self) -> StaffType {
        match self {
            Compensation::W2 { .. } => StaffType::W2,
            Compensation::Contractor { .. } => StaffType::Contractor1099,
        }
    }
}

/// Client billing branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Billing {
    /// Hourly rate billed to the client.
    Hourly { bill_rate: Decimal },
    /// Fixed monthly fee regardless of hours delivered.
    FixedPrice { fixed_fee: Decimal },
}

impl Billing {
    pub fn billing_type(&self) -> BillingType {
        match self {
            Billing::Hourly { .. } => BillingType::Hourly,
            Billing::FixedPrice { .. } => BillingType::FixedPrice,
        }
    }
}

impl ContractorBonus {
    pub fn kind(&self) -> BonusKind {
        match self {
            ContractorBonus::Percent(_) => BonusKind::Percent,
            ContractorBonus::Fixed(_) => BonusKind::Fixed,
        }
    }

    pub fn value(&self) -> Decimal {
        match *self {
            ContractorBonus::Percent(v) | ContractorBonus::Fixed(v) => v,
        }
    }
}

/// Scenario-level overrides of the process-wide defaults. Any field left
/// unset falls through to the corresponding [`Defaults`](crate::Defaults)
/// value at computation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideSet {
    pub employer_taxes_percent: Option<Decimal>,
    pub benefits_percent: Option<Decimal>,
    pub target_margin_percent: Option<Decimal>,
}

/// A validated staffing scenario. Construct via [`validate`]; every instance
/// satisfies the model invariants (matching branches, ordered period dates,
/// positive hours and money, bounded percentages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: Uuid,
    pub full_name: String,
    pub role_title: String,
    pub project_name: String,
    /// Optional external tracking link (project board, proposal doc).
    pub tracking_link: Option<String>,
    pub tags: BTreeSet<String>,
    pub scenario_group: Option<String>,
    pub notes: Option<String>,

    pub workload: Workload,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Overrides the hours implied by the workload when present.
    pub payable_hours_override: Option<Decimal>,

    pub compensation: Compensation,

    pub billing: Billing,
    /// Hours billable to the client per month.
    pub billable_hours: Decimal,

    /// General overhead allocation, percent of unburdened cost.
    pub overhead_percent: Option<Decimal>,
    /// HUBZone fee, percent of the effective bill rate.
    pub hubzone_fee_percent: Option<Decimal>,

    pub overrides: OverrideSet,
}

impl Scenario {
    pub fn staff_type(&self) -> StaffType {
        self.compensation.staff_type()
    }

    /// Payable hours per month: the explicit override when set, otherwise
    /// derived from the workload.
    pub fn payable_hours_per_month(&self) -> Decimal {
        self.payable_hours_override
            .unwrap_or_else(|| self.workload.hours_per_month())
    }

    /// Flatten back to the wire-shaped draft record. This is the persisted /
    /// transmitted contract: a flat record of named fields.
    pub fn to_draft(&self) -> ScenarioDraft {
        ScenarioDraft::from_scenario(self)
    }
}
