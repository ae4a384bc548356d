//! Scenario validation.
//!
//! Checks a raw [`ScenarioDraft`] against the model invariants and either
//! produces a [`Scenario`] or a set of field-level errors keyed by wire field
//! name. Validation is all-or-nothing: every violated invariant is reported
//! in one pass.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::scenario::{
    Billing, BillingType, BonusKind, Compensation, ContractorBonus, Scenario, ScenarioDraft,
    StaffType, Workload, WorkloadMode,
};

/// Error codes for programmatic handling of field errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldErrorCode {
    Missing,
    NotPositive,
    Negative,
    OutOfRange,
    /// Field belongs to a branch the scenario did not select.
    Conflict,
    InvalidFormat,
}

/// A single field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the offending field.
    pub field: &'static str,
    pub message: String,
    pub code: FieldErrorCode,
}

/// Non-empty collection of field errors produced by a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &'static str, code: FieldErrorCode, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
            code,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Whether any error was recorded for the given wire field name.
    pub fn contains_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// The field -> message contract shape. When a field accumulated several
    /// errors, the first one wins.
    pub fn into_map(self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        for error in self.errors {
            map.entry(error.field).or_insert(error.message);
        }
        map
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a raw draft into a [`Scenario`].
///
/// Returns every violated invariant at once; the scenario id is preserved
/// when the draft carries one and freshly generated otherwise.
pub fn validate(draft: &ScenarioDraft) -> Result<Scenario, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    require_text(&mut errors, "fullName", "Full name", &draft.full_name);
    require_text(&mut errors, "roleTitle", "Role/Title", &draft.role_title);
    require_text(&mut errors, "projectName", "Project name", &draft.project_name);

    if let Some(link) = draft.tracking_link.as_deref()
        && !link.is_empty()
        && !(link.starts_with("http://") || link.starts_with("https://"))
    {
        errors.push(
            "trackingLink",
            FieldErrorCode::InvalidFormat,
            "Tracking link must be an http(s) URL",
        );
    }

    let workload = validate_workload(draft, &mut errors);
    validate_period(draft, &mut errors);

    if let Some(hours) = draft.payable_hours_override
        && hours <= Decimal::ZERO
    {
        errors.push(
            "payableHoursOverride",
            FieldErrorCode::NotPositive,
            "Override hours must be positive",
        );
    }

    let compensation = match draft.staff_type {
        Some(StaffType::W2) => validate_w2(draft, &mut errors),
        Some(StaffType::Contractor1099) => validate_contractor(draft, &mut errors),
        None => {
            errors.push(
                "staffType",
                FieldErrorCode::Missing,
                "Staff type must be selected",
            );
            None
        }
    };

    let billing = validate_billing(draft, &mut errors);

    check_non_negative(&mut errors, "overhead", "Overhead", draft.overhead);
    check_non_negative(&mut errors, "hubzoneFee", "HUBZone fee", draft.hubzone_fee);
    check_percent(&mut errors, "employerTaxes", "Employer taxes", draft.employer_taxes);
    check_percent(&mut errors, "benefits", "Benefits", draft.benefits);
    check_percent(&mut errors, "targetMargin", "Target margin", draft.target_margin);

    let billable_hours = match draft.billable_hours {
        Some(h) if h > Decimal::ZERO => Some(h),
        Some(_) => {
            errors.push(
                "billableHours",
                FieldErrorCode::NotPositive,
                "Billable hours must be positive",
            );
            None
        }
        None => {
            errors.push(
                "billableHours",
                FieldErrorCode::Missing,
                "Billable hours are required",
            );
            None
        }
    };

    match (
        workload,
        compensation,
        billing,
        billable_hours,
        draft.period_start_date,
        draft.period_end_date,
    ) {
        (Some(workload), Some(compensation), Some(billing), Some(billable_hours), Some(start), Some(end))
            if errors.is_empty() =>
        {
            Ok(Scenario {
                id: draft.id.unwrap_or_else(Uuid::new_v4),
                full_name: draft.full_name.clone().unwrap_or_default(),
                role_title: draft.role_title.clone().unwrap_or_default(),
                project_name: draft.project_name.clone().unwrap_or_default(),
                tracking_link: draft.tracking_link.clone().filter(|l| !l.is_empty()),
                tags: draft.tags.iter().cloned().collect(),
                scenario_group: draft.scenario_group.clone(),
                notes: draft.notes.clone(),
                workload,
                period_start: start,
                period_end: end,
                payable_hours_override: draft.payable_hours_override,
                compensation,
                billing,
                billable_hours,
                overhead_percent: draft.overhead,
                hubzone_fee_percent: draft.hubzone_fee,
                overrides: crate::scenario::OverrideSet {
                    employer_taxes_percent: draft.employer_taxes,
                    benefits_percent: draft.benefits,
                    target_margin_percent: draft.target_margin,
                },
            })
        }
        _ => Err(errors),
    }
}

fn validate_workload(draft: &ScenarioDraft, errors: &mut ValidationErrors) -> Option<Workload> {
    let mode = draft.workload_mode;
    if mode.is_none() {
        errors.push(
            "workloadMode",
            FieldErrorCode::Missing,
            "Workload mode must be selected",
        );
    }
    let hours = match draft.hours {
        Some(h) if h > Decimal::ZERO => Some(h),
        Some(_) => {
            errors.push("hours", FieldErrorCode::NotPositive, "Hours must be positive");
            None
        }
        None => {
            errors.push("hours", FieldErrorCode::Missing, "Hours are required");
            None
        }
    };

    match (mode, hours) {
        (Some(WorkloadMode::HoursPerMonth), Some(h)) => Some(Workload::HoursPerMonth(h)),
        (Some(WorkloadMode::HoursPerYear), Some(h)) => Some(Workload::HoursPerYear(h)),
        _ => None,
    }
}

fn validate_period(draft: &ScenarioDraft, errors: &mut ValidationErrors) {
    if draft.period_start_date.is_none() {
        errors.push(
            "periodStartDate",
            FieldErrorCode::Missing,
            "Start date is required",
        );
    }
    match draft.period_end_date {
        None => {
            errors.push(
                "periodEndDate",
                FieldErrorCode::Missing,
                "End date is required",
            );
        }
        Some(end) => {
            if let Some(start) = draft.period_start_date
                && end < start
            {
                errors.push(
                    "periodEndDate",
                    FieldErrorCode::OutOfRange,
                    "Period end date cannot be before the start date",
                );
            }
        }
    }
}

fn validate_w2(draft: &ScenarioDraft, errors: &mut ValidationErrors) -> Option<Compensation> {
    for (field, present) in [
        ("hourlyRate", draft.hourly_rate.is_some()),
        ("bonusType", draft.bonus_type.is_some()),
        ("bonusValue", draft.bonus_value.is_some()),
    ] {
        if present {
            errors.push(
                field,
                FieldErrorCode::Conflict,
                "Not applicable to W-2 staff",
            );
        }
    }

    let salary = match draft.salary {
        Some(s) if s > Decimal::ZERO => Some(s),
        Some(_) => {
            errors.push(
                "salary",
                FieldErrorCode::NotPositive,
                "Salary is required for W-2 staff and must be positive",
            );
            None
        }
        None => {
            errors.push(
                "salary",
                FieldErrorCode::Missing,
                "Salary is required for W-2 staff and must be positive",
            );
            None
        }
    };

    let tax_rate = require_percent(errors, "taxRate", "Tax rate", draft.tax_rate);
    let benefits_rate = require_percent(errors, "benefitsRate", "Benefits rate", draft.benefits_rate);
    check_percent(errors, "bonusRate", "Bonus rate", draft.bonus_rate);

    let residency = draft.hubzone_resident;
    if residency.is_none() {
        errors.push(
            "hubzoneResident",
            FieldErrorCode::Missing,
            "HUBZone residency status is required for W-2 staff",
        );
    }

    match (salary, tax_rate, benefits_rate, residency) {
        (Some(annual_salary), Some(tax_rate_percent), Some(benefits_rate_percent), Some(hubzone_resident)) => {
            Some(Compensation::W2 {
                annual_salary,
                tax_rate_percent,
                benefits_rate_percent,
                bonus_rate_percent: draft.bonus_rate,
                hubzone_resident,
            })
        }
        _ => None,
    }
}

fn validate_contractor(draft: &ScenarioDraft, errors: &mut ValidationErrors) -> Option<Compensation> {
    for (field, present) in [
        ("salary", draft.salary.is_some()),
        ("taxRate", draft.tax_rate.is_some()),
        ("benefitsRate", draft.benefits_rate.is_some()),
        ("bonusRate", draft.bonus_rate.is_some()),
        ("hubzoneResident", draft.hubzone_resident.is_some()),
    ] {
        if present {
            errors.push(
                field,
                FieldErrorCode::Conflict,
                "Not applicable to 1099 staff",
            );
        }
    }

    let hourly_rate = match draft.hourly_rate {
        Some(r) if r > Decimal::ZERO => Some(r),
        Some(_) => {
            errors.push(
                "hourlyRate",
                FieldErrorCode::NotPositive,
                "Hourly rate is required for 1099 staff and must be positive",
            );
            None
        }
        None => {
            errors.push(
                "hourlyRate",
                FieldErrorCode::Missing,
                "Hourly rate is required for 1099 staff and must be positive",
            );
            None
        }
    };

    // Bonus type and value are all-or-nothing.
    let bonus = match (draft.bonus_type, draft.bonus_value) {
        (None, None) => None,
        (Some(kind), Some(value)) => {
            if value <= Decimal::ZERO {
                errors.push(
                    "bonusValue",
                    FieldErrorCode::NotPositive,
                    "Bonus value must be positive",
                );
                None
            } else {
                Some(match kind {
                    BonusKind::Percent => ContractorBonus::Percent(value),
                    BonusKind::Fixed => ContractorBonus::Fixed(value),
                })
            }
        }
        (Some(_), None) => {
            errors.push(
                "bonusValue",
                FieldErrorCode::Missing,
                "Bonus value is required if a bonus type is selected",
            );
            None
        }
        (None, Some(_)) => {
            errors.push(
                "bonusType",
                FieldErrorCode::Missing,
                "Bonus type must be selected if a bonus value is entered",
            );
            None
        }
    };

    hourly_rate.map(|hourly_rate| Compensation::Contractor { hourly_rate, bonus })
}

fn validate_billing(draft: &ScenarioDraft, errors: &mut ValidationErrors) -> Option<Billing> {
    match draft.billing_type {
        None => {
            errors.push(
                "billingType",
                FieldErrorCode::Missing,
                "Billing type must be selected",
            );
            None
        }
        Some(BillingType::Hourly) => {
            if draft.fixed_fee.is_some() {
                errors.push(
                    "fixedFee",
                    FieldErrorCode::Conflict,
                    "Not applicable to hourly billing",
                );
            }
            match draft.bill_rate {
                Some(r) if r > Decimal::ZERO => Some(Billing::Hourly { bill_rate: r }),
                Some(_) => {
                    errors.push(
                        "billRate",
                        FieldErrorCode::NotPositive,
                        "Bill rate is required for hourly billing and must be positive",
                    );
                    None
                }
                None => {
                    errors.push(
                        "billRate",
                        FieldErrorCode::Missing,
                        "Bill rate is required for hourly billing and must be positive",
                    );
                    None
                }
            }
        }
        Some(BillingType::FixedPrice) => {
            if draft.bill_rate.is_some() {
                errors.push(
                    "billRate",
                    FieldErrorCode::Conflict,
                    "Not applicable to fixed price billing",
                );
            }
            match draft.fixed_fee {
                Some(f) if f > Decimal::ZERO => Some(Billing::FixedPrice { fixed_fee: f }),
                Some(_) => {
                    errors.push(
                        "fixedFee",
                        FieldErrorCode::NotPositive,
                        "Fixed fee is required for fixed price billing and must be positive",
                    );
                    None
                }
                None => {
                    errors.push(
                        "fixedFee",
                        FieldErrorCode::Missing,
                        "Fixed fee is required for fixed price billing and must be positive",
                    );
                    None
                }
            }
        }
    }
}

fn require_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: &Option<String>,
) {
    if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
        errors.push(field, FieldErrorCode::Missing, format!("{label} is required"));
    }
}

/// Percent field that must be present, in 0..=100.
fn require_percent(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: Option<Decimal>,
) -> Option<Decimal> {
    match value {
        None => {
            errors.push(field, FieldErrorCode::Missing, format!("{label} is required"));
            None
        }
        Some(v) => {
            check_percent(errors, field, label, Some(v));
            Some(v)
        }
    }
}

/// Optional percent field, in 0..=100 when present.
fn check_percent(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: Option<Decimal>,
) {
    if let Some(v) = value {
        if v < Decimal::ZERO {
            errors.push(
                field,
                FieldErrorCode::Negative,
                format!("{label} cannot be negative"),
            );
        } else if v > Decimal::from(100) {
            errors.push(
                field,
                FieldErrorCode::OutOfRange,
                format!("{label} cannot exceed 100"),
            );
        }
    }
}

fn check_non_negative(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: Option<Decimal>,
) {
    if let Some(v) = value
        && v < Decimal::ZERO
    {
        errors.push(
            field,
            FieldErrorCode::Negative,
            format!("{label} cannot be negative"),
        );
    }
}
