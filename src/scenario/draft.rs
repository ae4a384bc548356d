//! Flat raw input record for scenarios.
//!
//! [`ScenarioDraft`] is the shape the form/API layer submits: every field
//! optional, names matching the wire contract (`fullName`, `periodEndDate`,
//! `bonusValue`, ...). Drafts support single-field partial updates, which is
//! how inline edits arrive, and can be seeded from the process-wide defaults
//! the way the settings screen seeds a new scenario.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::Defaults;
use crate::scenario::{
    Billing, BillingType, BonusKind, Compensation, ContractorBonus, HubzoneResidency, Scenario,
    StaffType, Workload, WorkloadMode,
};

/// Every field name a draft accepts, in wire form.
pub const FIELDS: &[&str] = &[
    "id",
    "fullName",
    "roleTitle",
    "projectName",
    "staffType",
    "trackingLink",
    "workloadMode",
    "hours",
    "periodStartDate",
    "periodEndDate",
    "payableHoursOverride",
    "salary",
    "taxRate",
    "benefitsRate",
    "bonusRate",
    "hourlyRate",
    "bonusType",
    "bonusValue",
    "billingType",
    "billableHours",
    "billRate",
    "fixedFee",
    "overhead",
    "hubzoneFee",
    "hubzoneResident",
    "employerTaxes",
    "benefits",
    "targetMargin",
    "tags",
    "scenarioGroup",
    "notes",
];

/// Errors from draft field manipulation.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// The field name is not part of the scenario record.
    #[error("unknown scenario field: {0}")]
    UnknownField(String),

    /// The supplied value does not deserialize into the field's type.
    #[error("invalid value for {field}: {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw scenario record as submitted by a client. Validate with
/// [`validate`](crate::scenario::validate) to obtain a [`Scenario`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_type: Option<StaffType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_mode: Option<WorkloadMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payable_hours_override: Option<Decimal>,

    // W-2 compensation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_rate: Option<Decimal>,

    // 1099 compensation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_type: Option<BonusKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_value: Option<Decimal>,

    // Client billing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_type: Option<BillingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable_hours: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_fee: Option<Decimal>,

    // Overhead and fees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overhead: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hubzone_fee: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hubzone_resident: Option<HubzoneResidency>,

    // Scenario-level overrides of the process defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_taxes: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_margin: Option<Decimal>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ScenarioDraft {
    /// A draft pre-filled from the process-wide defaults, the starting point
    /// for a new scenario.
    pub fn seeded_from(defaults: &Defaults) -> Self {
        Self {
            workload_mode: Some(WorkloadMode::HoursPerMonth),
            hours: defaults.payable_hours,
            billable_hours: defaults.billable_hours,
            billing_type: defaults.billing_model,
            bonus_rate: defaults.bonus_percent,
            tax_rate: defaults.employer_taxes_percent,
            benefits_rate: defaults.benefits_percent,
            overhead: defaults.overhead_percent,
            target_margin: defaults.target_margin_percent,
            ..Self::default()
        }
    }

    /// Apply a single-field edit. `Null` clears the field; the value must
    /// deserialize into the field's type.
    pub fn set_field(&mut self, field: &str, value: serde_json::Value) -> Result<(), DraftError> {
        if !FIELDS.contains(&field) {
            return Err(DraftError::UnknownField(field.to_string()));
        }

        let mut record = match serde_json::to_value(&*self) {
            Ok(serde_json::Value::Object(map)) => map,
            // A struct with named fields always serializes to an object.
            _ => serde_json::Map::new(),
        };
        if value.is_null() {
            record.remove(field);
        } else {
            record.insert(field.to_string(), value);
        }

        *self = serde_json::from_value(serde_json::Value::Object(record)).map_err(|source| {
            DraftError::InvalidValue {
                field: field.to_string(),
                source,
            }
        })?;
        Ok(())
    }

    /// Flatten a validated scenario back to the wire record.
    pub(crate) fn from_scenario(scenario: &Scenario) -> Self {
        let mut draft = Self {
            id: Some(scenario.id),
            full_name: Some(scenario.full_name.clone()),
            role_title: Some(scenario.role_title.clone()),
            project_name: Some(scenario.project_name.clone()),
            staff_type: Some(scenario.staff_type()),
            tracking_link: scenario.tracking_link.clone(),
            period_start_date: Some(scenario.period_start),
            period_end_date: Some(scenario.period_end),
            payable_hours_override: scenario.payable_hours_override,
            billing_type: Some(scenario.billing.billing_type()),
            billable_hours: Some(scenario.billable_hours),
            overhead: scenario.overhead_percent,
            hubzone_fee: scenario.hubzone_fee_percent,
            employer_taxes: scenario.overrides.employer_taxes_percent,
            benefits: scenario.overrides.benefits_percent,
            target_margin: scenario.overrides.target_margin_percent,
            tags: scenario.tags.iter().cloned().collect(),
            scenario_group: scenario.scenario_group.clone(),
            notes: scenario.notes.clone(),
            ..Self::default()
        };

        match scenario.workload {
            Workload::HoursPerMonth(h) => {
                draft.workload_mode = Some(WorkloadMode::HoursPerMonth);
                draft.hours = Some(h);
            }
            Workload::HoursPerYear(h) => {
                draft.workload_mode = Some(WorkloadMode::HoursPerYear);
                draft.hours = Some(h);
            }
        }

        match &scenario.compensation {
            Compensation::W2 {
                annual_salary,
                tax_rate_percent,
                benefits_rate_percent,
                bonus_rate_percent,
                hubzone_resident,
            } => {
                draft.salary = Some(*annual_salary);
                draft.tax_rate = Some(*tax_rate_percent);
                draft.benefits_rate = Some(*benefits_rate_percent);
                draft.bonus_rate = *bonus_rate_percent;
                draft.hubzone_resident = Some(*hubzone_resident);
            }
            Compensation::Contractor { hourly_rate, bonus } => {
                draft.hourly_rate = Some(*hourly_rate);
                match bonus {
                    Some(ContractorBonus::Percent(v)) => {
                        draft.bonus_type = Some(BonusKind::Percent);
                        draft.bonus_value = Some(*v);
                    }
                    Some(ContractorBonus::Fixed(v)) => {
                        draft.bonus_type = Some(BonusKind::Fixed);
                        draft.bonus_value = Some(*v);
                    }
                    None => {}
                }
            }
        }

        match scenario.billing {
            Billing::Hourly { bill_rate } => draft.bill_rate = Some(bill_rate),
            Billing::FixedPrice { fixed_fee } => draft.fixed_fee = Some(fixed_fee),
        }

        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn deserializes_wire_names() {
        let draft: ScenarioDraft = serde_json::from_value(json!({
            "fullName": "John Doe",
            "staffType": "W-2",
            "workloadMode": "Hours/Month",
            "hours": 160,
            "billingType": "Fixed Price",
            "fixedFee": 32000,
            "hubzoneResident": "TBD"
        }))
        .unwrap();

        assert_eq!(draft.full_name.as_deref(), Some("John Doe"));
        assert_eq!(draft.staff_type, Some(StaffType::W2));
        assert_eq!(draft.billing_type, Some(BillingType::FixedPrice));
        assert_eq!(draft.fixed_fee, Some(dec!(32000)));
        assert_eq!(draft.hubzone_resident, Some(HubzoneResidency::Tbd));
    }

    #[test]
    fn set_field_updates_and_clears() {
        let mut draft = ScenarioDraft::default();
        draft.set_field("salary", json!(150000)).unwrap();
        assert_eq!(draft.salary, Some(dec!(150000)));

        draft.set_field("salary", json!(null)).unwrap();
        assert_eq!(draft.salary, None);
    }

    #[test]
    fn set_field_rejects_unknown_names() {
        let mut draft = ScenarioDraft::default();
        let err = draft.set_field("salarry", json!(1)).unwrap_err();
        assert!(matches!(err, DraftError::UnknownField(_)));
    }

    #[test]
    fn set_field_rejects_mistyped_values() {
        let mut draft = ScenarioDraft::default();
        let err = draft.set_field("salary", json!("lots")).unwrap_err();
        assert!(matches!(err, DraftError::InvalidValue { .. }));
    }

    #[test]
    fn seeding_copies_defaults() {
        let defaults = Defaults {
            payable_hours: Some(dec!(160)),
            billable_hours: Some(dec!(160)),
            billing_model: Some(BillingType::Hourly),
            bonus_percent: Some(dec!(5)),
            employer_taxes_percent: Some(dec!(7.65)),
            benefits_percent: Some(dec!(15)),
            overhead_percent: Some(dec!(20)),
            target_margin_percent: Some(dec!(25)),
        };
        let draft = ScenarioDraft::seeded_from(&defaults);
        assert_eq!(draft.hours, Some(dec!(160)));
        assert_eq!(draft.billing_type, Some(BillingType::Hourly));
        assert_eq!(draft.tax_rate, Some(dec!(7.65)));
        assert_eq!(draft.target_margin, Some(dec!(25)));
    }

    #[test]
    fn scenario_round_trips_through_draft() {
        let scenario = crate::test_support::w2_scenario();
        let draft = scenario.to_draft();
        let back = crate::scenario::validate(&draft).unwrap();
        assert_eq!(back, scenario);
    }
}
