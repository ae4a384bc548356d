//! Process-wide default assumptions.
//!
//! The [`Defaults`] record supplies fallback values for scenario fields left
//! unset: hours, billing model, and the percentage knobs. It is loaded once
//! and passed explicitly into every computation, never read as ambient
//! state. Stored as a JSON file under the user config dir; individual values
//! can be overridden through `MARGINCALC_*` environment variables.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::scenario::BillingType;

/// Errors from loading, saving, or editing the defaults file.
#[derive(Debug, thiserror::Error)]
pub enum DefaultsError {
    #[error("unknown defaults key: {0}")]
    UnknownKey(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("defaults file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fallback values applied when a scenario leaves the matching field unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Defaults {
    /// Staff payable hours per month.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payable_hours: Option<Decimal>,
    /// Client billable hours per month.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable_hours: Option<Decimal>,
    /// Billing model pre-selected for new scenarios.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_model: Option<BillingType>,
    /// Bonus percentage assumed for W-2 staff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_percent: Option<Decimal>,
    /// Employer payroll taxes percentage (e.g. FICA).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_taxes_percent: Option<Decimal>,
    /// Benefits cost as a percentage of salary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits_percent: Option<Decimal>,
    /// Overhead allocation percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overhead_percent: Option<Decimal>,
    /// Target profit margin percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_margin_percent: Option<Decimal>,
}

/// Keys accepted by [`Defaults::get`] / [`Defaults::set`], in file order.
const KEYS: &[&str] = &[
    "payableHours",
    "billableHours",
    "billingModel",
    "bonusPercent",
    "employerTaxesPercent",
    "benefitsPercent",
    "overheadPercent",
    "targetMarginPercent",
];

impl Defaults {
    /// Default on-disk location, overridable via `MARGINCALC_DEFAULTS`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("MARGINCALC_DEFAULTS") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("margincalc")
            .join("defaults.json")
    }

    /// Load from the given path, falling back to an empty record when the
    /// file does not exist. Environment overrides are applied on top.
    pub fn load_from(path: &Path) -> Result<Self, DefaultsError> {
        let mut defaults = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        } else {
            Self::default()
        };
        defaults.apply_env_overrides();
        Ok(defaults)
    }

    /// Load from the default location. Unreadable or malformed files degrade
    /// to the empty record with a warning rather than failing startup.
    pub fn load() -> Self {
        let path = Self::default_path();
        match Self::load_from(&path) {
            Ok(defaults) => defaults,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load defaults, using empty record");
                let mut defaults = Self::default();
                defaults.apply_env_overrides();
                defaults
            }
        }
    }

    /// Write the record as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), DefaultsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        for key in KEYS {
            let var = env_var_name(key);
            if let Ok(value) = std::env::var(&var) {
                if let Err(e) = self.set(key, &value) {
                    warn!(var, value, error = %e, "ignoring invalid defaults override");
                }
            }
        }
    }

    /// All keys with their current values, unset fields shown as "-".
    pub fn list(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .map(|key| {
                let value = self.get(key).unwrap_or_default();
                (*key, if value.is_empty() { "-".to_string() } else { value })
            })
            .collect()
    }

    /// Value for a key in display form, `None` for unknown keys.
    pub fn get(&self, key: &str) -> Option<String> {
        let decimal = |v: &Option<Decimal>| v.map(|d| d.to_string()).unwrap_or_default();
        let value = match key {
            "payableHours" => decimal(&self.payable_hours),
            "billableHours" => decimal(&self.billable_hours),
            "billingModel" => match self.billing_model {
                Some(BillingType::Hourly) => "Hourly".to_string(),
                Some(BillingType::FixedPrice) => "Fixed Price".to_string(),
                None => String::new(),
            },
            "bonusPercent" => decimal(&self.bonus_percent),
            "employerTaxesPercent" => decimal(&self.employer_taxes_percent),
            "benefitsPercent" => decimal(&self.benefits_percent),
            "overheadPercent" => decimal(&self.overhead_percent),
            "targetMarginPercent" => decimal(&self.target_margin_percent),
            _ => return None,
        };
        Some(value)
    }

    /// Set a key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), DefaultsError> {
        let parse = |value: &str| -> Result<Decimal, DefaultsError> {
            Decimal::from_str(value.trim()).map_err(|_| DefaultsError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            })
        };
        match key {
            "payableHours" => self.payable_hours = Some(parse(value)?),
            "billableHours" => self.billable_hours = Some(parse(value)?),
            "billingModel" => {
                self.billing_model = Some(match value.trim() {
                    "Hourly" => BillingType::Hourly,
                    "Fixed Price" => BillingType::FixedPrice,
                    _ => {
                        return Err(DefaultsError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    }
                })
            }
            "bonusPercent" => self.bonus_percent = Some(parse(value)?),
            "employerTaxesPercent" => self.employer_taxes_percent = Some(parse(value)?),
            "benefitsPercent" => self.benefits_percent = Some(parse(value)?),
            "overheadPercent" => self.overhead_percent = Some(parse(value)?),
            "targetMarginPercent" => self.target_margin_percent = Some(parse(value)?),
            _ => return Err(DefaultsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Clear a key back to unset.
    pub fn reset(&mut self, key: &str) -> Result<(), DefaultsError> {
        match key {
            "payableHours" => self.payable_hours = None,
            "billableHours" => self.billable_hours = None,
            "billingModel" => self.billing_model = None,
            "bonusPercent" => self.bonus_percent = None,
            "employerTaxesPercent" => self.employer_taxes_percent = None,
            "benefitsPercent" => self.benefits_percent = None,
            "overheadPercent" => self.overhead_percent = None,
            "targetMarginPercent" => self.target_margin_percent = None,
            _ => return Err(DefaultsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn env_var_name(key: &str) -> String {
    let mut name = String::from("MARGINCALC_");
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            name.push('_');
        }
        name.push(ch.to_ascii_uppercase());
    }
    name
}
