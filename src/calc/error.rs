//! Error types for the margin calculator.

/// Errors that can occur while computing scenario metrics.
///
/// A scenario that passed validation should never trip `InvalidScenario`;
/// that variant marks a contract violation between validator and calculator.
/// `DivisionByZero` covers the degenerate denominators a valid scenario can
/// still reach, such as a 100% target margin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    /// Scenario is structurally incomplete for computation.
    #[error("invalid scenario: {reason}")]
    InvalidScenario { reason: String },

    /// A denominator resolved to zero (or a target margin of 100%).
    #[error("division by zero: {denominator}")]
    DivisionByZero { denominator: &'static str },
}

impl CalcError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        CalcError::InvalidScenario {
            reason: reason.into(),
        }
    }
}
