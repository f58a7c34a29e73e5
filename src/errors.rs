/// Domain-specific error types for the valuation formulas.
/// Every formula validates its inputs before computing and fails fast:
/// there is no retry and no partial result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("degenerate lattice: {0}")]
    DegenerateLattice(String),

    #[error("division by zero: {0}")]
    DivisionByZero(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type FormulaResult<T> = Result<T, FormulaError>;

/// Reject NaN and infinities up front so they never reach a formula.
#[inline]
pub fn ensure_finite(name: &str, value: f64) -> FormulaResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::InvalidInput(format!("{name} must be finite, got {value}")))
    }
}
