use crate::errors::{ensure_finite, FormulaError, FormulaResult};

const WEIGHT_WORKING_CAPITAL: f64 = 1.2;
const WEIGHT_RETAINED_EARNINGS: f64 = 1.4;
const WEIGHT_EBIT: f64 = 3.3;
const WEIGHT_MARKET_VALUE: f64 = 0.6;
const WEIGHT_SALES: f64 = 1.0;

/// Above this the company is considered safe.
pub const SAFE_THRESHOLD: f64 = 3.0;
/// Below this the company is considered in financial distress.
pub const DISTRESS_THRESHOLD: f64 = 2.7;

/// Balance-sheet and income-statement inputs. All in the same currency unit.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct AltmanInputs {
    pub working_capital: f64,
    pub retained_earnings: f64,
    pub ebit: f64,
    pub market_value_of_equity: f64,
    pub sales: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZScoreZone {
    Safe,
    Grey,
    Distress,
}

impl ZScoreZone {
    pub fn classify(z_score: f64) -> Self {
        if z_score > SAFE_THRESHOLD {
            Self::Safe
        } else if z_score >= DISTRESS_THRESHOLD {
            Self::Grey
        } else {
            Self::Distress
        }
    }
}

impl std::fmt::Display for ZScoreZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Grey => write!(f, "grey area"),
            Self::Distress => write!(f, "distress"),
        }
    }
}

fn ensure_denominator(name: &str, value: f64) -> FormulaResult<f64> {
    ensure_finite(name, value)?;
    if value == 0.0 {
        return Err(FormulaError::DivisionByZero(format!("{name} is zero")));
    }
    if value < 0.0 {
        return Err(FormulaError::InvalidInput(format!("{name} must be > 0, got {value}")));
    }
    Ok(value)
}

/// Altman Z-score bankruptcy-risk model.
///
/// Z = 1.2*A + 1.4*B + 3.3*C + 0.6*D + 1.0*E
///
/// where:
///   A = working capital / total assets
///   B = retained earnings / total assets
///   C = EBIT / total assets
///   D = market value of equity / total liabilities
///   E = sales / total assets
///
/// Calibrated on publicly traded manufacturers. Pure function.
pub fn compute_z_score(inputs: &AltmanInputs) -> FormulaResult<f64> {
    ensure_finite("working_capital", inputs.working_capital)?;
    ensure_finite("retained_earnings", inputs.retained_earnings)?;
    ensure_finite("ebit", inputs.ebit)?;
    ensure_finite("market_value_of_equity", inputs.market_value_of_equity)?;
    ensure_finite("sales", inputs.sales)?;
    let total_assets = ensure_denominator("total_assets", inputs.total_assets)?;
    let total_liabilities = ensure_denominator("total_liabilities", inputs.total_liabilities)?;

    let a = inputs.working_capital / total_assets;
    let b = inputs.retained_earnings / total_assets;
    let c = inputs.ebit / total_assets;
    let d = inputs.market_value_of_equity / total_liabilities;
    let e = inputs.sales / total_assets;

    let z = WEIGHT_WORKING_CAPITAL * a
        + WEIGHT_RETAINED_EARNINGS * b
        + WEIGHT_EBIT * c
        + WEIGHT_MARKET_VALUE * d
        + WEIGHT_SALES * e;

    tracing::debug!(a, b, c, d, e, z, "altman z-score");
    Ok(z)
}
