pub mod black_scholes;
pub mod lattice;

use crate::errors::{ensure_finite, FormulaError, FormulaResult};
use std::str::FromStr;

/// All option pricers implement this trait.
/// price() must be a pure function: deterministic output from inputs only.
/// Send + Sync so a single pricer can be shared across threads without locking.
pub trait OptionPricer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Present value of the option described by `market`.
    fn price(&self, market: &MarketInputs) -> FormulaResult<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Payoff of immediate exercise at `spot`.
    #[inline]
    pub fn payoff(self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionKind {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "put" => Ok(Self::Put),
            other => Err(FormulaError::InvalidInput(format!(
                "option kind must be 'call' or 'put', got '{other}'"
            ))),
        }
    }
}

/// Market description shared by every option pricer. Immutable once built;
/// the only way to get one is through [`MarketInputs::new`], which validates.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MarketInputs {
    spot_price: f64,
    strike: f64,
    risk_free_rate: f64,
    volatility: f64,
    time_to_expiry: f64,
    option_kind: OptionKind,
}

impl MarketInputs {
    pub fn new(
        spot_price: f64,
        strike: f64,
        risk_free_rate: f64,
        volatility: f64,
        time_to_expiry: f64,
        option_kind: OptionKind,
    ) -> FormulaResult<Self> {
        ensure_finite("spot_price", spot_price)?;
        ensure_finite("strike", strike)?;
        ensure_finite("risk_free_rate", risk_free_rate)?;
        ensure_finite("volatility", volatility)?;
        ensure_finite("time_to_expiry", time_to_expiry)?;

        if spot_price <= 0.0 {
            return Err(FormulaError::InvalidInput(format!("spot_price must be > 0, got {spot_price}")));
        }
        if strike <= 0.0 {
            return Err(FormulaError::InvalidInput(format!("strike must be > 0, got {strike}")));
        }
        if volatility < 0.0 {
            return Err(FormulaError::InvalidInput(format!("volatility must be >= 0, got {volatility}")));
        }
        if time_to_expiry <= 0.0 {
            return Err(FormulaError::InvalidInput(format!(
                "time_to_expiry must be > 0, got {time_to_expiry}"
            )));
        }

        Ok(Self {
            spot_price,
            strike,
            risk_free_rate,
            volatility,
            time_to_expiry,
            option_kind,
        })
    }

    #[inline]
    pub fn spot_price(&self) -> f64 {
        self.spot_price
    }

    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    #[inline]
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    #[inline]
    pub fn time_to_expiry(&self) -> f64 {
        self.time_to_expiry
    }

    #[inline]
    pub fn option_kind(&self) -> OptionKind {
        self.option_kind
    }

    /// Same market, other side of the trade. Handy for parity checks.
    pub fn with_kind(self, option_kind: OptionKind) -> Self {
        Self { option_kind, ..self }
    }
}
