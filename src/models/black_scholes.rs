use crate::errors::{FormulaError, FormulaResult};
use crate::models::{MarketInputs, OptionKind, OptionPricer};
use statrs::distribution::{ContinuousCDF, Normal};

/// Black-Scholes closed form for European options on a non-dividend-paying asset.
///
/// d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma * sqrt(T))
/// d2 = d1 - sigma * sqrt(T)
///
/// call = S*Phi(d1) - K*e^{-rT}*Phi(d2)
/// put  = K*e^{-rT}*Phi(-d2) - S*Phi(-d1)
pub struct ClosedFormEuropeanPricer {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl ClosedFormEuropeanPricer {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }
}

impl Default for ClosedFormEuropeanPricer {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionPricer for ClosedFormEuropeanPricer {
    #[inline]
    fn name(&self) -> &'static str {
        "Black-Scholes"
    }

    fn price(&self, market: &MarketInputs) -> FormulaResult<f64> {
        let s = market.spot_price();
        let k = market.strike();
        let r = market.risk_free_rate();
        let sigma = market.volatility();
        let t = market.time_to_expiry();

        // Both appear in the d1 denominator.
        if sigma <= 0.0 {
            return Err(FormulaError::InvalidInput(format!(
                "volatility must be > 0 for the closed form, got {sigma}"
            )));
        }
        if t <= 0.0 {
            return Err(FormulaError::InvalidInput(format!("time_to_expiry must be > 0, got {t}")));
        }

        let sigma_sqrt_t = sigma * t.sqrt();
        let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
        let d2 = d1 - sigma_sqrt_t;
        let discounted_strike = k * (-r * t).exp();

        let price = match market.option_kind() {
            OptionKind::Call => s * self.normal.cdf(d1) - discounted_strike * self.normal.cdf(d2),
            OptionKind::Put => discounted_strike * self.normal.cdf(-d2) - s * self.normal.cdf(-d1),
        };

        tracing::debug!(d1, d2, price, kind = %market.option_kind(), "black-scholes price");
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn market(kind: OptionKind) -> MarketInputs {
        MarketInputs::new(100.0, 100.0, 0.05, 0.2, 1.0, kind).unwrap()
    }

    #[test]
    fn test_textbook_atm_values() {
        let pricer = ClosedFormEuropeanPricer::new();
        let call = pricer.price(&market(OptionKind::Call)).unwrap();
        let put = pricer.price(&market(OptionKind::Put)).unwrap();
        assert_relative_eq!(call, 10.450_583_572_185_565, epsilon = 1e-6);
        assert_relative_eq!(put, 5.573_526_022_256_971, epsilon = 1e-6);
    }

    #[test]
    fn test_otm_half_year_call() {
        let pricer = ClosedFormEuropeanPricer::new();
        let m = MarketInputs::new(100.0, 110.0, 0.05, 0.2, 0.5, OptionKind::Call).unwrap();
        let call = pricer.price(&m).unwrap();
        assert_relative_eq!(call, 2.906_471_321_592_413, epsilon = 1e-6);
    }

    #[test]
    fn test_put_call_parity() {
        let pricer = ClosedFormEuropeanPricer::new();
        let m = MarketInputs::new(95.0, 105.0, 0.03, 0.35, 0.75, OptionKind::Call).unwrap();
        let call = pricer.price(&m).unwrap();
        let put = pricer.price(&m.with_kind(OptionKind::Put)).unwrap();
        let forward_gap = 95.0 - 105.0 * (-0.03_f64 * 0.75).exp();
        assert_relative_eq!(call - put, forward_gap, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_vol_rejected() {
        let pricer = ClosedFormEuropeanPricer::new();
        let m = MarketInputs::new(100.0, 100.0, 0.05, 0.0, 1.0, OptionKind::Call).unwrap();
        let err = pricer.price(&m).unwrap_err();
        assert!(matches!(err, FormulaError::InvalidInput(_)), "got {err:?}");
    }
}
