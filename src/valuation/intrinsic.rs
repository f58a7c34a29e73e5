use crate::errors::{ensure_finite, FormulaError, FormulaResult};

const NO_GROWTH_PE: f64 = 8.5;
const GROWTH_MULTIPLIER: f64 = 2.0;
pub const MARGIN_OF_SAFETY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct GrahamValuation {
    pub intrinsic_value: f64,
    pub margin_of_safety_value: f64,
    /// margin_of_safety_value / stock_price
    pub price_ratio: f64,
}

#[inline]
pub fn graham_intrinsic_value(earnings_per_share: f64, growth_rate: f64) -> FormulaResult<f64> {
    ensure_finite("earnings_per_share", earnings_per_share)?;
    ensure_finite("growth_rate", growth_rate)?;
    Ok(earnings_per_share * (NO_GROWTH_PE + GROWTH_MULTIPLIER * growth_rate))
}

/// Earnings-multiple (Graham) intrinsic value.
///
/// V = EPS * (8.5 + 2*g)
///
/// 8.5 is the P/E of a no-growth company. The margin-of-safety ratio compares half
/// of V with the current stock price: a ratio above 1.0 means the stock trades below
/// the discounted intrinsic value.
pub fn graham_valuation(
    stock_price: f64,
    earnings_per_share: f64,
    growth_rate: f64,
) -> FormulaResult<GrahamValuation> {
    ensure_finite("stock_price", stock_price)?;
    if stock_price == 0.0 {
        return Err(FormulaError::DivisionByZero("stock_price is zero".into()));
    }
    if stock_price < 0.0 {
        return Err(FormulaError::InvalidInput(format!("stock_price must be > 0, got {stock_price}")));
    }

    let intrinsic_value = graham_intrinsic_value(earnings_per_share, growth_rate)?;
    let margin_of_safety_value = intrinsic_value * MARGIN_OF_SAFETY;

    Ok(GrahamValuation {
        intrinsic_value,
        margin_of_safety_value,
        price_ratio: margin_of_safety_value / stock_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_example_company() {
        let v = graham_valuation(100.0, 5.0, 0.1).unwrap();
        assert_relative_eq!(v.intrinsic_value, 43.5, epsilon = 1e-12);
        assert_relative_eq!(v.margin_of_safety_value, 21.75, epsilon = 1e-12);
        assert_relative_eq!(v.price_ratio, 0.2175, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_growth_is_base_multiple() {
        assert_relative_eq!(graham_intrinsic_value(2.0, 0.0).unwrap(), 17.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bad_price_rejected() {
        assert!(matches!(graham_valuation(0.0, 5.0, 0.1), Err(FormulaError::DivisionByZero(_))));
        assert!(matches!(graham_valuation(-1.0, 5.0, 0.1), Err(FormulaError::InvalidInput(_))));
        assert!(matches!(graham_valuation(100.0, f64::NAN, 0.1), Err(FormulaError::InvalidInput(_))));
    }
}
