use crate::errors::{ensure_finite, FormulaError, FormulaResult};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DcfBreakdown {
    /// Present value of each forecast cash flow, in input order.
    pub present_values: Vec<f64>,
    pub terminal_value: f64,
    pub terminal_present_value: f64,
    pub intrinsic_value: f64,
}

/// Discounted-cash-flow valuation with a growth-perpetuity terminal value.
///
/// PV = sum_{i=0}^{n-1} CF_i / (1+r)^i  +  TV / (1+r)^n
/// TV = CF_{n-1} * (1+g) / (r - g)
///
/// The first cash flow is taken as received today (undiscounted).
pub fn dcf_valuation(
    free_cash_flows: &[f64],
    discount_rate: f64,
    terminal_growth_rate: f64,
) -> FormulaResult<DcfBreakdown> {
    ensure_finite("discount_rate", discount_rate)?;
    ensure_finite("terminal_growth_rate", terminal_growth_rate)?;
    let Some(&last) = free_cash_flows.last() else {
        return Err(FormulaError::InvalidInput("at least one free cash flow is required".into()));
    };
    for (i, &cf) in free_cash_flows.iter().enumerate() {
        ensure_finite(&format!("free_cash_flows[{i}]"), cf)?;
    }
    if discount_rate <= -1.0 {
        return Err(FormulaError::InvalidInput(format!(
            "discount_rate must be > -1, got {discount_rate}"
        )));
    }
    // r == g divides by zero; r < g flips the sign of the perpetuity.
    if discount_rate <= terminal_growth_rate {
        return Err(FormulaError::DivisionByZero(format!(
            "discount_rate ({discount_rate}) must exceed terminal_growth_rate ({terminal_growth_rate})"
        )));
    }

    let growth = 1.0 + discount_rate;
    let present_values: Vec<f64> = free_cash_flows
        .iter()
        .enumerate()
        .map(|(i, cf)| cf / growth.powi(i as i32))
        .collect();

    let terminal_value = last * (1.0 + terminal_growth_rate) / (discount_rate - terminal_growth_rate);
    let terminal_present_value = terminal_value / growth.powi(free_cash_flows.len() as i32);
    let intrinsic_value = present_values.iter().sum::<f64>() + terminal_present_value;

    tracing::debug!(terminal_value, terminal_present_value, intrinsic_value, "dcf valuation");

    Ok(DcfBreakdown {
        present_values,
        terminal_value,
        terminal_present_value,
        intrinsic_value,
    })
}

#[inline]
pub fn dcf_intrinsic_value(
    free_cash_flows: &[f64],
    discount_rate: f64,
    terminal_growth_rate: f64,
) -> FormulaResult<f64> {
    dcf_valuation(free_cash_flows, discount_rate, terminal_growth_rate).map(|b| b.intrinsic_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_five_year_forecast() {
        let b = dcf_valuation(&[100.0, 200.0, 300.0, 400.0, 500.0], 0.1, 0.02).unwrap();
        assert_relative_eq!(b.present_values[0], 100.0, epsilon = 1e-12);
        assert_relative_eq!(b.terminal_value, 6375.0, epsilon = 1e-9);
        assert_relative_eq!(b.intrinsic_value, 5130.158_148_660_981, epsilon = 1e-8);
    }

    #[test]
    fn test_single_cash_flow() {
        // 100 today, TV = 100 * 1.0 / 0.1 = 1000, discounted one year
        let v = dcf_intrinsic_value(&[100.0], 0.1, 0.0).unwrap();
        assert_relative_eq!(v, 100.0 + 1000.0 / 1.1, epsilon = 1e-9);
    }

    #[test]
    fn test_rate_not_above_growth_rejected() {
        let flows = [100.0, 200.0];
        assert!(matches!(dcf_intrinsic_value(&flows, 0.05, 0.05), Err(FormulaError::DivisionByZero(_))));
        assert!(matches!(dcf_intrinsic_value(&flows, 0.02, 0.05), Err(FormulaError::DivisionByZero(_))));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(dcf_intrinsic_value(&[], 0.1, 0.02), Err(FormulaError::InvalidInput(_))));
        assert!(matches!(dcf_intrinsic_value(&[100.0], -1.0, -2.0), Err(FormulaError::InvalidInput(_))));
        assert!(matches!(dcf_intrinsic_value(&[f64::NAN], 0.1, 0.02), Err(FormulaError::InvalidInput(_))));
    }
}
