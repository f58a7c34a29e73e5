//! Financial formula toolkit: Altman Z-score, Black-Scholes and binomial-lattice option
//! pricing (American exercise, continuous yield, discrete dividends), and the Graham and
//! DCF intrinsic-value estimators.
//!
//! Every formula is a pure function of its arguments and returns a [`errors::FormulaResult`].
//!
//! ```rust
//! use rusty_valuation::models::lattice::{BinomialLatticePricer, LatticeParameters};
//! use rusty_valuation::models::{MarketInputs, OptionKind, OptionPricer};
//!
//! let market = MarketInputs::new(100.0, 110.0, 0.05, 0.2, 0.5, OptionKind::Call).unwrap();
//! let pricer = BinomialLatticePricer::new(LatticeParameters::new(100).unwrap());
//! let price = pricer.price(&market).unwrap();
//! assert!((price - 2.91).abs() < 0.05);
//! ```

pub mod config;
pub mod errors;
pub mod models;
pub mod valuation;
