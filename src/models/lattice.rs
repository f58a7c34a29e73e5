use crate::errors::{ensure_finite, FormulaError, FormulaResult};
use crate::models::{MarketInputs, OptionKind, OptionPricer};
use smallvec::SmallVec;
use std::str::FromStr;

/// How the up/down multipliers are derived from volatility and carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LatticeScheme {
    /// Multipliers centred on the risk-neutral drift; p stays close to 1/2.
    DriftAdjusted,
    /// u = exp(sigma*sqrt(dt)), d = 1/u.
    CoxRossRubinstein,
}

impl LatticeScheme {
    /// (u, d) for one step of length `dt`.
    #[inline]
    fn multipliers(self, carry: f64, sigma: f64, dt: f64) -> (f64, f64) {
        let diffusion = sigma * dt.sqrt();
        match self {
            Self::DriftAdjusted => ((carry * dt + diffusion).exp(), (carry * dt - diffusion).exp()),
            Self::CoxRossRubinstein => {
                let u = diffusion.exp();
                (u, 1.0 / u)
            }
        }
    }
}

impl FromStr for LatticeScheme {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drift-adjusted" | "drift" => Ok(Self::DriftAdjusted),
            "crr" | "cox-ross-rubinstein" => Ok(Self::CoxRossRubinstein),
            other => Err(FormulaError::InvalidInput(format!(
                "lattice scheme must be 'drift-adjusted' or 'crr', got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for LatticeScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DriftAdjusted => write!(f, "drift-adjusted"),
            Self::CoxRossRubinstein => write!(f, "crr"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseStyle {
    #[default]
    American,
    European,
}

/// A discrete cash dividend paid at `time` (years from today).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Dividend {
    time: f64,
    amount: f64,
}

impl Dividend {
    pub fn new(time: f64, amount: f64) -> FormulaResult<Self> {
        ensure_finite("dividend time", time)?;
        ensure_finite("dividend amount", amount)?;
        if time <= 0.0 {
            return Err(FormulaError::InvalidInput(format!("dividend time must be > 0, got {time}")));
        }
        if amount < 0.0 {
            return Err(FormulaError::InvalidInput(format!(
                "dividend amount must be >= 0, got {amount}"
            )));
        }
        Ok(Self { time, amount })
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn amount(&self) -> f64 {
        self.amount
    }
}

impl FromStr for Dividend {
    type Err = FormulaError;

    /// Parses `TIME:AMOUNT`, e.g. `0.25:1.5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (time, amount) = s.split_once(':').ok_or_else(|| {
            FormulaError::InvalidInput(format!("dividend must look like TIME:AMOUNT, got '{s}'"))
        })?;
        let time = time
            .trim()
            .parse::<f64>()
            .map_err(|e| FormulaError::InvalidInput(format!("dividend time '{time}': {e}")))?;
        let amount = amount
            .trim()
            .parse::<f64>()
            .map_err(|e| FormulaError::InvalidInput(format!("dividend amount '{amount}': {e}")))?;
        Self::new(time, amount)
    }
}

pub type DividendSchedule = SmallVec<[Dividend; 4]>;

/// Lattice resolution and dividend treatment. Built with validating setters.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LatticeParameters {
    step_count: usize,
    dividend_yield: f64,
    dividends: DividendSchedule,
    exercise: ExerciseStyle,
    scheme: LatticeScheme,
}

impl LatticeParameters {
    pub fn new(step_count: usize) -> FormulaResult<Self> {
        if step_count < 1 {
            return Err(FormulaError::InvalidInput("step_count must be >= 1".into()));
        }
        Ok(Self {
            step_count,
            dividend_yield: 0.0,
            dividends: SmallVec::new(),
            exercise: ExerciseStyle::American,
            scheme: LatticeScheme::DriftAdjusted,
        })
    }

    pub fn with_dividend_yield(mut self, dividend_yield: f64) -> FormulaResult<Self> {
        ensure_finite("dividend_yield", dividend_yield)?;
        if dividend_yield < 0.0 {
            return Err(FormulaError::InvalidInput(format!(
                "dividend_yield must be >= 0, got {dividend_yield}"
            )));
        }
        self.dividend_yield = dividend_yield;
        Ok(self)
    }

    /// Dividends must be sorted by payment time. Range against expiry is checked at pricing.
    pub fn with_dividends<I>(mut self, dividends: I) -> FormulaResult<Self>
    where
        I: IntoIterator<Item = Dividend>,
    {
        let schedule: DividendSchedule = dividends.into_iter().collect();
        if let Some(pair) = schedule.windows(2).find(|w| w[1].time < w[0].time) {
            return Err(FormulaError::InvalidInput(format!(
                "dividend dates must be sorted ascending: {} follows {}",
                pair[1].time, pair[0].time
            )));
        }
        self.dividends = schedule;
        Ok(self)
    }

    pub fn with_exercise(mut self, exercise: ExerciseStyle) -> Self {
        self.exercise = exercise;
        self
    }

    pub fn with_scheme(mut self, scheme: LatticeScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    pub fn dividends(&self) -> &[Dividend] {
        &self.dividends
    }

    pub fn exercise(&self) -> ExerciseStyle {
        self.exercise
    }

    pub fn scheme(&self) -> LatticeScheme {
        self.scheme
    }

    /// Every dividend must be paid inside (0, expiry] with a finite, non-negative amount.
    /// Written as negated ranges so NaN fails too.
    fn validate_dividends(&self, expiry: f64) -> FormulaResult<()> {
        for div in &self.dividends {
            if !(div.time > 0.0 && div.time <= expiry) {
                return Err(FormulaError::InvalidInput(format!(
                    "dividend date {} outside (0, {expiry}]",
                    div.time
                )));
            }
            if !(div.amount.is_finite() && div.amount >= 0.0) {
                return Err(FormulaError::InvalidInput(format!(
                    "dividend amount must be finite and >= 0, got {}",
                    div.amount
                )));
            }
        }
        Ok(())
    }
}

/// Binomial lattice pricer for American (and European) options with a continuous
/// dividend yield and discrete cash dividends.
///
/// Drift-adjusted multipliers (default):
///   u = exp((r - q)*dt + sigma*sqrt(dt))
///   d = exp((r - q)*dt - sigma*sqrt(dt))
///   p = (exp((r - q)*dt) - d) / (u - d)
///
/// Backward induction keeps a single row of N+1 values and overwrites it in place,
/// so a price costs O(N^2) time and O(N) space. Nothing outlives the call.
pub struct BinomialLatticePricer {
    params: LatticeParameters,
}

impl BinomialLatticePricer {
    pub fn new(params: LatticeParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LatticeParameters {
        &self.params
    }
}

/// Un-adjusted asset price after `ups` up-moves and `downs` down-moves.
#[inline]
fn node_price(spot: f64, u: f64, d: f64, ups: usize, downs: usize) -> f64 {
    spot * u.powi(ups as i32) * d.powi(downs as i32)
}

impl OptionPricer for BinomialLatticePricer {
    #[inline]
    fn name(&self) -> &'static str {
        "Binomial-Lattice"
    }

    fn price(&self, market: &MarketInputs) -> FormulaResult<f64> {
        let params = &self.params;
        let t = market.time_to_expiry();
        params.validate_dividends(t)?;

        let s = market.spot_price();
        let k = market.strike();
        let r = market.risk_free_rate();
        let q = params.dividend_yield();
        let kind = market.option_kind();
        let n = params.step_count();

        let dt = t / n as f64;
        let (u, d) = params.scheme().multipliers(r - q, market.volatility(), dt);
        if u == d {
            return Err(FormulaError::DegenerateLattice(format!(
                "up and down multipliers coincide (u = d = {u}); volatility must be > 0"
            )));
        }

        let p = (((r - q) * dt).exp() - d) / (u - d);
        if !p.is_finite() {
            return Err(FormulaError::DegenerateLattice(format!(
                "risk-neutral probability is not finite (u = {u}, d = {d})"
            )));
        }
        if !(0.0..=1.0).contains(&p) {
            tracing::warn!(p, steps = n, "risk-neutral probability outside [0, 1]; increase steps");
        }
        let disc = (-r * dt).exp();

        tracing::debug!(u, d, p, dt, steps = n, scheme = %params.scheme(), "lattice parameters");

        // Terminal asset prices, indexed by down-move count.
        let mut values: Vec<f64> = (0..=n).map(|j| node_price(s, u, d, n - j, j)).collect();

        // Ex-dividend drop on every terminal node at or below the payment step.
        for div in params.dividends() {
            let first = ((div.time / dt).floor() as usize).min(n);
            for price in &mut values[first..] {
                *price -= div.amount;
            }
        }
        if values[n] < 0.0 {
            tracing::warn!(lowest = values[n], "dividends push terminal prices below zero");
        }

        for value in values.iter_mut() {
            *value = kind.payoff(*value, k);
        }

        let american = params.exercise() == ExerciseStyle::American;

        for i in (0..n).rev() {
            let start = i as f64 * dt;
            let end = (i + 1) as f64 * dt;

            // PV at the start of the interval of dividends paid within (start, end].
            let reinjection: f64 = params
                .dividends()
                .iter()
                .filter(|div| div.time > start && div.time <= end)
                .map(|div| div.amount * (-r * (div.time - start)).exp())
                .sum();

            for j in 0..=i {
                let continuation = disc * (p * values[j] + (1.0 - p) * values[j + 1]);
                let exercise = if american {
                    kind.payoff(node_price(s, u, d, i - j, j), k)
                } else {
                    0.0
                };
                let mut value = exercise.max(continuation);

                // The payout benefits the put holder and is lost to the call holder.
                // Signed on purpose, see OQ-1 in DESIGN.md.
                if reinjection != 0.0 {
                    value = match kind {
                        OptionKind::Put => value + reinjection,
                        OptionKind::Call => (value - reinjection).max(0.0),
                    };
                }
                values[j] = value;
            }
        }

        Ok(values[0])
    }
}
