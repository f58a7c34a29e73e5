use clap::{Args, Parser, Subcommand};
use rusty_valuation::config::AppConfig;
use rusty_valuation::errors::FormulaResult;
use rusty_valuation::models::black_scholes::ClosedFormEuropeanPricer;
use rusty_valuation::models::lattice::{
    BinomialLatticePricer, Dividend, ExerciseStyle, LatticeParameters, LatticeScheme,
};
use rusty_valuation::models::{MarketInputs, OptionKind, OptionPricer};
use rusty_valuation::valuation::altman::{compute_z_score, AltmanInputs, ZScoreZone};
use rusty_valuation::valuation::dcf::dcf_valuation;
use rusty_valuation::valuation::intrinsic::graham_valuation;

#[derive(Parser, Debug)]
#[command(name = "rusty_valuation")]
#[command(about = "Option pricing, bankruptcy risk and intrinsic-value formulas")]
#[command(version)]
struct Cli {
    /// Print a JSON record instead of a formatted line
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Altman Z-score bankruptcy risk
    #[command(allow_negative_numbers = true)]
    ZScore {
        #[arg(long)]
        working_capital: f64,
        #[arg(long)]
        retained_earnings: f64,
        #[arg(long)]
        ebit: f64,
        /// Market value of equity
        #[arg(long)]
        market_value: f64,
        #[arg(long)]
        sales: f64,
        #[arg(long)]
        total_assets: f64,
        #[arg(long)]
        total_liabilities: f64,
    },

    /// European option, Black-Scholes closed form
    #[command(allow_negative_numbers = true)]
    European {
        #[command(flatten)]
        market: MarketArgs,
    },

    /// American option on a binomial lattice, with optional dividends
    #[command(allow_negative_numbers = true)]
    American {
        #[command(flatten)]
        market: MarketArgs,

        /// Number of lattice steps (defaults to LATTICE_STEPS)
        #[arg(long)]
        steps: Option<usize>,

        /// Continuous dividend yield
        #[arg(long, default_value_t = 0.0)]
        dividend_yield: f64,

        /// Discrete dividend as TIME:AMOUNT, repeatable, ascending by time
        #[arg(long = "dividend", value_name = "TIME:AMOUNT")]
        dividends: Vec<Dividend>,

        /// drift-adjusted or crr (defaults to LATTICE_SCHEME)
        #[arg(long)]
        scheme: Option<LatticeScheme>,

        /// Disable early exercise on the same lattice
        #[arg(long)]
        european_exercise: bool,
    },

    /// Earnings-multiple intrinsic value with margin of safety
    #[command(allow_negative_numbers = true)]
    Graham {
        #[arg(long)]
        stock_price: f64,
        /// Earnings per share
        #[arg(long)]
        eps: f64,
        #[arg(long)]
        growth_rate: f64,
    },

    /// Discounted-cash-flow intrinsic value
    #[command(allow_negative_numbers = true)]
    Dcf {
        /// Comma-separated free cash flows, first one received today
        #[arg(long, value_delimiter = ',', required = true)]
        cash_flows: Vec<f64>,
        #[arg(long)]
        discount_rate: f64,
        #[arg(long)]
        terminal_growth_rate: f64,
    },
}

#[derive(Args, Debug)]
struct MarketArgs {
    /// Current price of the underlying
    #[arg(long)]
    spot: f64,
    #[arg(long)]
    strike: f64,
    /// Continuously compounded risk-free rate
    #[arg(long)]
    rate: f64,
    /// Annualized volatility
    #[arg(long)]
    vol: f64,
    /// Time to expiry in years
    #[arg(long)]
    expiry: f64,
    /// call or put
    #[arg(long)]
    kind: OptionKind,
}

impl MarketArgs {
    fn to_inputs(&self) -> FormulaResult<MarketInputs> {
        MarketInputs::new(self.spot, self.strike, self.rate, self.vol, self.expiry, self.kind)
    }
}

fn main() {
    // Logs go to stderr; stdout carries only results.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    match run(cli, &cfg) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// Evaluate one subcommand and render its result.
fn run(cli: Cli, cfg: &AppConfig) -> FormulaResult<String> {
    let precision = cfg.output_precision;

    match cli.command {
        Commands::ZScore {
            working_capital,
            retained_earnings,
            ebit,
            market_value,
            sales,
            total_assets,
            total_liabilities,
        } => {
            let inputs = AltmanInputs {
                working_capital,
                retained_earnings,
                ebit,
                market_value_of_equity: market_value,
                sales,
                total_assets,
                total_liabilities,
            };
            let z = compute_z_score(&inputs)?;
            let zone = ZScoreZone::classify(z);
            if cli.json {
                return Ok(serde_json::json!({ "inputs": inputs, "z_score": z, "zone": zone }).to_string());
            }
            Ok(format!("The Altman Z-score for this company is: {z:.precision$} ({zone})"))
        }

        Commands::European { market } => {
            let inputs = market.to_inputs()?;
            let pricer = ClosedFormEuropeanPricer::new();
            let price = pricer.price(&inputs)?;
            render_option(cli.json, pricer.name(), &inputs, None, price, precision)
        }

        Commands::American {
            market,
            steps,
            dividend_yield,
            dividends,
            scheme,
            european_exercise,
        } => {
            let inputs = market.to_inputs()?;
            let exercise = if european_exercise {
                ExerciseStyle::European
            } else {
                ExerciseStyle::American
            };
            let params = LatticeParameters::new(steps.unwrap_or(cfg.lattice_steps))?
                .with_dividend_yield(dividend_yield)?
                .with_dividends(dividends)?
                .with_exercise(exercise)
                .with_scheme(scheme.unwrap_or(cfg.lattice_scheme));
            let pricer = BinomialLatticePricer::new(params);
            let price = pricer.price(&inputs)?;
            render_option(cli.json, pricer.name(), &inputs, Some(pricer.params()), price, precision)
        }

        Commands::Graham {
            stock_price,
            eps,
            growth_rate,
        } => {
            let valuation = graham_valuation(stock_price, eps, growth_rate)?;
            if cli.json {
                return Ok(serde_json::json!(valuation).to_string());
            }
            Ok(format!(
                "Intrinsic value: {:.precision$} (margin of safety / price: {:.precision$})",
                valuation.intrinsic_value, valuation.price_ratio
            ))
        }

        Commands::Dcf {
            cash_flows,
            discount_rate,
            terminal_growth_rate,
        } => {
            let breakdown = dcf_valuation(&cash_flows, discount_rate, terminal_growth_rate)?;
            if cli.json {
                return Ok(serde_json::json!(breakdown).to_string());
            }
            Ok(format!(
                "The intrinsic value of the company is: {:.precision$}",
                breakdown.intrinsic_value
            ))
        }
    }
}

fn render_option(
    json: bool,
    model: &str,
    inputs: &MarketInputs,
    lattice: Option<&LatticeParameters>,
    price: f64,
    precision: usize,
) -> FormulaResult<String> {
    if json {
        return Ok(serde_json::json!({
            "model": model,
            "market": inputs,
            "lattice": lattice,
            "price": price,
        })
        .to_string());
    }
    Ok(format!(
        "The price of the {} option is: {price:.precision$}",
        inputs.option_kind()
    ))
}
