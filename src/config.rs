use crate::errors::{FormulaError, FormulaResult};
use crate::models::lattice::LatticeScheme;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub lattice_steps: usize,
    pub lattice_scheme: LatticeScheme,
    pub output_precision: usize,
}

impl AppConfig {
    pub fn from_env() -> FormulaResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> FormulaResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let lattice_steps = var_or("LATTICE_STEPS", "100")
            .parse::<usize>()
            .map_err(|e| FormulaError::Config(format!("LATTICE_STEPS: {e}")))?;
        if lattice_steps == 0 {
            return Err(FormulaError::Config("LATTICE_STEPS: must be >= 1".into()));
        }

        let lattice_scheme = var_or("LATTICE_SCHEME", "drift-adjusted")
            .parse::<LatticeScheme>()
            .map_err(|e| FormulaError::Config(format!("LATTICE_SCHEME: {e}")))?;

        let output_precision = var_or("OUTPUT_PRECISION", "2")
            .parse::<usize>()
            .map_err(|e| FormulaError::Config(format!("OUTPUT_PRECISION: {e}")))?;

        Ok(Self {
            lattice_steps,
            lattice_scheme,
            output_precision,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lattice_steps: 100,
            lattice_scheme: LatticeScheme::DriftAdjusted,
            output_precision: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.lattice_steps, 100);
        assert_eq!(cfg.lattice_scheme, LatticeScheme::DriftAdjusted);
        assert_eq!(cfg.output_precision, 2);
    }

    #[test]
    fn test_overrides() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("LATTICE_STEPS", "250"),
            ("LATTICE_SCHEME", "crr"),
            ("OUTPUT_PRECISION", "4"),
        ]))
        .unwrap();
        assert_eq!(cfg.lattice_steps, 250);
        assert_eq!(cfg.lattice_scheme, LatticeScheme::CoxRossRubinstein);
        assert_eq!(cfg.output_precision, 4);
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        let err = AppConfig::from_lookup(lookup_from(&[("LATTICE_STEPS", "many")])).unwrap_err();
        assert!(matches!(err, FormulaError::Config(_)), "got {err:?}");

        let err = AppConfig::from_lookup(lookup_from(&[("LATTICE_STEPS", "0")])).unwrap_err();
        assert!(matches!(err, FormulaError::Config(_)), "got {err:?}");

        let err = AppConfig::from_lookup(lookup_from(&[("LATTICE_SCHEME", "trinomial")])).unwrap_err();
        assert!(matches!(err, FormulaError::Config(_)), "got {err:?}");
    }
}
