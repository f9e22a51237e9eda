use std::env;

use thiserror::Error;

use crate::blockchain::{DEFAULT_DIFFICULTY_BITS, MAX_NONCE, PowError, ProofOfWork};

/// Payloads appended after genesis when `BLOCK_PAYLOADS` is unset.
pub const DEFAULT_PAYLOADS: [&str; 6] = [
    "Send 1 BTC to Ivan",
    "Send 2 more BTC to Ivan",
    "Send 3 more BTC to Ivan",
    "Send 4 more BTC to Ivan",
    "Send 5 more BTC to Ivan",
    "Send 6 more BTC to Ivan",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error(transparent)]
    Pow(#[from] PowError),
}

/// Runtime settings, read from the environment (`.env` is loaded by `main`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub difficulty_bits: u32,
    pub max_nonce: u64,
    pub payloads: Vec<String>,
    pub report_format: ReportFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty_bits: DEFAULT_DIFFICULTY_BITS,
            max_nonce: MAX_NONCE,
            payloads: DEFAULT_PAYLOADS.iter().map(|p| p.to_string()).collect(),
            report_format: ReportFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("DIFFICULTY_BITS") {
            cfg.difficulty_bits = parse("DIFFICULTY_BITS", &v)?;
        }
        if let Some(v) = lookup("MAX_NONCE") {
            cfg.max_nonce = parse("MAX_NONCE", &v)?;
        }
        if let Some(v) = lookup("BLOCK_PAYLOADS") {
            cfg.payloads = v
                .split('|')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = lookup("REPORT_FORMAT") {
            cfg.report_format = match v.trim().to_ascii_lowercase().as_str() {
                "text" => ReportFormat::Text,
                "json" => ReportFormat::Json,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "REPORT_FORMAT",
                        value: v,
                    });
                }
            };
        }

        // Reject an out-of-range difficulty before any mining starts.
        cfg.proof_of_work()?;
        Ok(cfg)
    }

    pub fn proof_of_work(&self) -> Result<ProofOfWork, PowError> {
        ProofOfWork::new(self.difficulty_bits).map(|pow| pow.with_max_nonce(self.max_nonce))
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_match_reference_run() {
        let cfg = from_pairs(&[]).unwrap();
        assert_eq!(cfg.difficulty_bits, 18);
        assert_eq!(cfg.max_nonce, i64::MAX as u64);
        assert_eq!(cfg.payloads.len(), 6);
        assert_eq!(cfg.payloads[0], "Send 1 BTC to Ivan");
        assert_eq!(cfg.report_format, ReportFormat::Text);
    }

    #[test]
    fn reads_overrides() {
        let cfg = from_pairs(&[
            ("DIFFICULTY_BITS", "8"),
            ("MAX_NONCE", " 1000 "),
            ("BLOCK_PAYLOADS", "a | b||c"),
            ("REPORT_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(cfg.difficulty_bits, 8);
        assert_eq!(cfg.max_nonce, 1000);
        assert_eq!(cfg.payloads, vec!["a", "b", "c"]);
        assert_eq!(cfg.report_format, ReportFormat::Json);
        assert_eq!(cfg.proof_of_work().unwrap().max_nonce(), 1000);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            from_pairs(&[("DIFFICULTY_BITS", "hard")]),
            Err(ConfigError::Invalid {
                key: "DIFFICULTY_BITS",
                value: "hard".into()
            })
        );
        assert!(from_pairs(&[("MAX_NONCE", "-1")]).is_err());
        assert!(from_pairs(&[("REPORT_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn rejects_difficulty_out_of_range() {
        assert_eq!(
            from_pairs(&[("DIFFICULTY_BITS", "257")]),
            Err(ConfigError::Pow(PowError::InvalidDifficulty(257)))
        );
    }
}
