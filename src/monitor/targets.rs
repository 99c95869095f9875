use std::collections::BTreeMap;

use crate::error::{PriceWatchError, Result};

/// Per-symbol price targets, fixed for the lifetime of the process.
///
/// Symbols are stored upper-cased (`LINKUSDT`) and each list keeps the
/// order it was configured in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetTable {
    targets: BTreeMap<String, Vec<f64>>,
}

impl TargetTable {
    pub fn new(raw: BTreeMap<String, Vec<f64>>) -> Result<Self> {
        let mut targets = BTreeMap::new();

        for (symbol, prices) in raw {
            let normalized = symbol.trim().to_ascii_uppercase();
            if normalized.is_empty() {
                return Err(PriceWatchError::ConfigError(
                    "target table contains a blank symbol".to_string(),
                ));
            }
            if prices.is_empty() {
                return Err(PriceWatchError::ConfigError(format!(
                    "symbol {} has no targets",
                    normalized
                )));
            }
            if let Some(bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
                return Err(PriceWatchError::ConfigError(format!(
                    "target {} for {} must be a positive number",
                    bad, normalized
                )));
            }
            if targets.insert(normalized.clone(), prices).is_some() {
                return Err(PriceWatchError::ConfigError(format!(
                    "symbol {} is configured more than once",
                    normalized
                )));
            }
        }

        if targets.is_empty() {
            return Err(PriceWatchError::ConfigError(
                "no price targets configured".to_string(),
            ));
        }

        Ok(Self { targets })
    }

    pub fn get(&self, symbol: &str) -> Option<&[f64]> {
        self.targets.get(symbol).map(Vec::as_slice)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Trade stream names in the feed's `<symbol>@trade` form.
    pub fn stream_names(&self) -> Vec<String> {
        self.symbols()
            .map(|s| format!("{}@trade", s.to_lowercase()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, &[f64])]) -> BTreeMap<String, Vec<f64>> {
        entries
            .iter()
            .map(|(s, p)| (s.to_string(), p.to_vec()))
            .collect()
    }

    #[test]
    fn normalizes_symbols_and_keeps_target_order() {
        let table = TargetTable::new(raw(&[(" solusdt ", &[210.0, 200.0, 190.0])])).unwrap();
        assert_eq!(table.get("SOLUSDT"), Some(&[210.0, 200.0, 190.0][..]));
        assert!(table.get("solusdt").is_none());
    }

    #[test]
    fn stream_names_are_lowercase_trade_channels() {
        let table = TargetTable::new(raw(&[
            ("LINKUSDT", &[21.7]),
            ("KSMUSDT", &[40.0, 37.0]),
        ]))
        .unwrap();
        assert_eq!(
            table.stream_names(),
            vec!["ksmusdt@trade".to_string(), "linkusdt@trade".to_string()]
        );
    }

    #[test]
    fn rejects_invalid_tables() {
        assert!(TargetTable::new(BTreeMap::new()).is_err());
        assert!(TargetTable::new(raw(&[("  ", &[1.0])])).is_err());
        assert!(TargetTable::new(raw(&[("SOLUSDT", &[])])).is_err());
        assert!(TargetTable::new(raw(&[("SOLUSDT", &[0.0])])).is_err());
        assert!(TargetTable::new(raw(&[("SOLUSDT", &[-3.0])])).is_err());
        assert!(TargetTable::new(raw(&[("SOLUSDT", &[f64::NAN])])).is_err());
        assert!(TargetTable::new(raw(&[("solusdt", &[1.0]), ("SOLUSDT", &[2.0])])).is_err());
    }
}
