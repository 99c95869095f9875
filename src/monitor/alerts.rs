use crate::monitor::targets::TargetTable;

const LOWER_BAND: f64 = 0.99;
const UPPER_BAND: f64 = 1.01;

/// Inclusive ±1% band around `target`.
pub fn is_within_threshold(price: f64, target: f64) -> bool {
    price >= target * LOWER_BAND && price <= target * UPPER_BAND
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Symbol has no configured targets.
    Untracked,
    /// Targets whose band contains the price, in configured order. May be empty.
    Matched(Vec<f64>),
}

pub struct AlertEngine {
    targets: TargetTable,
}

impl AlertEngine {
    pub fn new(targets: TargetTable) -> Self {
        Self { targets }
    }

    pub fn check_price(&self, symbol: &str, price: f64) -> Evaluation {
        match self.targets.get(symbol) {
            Some(targets) => Evaluation::Matched(
                targets
                    .iter()
                    .copied()
                    .filter(|target| is_within_threshold(price, *target))
                    .collect(),
            ),
            None => Evaluation::Untracked,
        }
    }
}
