pub const REFERENCE_SYMBOL: &str = "R$";
pub const FOREIGN_SYMBOL: &str = "U$";
/// Static USD → BRL factor. Not refreshed from any live source.
pub const DEFAULT_EXCHANGE_RATE: f64 = 5.5;

/// Fixed conversion from the one foreign currency into the reference currency.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeTable {
    pub reference_symbol: String,
    pub foreign_symbol: String,
    pub rate: f64,
}

impl Default for ExchangeTable {
    fn default() -> Self {
        ExchangeTable {
            reference_symbol: REFERENCE_SYMBOL.to_string(),
            foreign_symbol: FOREIGN_SYMBOL.to_string(),
            rate: DEFAULT_EXCHANGE_RATE,
        }
    }
}

impl ExchangeTable {
    /// Convert `amount` into the reference currency. Any symbol other than
    /// the foreign marker is taken as already in reference units.
    pub fn normalize(&self, symbol: &str, amount: f64) -> f64 {
        if symbol == self.foreign_symbol {
            amount * self.rate
        } else {
            amount
        }
    }
}
