//! Environment configuration
//!
//! `PORT`, `ENVIRONMENT` and `SYMBOLS` come from the environment; storage
//! and cache endpoints belong to the persistence collaborator, not this
//! binary.

use std::env;
use types::ids::Symbol;

const DEFAULT_SYMBOLS: &str = "BTC-USD,ETH-USD,SOL-USD,USDC-USD";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub symbols: Vec<Symbol>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let symbols =
            parse_symbols(&env::var("SYMBOLS").unwrap_or_else(|_| DEFAULT_SYMBOLS.to_string()));

        Self {
            port,
            environment,
            symbols,
        }
    }
}

/// Parse a comma-separated symbol list, dropping malformed entries
fn parse_symbols(raw: &str) -> Vec<Symbol> {
    raw.split(',')
        .filter_map(|s| Symbol::try_new(s.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols() {
        let symbols = parse_symbols("BTC-USD, ETH-USD ,SOL-USD");
        assert_eq!(
            symbols,
            vec![
                Symbol::new("BTC-USD"),
                Symbol::new("ETH-USD"),
                Symbol::new("SOL-USD"),
            ]
        );
    }

    #[test]
    fn test_parse_symbols_drops_malformed() {
        let symbols = parse_symbols("BTC-USD,BOGUS,ETH-USD");
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    fn test_default_symbol_list() {
        assert_eq!(parse_symbols(DEFAULT_SYMBOLS).len(), 4);
    }
}
