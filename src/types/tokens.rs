//! Token and pool identity types

use alloy::primitives::Address;

/// A configured token. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
}

/// A constant-function pool and the ordered pair of coins it is expected to
/// hold. The coin list is asserted against the live pool once at startup.
#[derive(Debug, Clone)]
pub struct PoolIdentity {
    pub address: Address,
    pub name: String,
    pub tokens: [Token; 2],
}

impl PoolIdentity {
    /// Resolves a token to its coin index by address.
    pub fn index_of(&self, token: &Token) -> Option<u8> {
        self.tokens
            .iter()
            .position(|t| t.address == token.address)
            .map(|i| i as u8)
    }
}

/// The full arbitrage route: three tokens, the two pools joining them, and
/// the issuer/oracle pair backing the synth peg.
#[derive(Debug, Clone)]
pub struct MarketRoute {
    pub base: Token,
    pub intermediary: Token,
    pub synth: Token,
    pub pool_base_intermediary: PoolIdentity,
    pub pool_intermediary_synth: PoolIdentity,
    pub oracle: Address,
    pub issuer: Address,
}

impl MarketRoute {
    /// Looks a token up by the symbol recorded in a simulation step.
    pub fn token_by_symbol(&self, symbol: &str) -> Option<&Token> {
        [&self.base, &self.intermediary, &self.synth]
            .into_iter()
            .find(|t| t.symbol == symbol)
    }
}
