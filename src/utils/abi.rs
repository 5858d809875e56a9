//! Minimal calldata encoding for the handful of contract calls the bot makes

use alloy::primitives::{keccak256, U256};

/// Encodes a call whose arguments are all single 32-byte words.
pub fn encode_call(signature: &str, words: &[U256]) -> Vec<u8> {
    let mut data = keccak256(signature)[..4].to_vec();
    for word in words {
        data.extend_from_slice(&word.to_be_bytes::<32>());
    }
    data
}
