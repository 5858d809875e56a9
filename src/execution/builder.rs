//! Executor contract calldata

use alloy::primitives::U256;

use crate::types::{ArbitrageScenario, MinOutputs};
use crate::utils::abi::encode_call;

/// Encodes the executor entrypoint for a path direction. Both entrypoints
/// take the flashloan size plus the three hop minimums as a static tuple,
/// so the encoding is four head words either way.
pub fn build_execute_call(
    scenario: ArbitrageScenario,
    flashloan_raw: U256,
    mins: &MinOutputs,
) -> Vec<u8> {
    let signature = match scenario {
        ArbitrageScenario::Rich => "executeRich(uint256,(uint256,uint256,uint256))",
        ArbitrageScenario::Cheap => "executeCheap(uint256,(uint256,uint256,uint256))",
        ArbitrageScenario::None => unreachable!("no executor entrypoint for NONE"),
    };
    encode_call(
        signature,
        &[flashloan_raw, mins.hop1, mins.hop2, mins.final_out],
    )
}
