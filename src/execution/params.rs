//! Transaction parameter derivation from a completed simulation

use rust_decimal::Decimal;

use crate::errors::{BotError, BotResult};
use crate::types::{MarketRoute, MinOutputs, ProfitSimulation, StepKind};
use crate::utils::amount::to_raw;
use crate::utils::math::bps_factor;

/// Slippage-protected hop minimums in both raw wire precision and human
/// units. The human values go into the attempt record, the raw values into
/// the calldata.
#[derive(Debug, Clone)]
pub struct HopMinimums {
    pub raw: MinOutputs,
    pub human: [Decimal; 3],
}

/// Applies the slippage haircut to each intermediate hop of the simulated
/// path and converts to raw amounts, rounding down so the protection is
/// never weaker than configured.
///
/// Rejects paths whose protected final output no longer covers the
/// flashloan repayment: such a margin is thinner than one slippage haircut
/// and executing it gambles gas on a revert.
pub fn compute_min_outputs(
    sim: &ProfitSimulation,
    route: &MarketRoute,
    slippage_bps: u32,
) -> BotResult<HopMinimums> {
    let hops: Vec<_> = sim
        .steps
        .iter()
        .filter(|s| matches!(s.kind, StepKind::Swap | StepKind::Mint | StepKind::Redeem))
        .collect();
    if hops.len() != 3 {
        return Err(BotError::Config(format!(
            "expected 3 protected hops in the simulated path, found {}",
            hops.len()
        )));
    }

    let factor = bps_factor(slippage_bps);
    let mut human = [Decimal::ZERO; 3];
    let mut raw = Vec::with_capacity(3);
    for (i, hop) in hops.iter().enumerate() {
        let token = route.token_by_symbol(&hop.token_out).ok_or_else(|| {
            BotError::Config(format!("hop output token {} not in route", hop.token_out))
        })?;
        let min = (hop.amount_out * factor).trunc_with_scale(token.decimals as u32);
        human[i] = min;
        raw.push(to_raw(min, token.decimals as u32)?);
    }

    if human[2] <= sim.total_owed {
        return Err(BotError::ThinMargin {
            details: format!(
                "slippage-protected final output {} does not cover repayment {}",
                human[2], sim.total_owed
            ),
        });
    }

    Ok(HopMinimums {
        raw: MinOutputs {
            hop1: raw[0],
            hop2: raw[1],
            final_out: raw[2],
        },
        human,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{route_fixture, simulation_fixture};
    use crate::types::ArbitrageScenario;
    use rust_decimal_macros::dec;

    #[test]
    fn haircut_rounds_down_in_output_token_precision() {
        let route = route_fixture();
        let sim = simulation_fixture(
            ArbitrageScenario::Rich,
            dec!(1000),
            [dec!(998.123456789), dec!(1010.5), dec!(1007.123456)],
        );

        let mins = compute_min_outputs(&sim, &route, 5).unwrap();
        // 5 bps off each hop, truncated to 18/18/6 decimals
        assert_eq!(mins.human[0], dec!(997.624395060605500000));
        assert_eq!(mins.human[2], dec!(1006.619894));
        assert!(mins.raw.final_out < mins.raw.hop2);
    }

    #[test]
    fn margin_thinner_than_the_haircut_is_rejected() {
        let route = route_fixture();
        // owed 1000.9, final out 1001.0: a 5 bps haircut eats the margin
        let sim = simulation_fixture(
            ArbitrageScenario::Rich,
            dec!(1000),
            [dec!(999), dec!(1005), dec!(1001.0)],
        );

        let err = compute_min_outputs(&sim, &route, 5).unwrap_err();
        assert!(matches!(err, BotError::ThinMargin { .. }));
    }

    #[test]
    fn zero_slippage_keeps_simulated_amounts() {
        let route = route_fixture();
        let sim = simulation_fixture(
            ArbitrageScenario::Cheap,
            dec!(1000),
            [dec!(980), dec!(1000), dec!(1010)],
        );
        let mins = compute_min_outputs(&sim, &route, 0).unwrap();
        assert_eq!(mins.human, [dec!(980), dec!(1000), dec!(1010)]);
    }
}
