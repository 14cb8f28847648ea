//! Fee harvester: realizes profit above the high-water mark as dilutive
//! fee shares minted to the treasury.

use crate::constants::BPS_DENOMINATOR;
use crate::error::Result;
use crate::events::{self, FeesHarvested};
use crate::math::{mul_div, Rounding};
use crate::target::TargetPosition;
use crate::Vault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HarvestOutcome {
    /// Valuation gain above the high-water mark at harvest time.
    pub profit: u64,
    /// Asset-denominated fee realized from the profit.
    pub fee_amount: u64,
    /// Shares minted to the treasury for the fee.
    pub fee_shares: u64,
}

/// Fee computation shared by the executing harvest and every preview, so the
/// two paths cannot disagree.
///
/// Inclusive formula: the fee is a percentage of post-mint vault ownership,
/// not of gross profit. Both steps round with ceiling:
///
/// ```text
/// fee_amount = ceil(profit · fee_bps / 10_000)        clamped to profit
/// fee_shares = ceil(fee_amount · supply / (total_assets − fee_amount))
/// ```
///
/// Returns `(0, 0)` whenever no fee applies: zero profit, zero supply, zero
/// fee rate, or the degenerate dust case where the fee would consume the
/// entire valuation. None of these are errors.
pub(crate) fn simulate_fee(
    total_assets: u64,
    last_total_assets: u64,
    total_supply: u64,
    reward_fee_bps: u16,
) -> (u64, u64) {
    let profit = total_assets.saturating_sub(last_total_assets);
    if profit == 0 || total_supply == 0 || reward_fee_bps == 0 {
        return (0, 0);
    }

    let fee_amount = mul_div(
        profit as u128,
        reward_fee_bps as u128,
        BPS_DENOMINATOR as u128,
        Rounding::Ceiling,
    )
    .unwrap_or(0)
    // rounding must never charge more than the profit that triggered it
    .min(profit);

    if fee_amount == 0 || fee_amount >= total_assets {
        return (0, 0);
    }

    let fee_shares = mul_div(
        fee_amount as u128,
        total_supply as u128,
        (total_assets - fee_amount) as u128,
        Rounding::Ceiling,
    )
    .unwrap_or(0);

    if fee_shares == 0 {
        return (0, 0);
    }

    (fee_amount, fee_shares)
}

impl<T: TargetPosition> Vault<T> {
    /// Permissionless, idempotent harvest entry point.
    pub fn harvest(&mut self) -> Result<HarvestOutcome> {
        self.begin_mutation()?;
        let outcome = self.harvest_locked();
        self.end_mutation();
        Ok(outcome)
    }

    /// Harvest body, run while the reentrancy flag is held. Never fails:
    /// when no fee applies the high-water mark is still refreshed so a
    /// static balance is never later misread as profit.
    pub(crate) fn harvest_locked(&mut self) -> HarvestOutcome {
        // once the recovery snapshot is frozen, fee accounting is closed:
        // stuck assets appreciating after the fact must not mint shares
        // that redeem against an already fully allocated `vault_held`
        if self.account.recovery_mode {
            return HarvestOutcome::default();
        }

        let total = self.total_assets();
        let profit = total.saturating_sub(self.account.last_total_assets);
        let (fee_amount, fee_shares) = simulate_fee(
            total,
            self.account.last_total_assets,
            self.account.total_supply,
            self.account.reward_fee_bps,
        );

        let mut outcome = HarvestOutcome {
            profit,
            fee_amount: 0,
            fee_shares: 0,
        };

        let treasury = self.account.treasury;
        if fee_shares > 0 && self.account.mint_shares(treasury, fee_shares).is_ok() {
            outcome.fee_amount = fee_amount;
            outcome.fee_shares = fee_shares;
            events::emit(&FeesHarvested {
                profit,
                fee_amount,
                fee_shares,
                treasury,
            });
        }

        self.account.last_total_assets = total;
        outcome
    }

    /// Supply as it would stand immediately after a harvest. Previews quote
    /// against this, never the raw pre-harvest supply.
    pub(crate) fn post_harvest_supply(&self) -> u64 {
        let (_, fee_shares) = simulate_fee(
            self.total_assets(),
            self.account.last_total_assets,
            self.account.total_supply,
            self.account.reward_fee_bps,
        );
        self.account.total_supply.saturating_add(fee_shares)
    }

    /// Re-anchors the high-water mark to the current valuation. Run at the
    /// end of every successful deposit/mint/withdraw/redeem so principal
    /// movement is never misread as profit or loss.
    pub(crate) fn refresh_high_water_mark(&mut self) {
        self.account.last_total_assets = self.total_assets();
    }
}
