//! Read-only surface: previews for off-chain estimation, rate inspection,
//! max-capacity queries, and a serializable state snapshot.
//!
//! Previews simulate the harvest dilution against the hypothetical
//! post-harvest supply, so a preview immediately followed by the real call
//! quotes the same number. Deposit/mint/withdraw previews are disabled
//! throughout emergency and recovery; redeem previews switch to the frozen
//! snapshot ratio once recovery is active.

use serde::Serialize;

use crate::error::{Result, VaultError};
use crate::math::{self, mul_div, Rounding};
use crate::state::Address;
use crate::target::TargetPosition;
use crate::Vault;

/// Point-in-time view of the ledger for off-chain consumers.
#[derive(Debug, Clone, Serialize)]
pub struct VaultSnapshot {
    pub asset_mint: Address,
    pub name: String,
    pub symbol: String,
    pub total_supply: u64,
    pub total_assets: u64,
    pub last_total_assets: u64,
    pub reward_fee_bps: u16,
    pub treasury: Address,
    pub decimals_offset: u8,
    pub paused: bool,
    pub emergency_mode: bool,
    pub recovery_mode: bool,
    pub emergency_total_assets: u64,
    pub recovery_assets: u64,
    pub recovery_supply: u64,
    pub vault_held: u64,
}

impl<T: TargetPosition> Vault<T> {
    /// Total valuation: the target position plus assets in vault custody.
    pub fn total_assets(&self) -> u64 {
        self.target
            .total_assets()
            .saturating_add(self.account.vault_held)
    }

    /// Shares a deposit of `assets` would mint right now (floor).
    pub fn preview_deposit(&self, assets: u64) -> Result<u64> {
        self.require_previews_enabled()?;
        self.quote_shares(assets, Rounding::Floor)
    }

    /// Assets a mint of `shares` would charge right now (ceiling).
    pub fn preview_mint(&self, shares: u64) -> Result<u64> {
        self.require_previews_enabled()?;
        self.quote_assets(shares, Rounding::Ceiling)
    }

    /// Shares a withdrawal of `assets` would burn right now (ceiling).
    pub fn preview_withdraw(&self, assets: u64) -> Result<u64> {
        self.require_previews_enabled()?;
        self.quote_shares(assets, Rounding::Ceiling)
    }

    /// Assets a redemption of `shares` would pay right now (floor; the
    /// frozen snapshot ratio once recovery is active).
    pub fn preview_redeem(&self, shares: u64) -> Result<u64> {
        if self.account.recovery_mode {
            return mul_div(
                shares as u128,
                self.account.recovery_assets as u128,
                self.account.recovery_supply as u128,
                Rounding::Floor,
            );
        }
        if self.account.emergency_mode {
            // no fair ratio exists between the emergency snapshot and the
            // recovery snapshot
            return Err(VaultError::DisabledDuringEmergency);
        }
        self.quote_assets(shares, Rounding::Floor)
    }

    /// Current assets→shares rate (floor, no harvest simulation). Overridden
    /// by the frozen snapshot ratio once recovery is active.
    pub fn convert_to_shares(&self, assets: u64) -> Result<u64> {
        if self.account.recovery_mode {
            return mul_div(
                assets as u128,
                self.account.recovery_supply as u128,
                self.account.recovery_assets as u128,
                Rounding::Floor,
            );
        }
        math::convert_to_shares(
            assets,
            self.total_assets(),
            self.account.total_supply,
            self.account.decimals_offset,
            Rounding::Floor,
        )
    }

    /// Current shares→assets rate (floor, no harvest simulation). Overridden
    /// by the frozen snapshot ratio once recovery is active.
    pub fn convert_to_assets(&self, shares: u64) -> Result<u64> {
        if self.account.recovery_mode {
            return mul_div(
                shares as u128,
                self.account.recovery_assets as u128,
                self.account.recovery_supply as u128,
                Rounding::Floor,
            );
        }
        math::convert_to_assets(
            shares,
            self.total_assets(),
            self.account.total_supply,
            self.account.decimals_offset,
            Rounding::Floor,
        )
    }

    pub fn max_deposit(&self) -> u64 {
        if self.account.paused || self.account.emergency_mode {
            return 0;
        }
        self.target.max_deposit()
    }

    pub fn max_mint(&self) -> u64 {
        if self.account.paused || self.account.emergency_mode {
            return 0;
        }
        let capacity = self.target.max_deposit();
        // an unrepresentable quote caps the answer at zero rather than
        // advertising unbounded capacity
        self.quote_shares(capacity, Rounding::Floor).unwrap_or(0)
    }

    pub fn max_withdraw(&self, owner: &Address) -> u64 {
        if self.account.emergency_mode {
            return 0;
        }
        let redeemable = self
            .quote_assets(self.account.balance_of(owner), Rounding::Floor)
            .unwrap_or(0);
        redeemable.min(self.target.max_withdraw())
    }

    pub fn max_redeem(&self, owner: &Address) -> u64 {
        let balance = self.account.balance_of(owner);
        if self.account.recovery_mode {
            return balance;
        }
        if self.account.emergency_mode {
            return 0;
        }
        let liquid_shares = self
            .quote_shares(self.target.max_withdraw(), Rounding::Floor)
            .unwrap_or(0);
        balance.min(liquid_shares)
    }

    /// Pre-crisis valuation permanently unavailable at recovery time.
    /// Zero until recovery mode is active.
    pub fn implicit_loss(&self) -> u64 {
        if !self.account.recovery_mode {
            return 0;
        }
        self.account
            .emergency_total_assets
            .saturating_sub(self.account.recovery_assets)
    }

    pub fn snapshot(&self) -> VaultSnapshot {
        VaultSnapshot {
            asset_mint: self.account.asset_mint,
            name: self.account.name.clone(),
            symbol: self.account.symbol.clone(),
            total_supply: self.account.total_supply,
            total_assets: self.total_assets(),
            last_total_assets: self.account.last_total_assets,
            reward_fee_bps: self.account.reward_fee_bps,
            treasury: self.account.treasury,
            decimals_offset: self.account.decimals_offset,
            paused: self.account.paused,
            emergency_mode: self.account.emergency_mode,
            recovery_mode: self.account.recovery_mode,
            emergency_total_assets: self.account.emergency_total_assets,
            recovery_assets: self.account.recovery_assets,
            recovery_supply: self.account.recovery_supply,
            vault_held: self.account.vault_held,
        }
    }

    fn require_previews_enabled(&self) -> Result<()> {
        if self.account.emergency_mode {
            return Err(VaultError::DisabledDuringEmergency);
        }
        Ok(())
    }

    /// Quote against the hypothetical post-harvest supply.
    fn quote_shares(&self, assets: u64, rounding: Rounding) -> Result<u64> {
        math::convert_to_shares(
            assets,
            self.total_assets(),
            self.post_harvest_supply(),
            self.account.decimals_offset,
            rounding,
        )
    }

    /// Quote against the hypothetical post-harvest supply.
    fn quote_assets(&self, shares: u64, rounding: Rounding) -> Result<u64> {
        math::convert_to_assets(
            shares,
            self.total_assets(),
            self.post_harvest_supply(),
            self.account.decimals_offset,
            rounding,
        )
    }
}
