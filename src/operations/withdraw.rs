//! Withdraw and redeem entry points: shares in, assets out.
//!
//! Withdraw ceilings the shares burned; redeem floors the assets paid. Both
//! stay open while paused, are blocked throughout emergency mode, and redeem
//! alone reopens in recovery mode against the frozen snapshot ratio.

use crate::error::{Result, VaultError};
use crate::events::{self, RecoveryRedeem, Withdraw as WithdrawEvent};
use crate::math::{convert_to_assets, convert_to_shares, mul_div, Rounding};
use crate::state::Address;
use crate::target::TargetPosition;
use crate::Vault;

impl<T: TargetPosition> Vault<T> {
    /// Withdraw exactly `assets` to `receiver`, burning the required shares
    /// from `owner`. Returns the shares burned (ceiling rounding).
    pub fn withdraw(
        &mut self,
        caller: Address,
        assets: u64,
        receiver: Address,
        owner: Address,
    ) -> Result<u64> {
        self.begin_mutation()?;
        let result = self.withdraw_locked(caller, assets, receiver, owner);
        self.end_mutation();
        result
    }

    /// Redeem `shares` from `owner`, paying the resulting assets to
    /// `receiver`. Returns the assets paid (floor rounding; the frozen
    /// snapshot ratio once recovery mode is active).
    pub fn redeem(
        &mut self,
        caller: Address,
        shares: u64,
        receiver: Address,
        owner: Address,
    ) -> Result<u64> {
        self.begin_mutation()?;
        let result = self.redeem_locked(caller, shares, receiver, owner);
        self.end_mutation();
        result
    }

    fn withdraw_locked(
        &mut self,
        caller: Address,
        assets: u64,
        receiver: Address,
        owner: Address,
    ) -> Result<u64> {
        if assets == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if receiver.is_zero() || owner.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        // asset-denominated exit never comes back once the state machine
        // leaves NORMAL (recovery implies emergency)
        if self.account.emergency_mode {
            return Err(VaultError::EmergencyActive);
        }

        self.harvest_locked();

        let shares = convert_to_shares(
            assets,
            self.total_assets(),
            self.account.total_supply,
            self.account.decimals_offset,
            Rounding::Ceiling,
        )?;
        if shares == 0 {
            return Err(VaultError::ZeroSharesComputed);
        }

        self.settle_exit(caller, assets, shares, receiver, owner)?;
        Ok(shares)
    }

    fn redeem_locked(
        &mut self,
        caller: Address,
        shares: u64,
        receiver: Address,
        owner: Address,
    ) -> Result<u64> {
        if shares == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if receiver.is_zero() || owner.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        if self.account.recovery_mode {
            return self.redeem_recovery(caller, shares, receiver, owner);
        }
        if self.account.emergency_mode {
            return Err(VaultError::EmergencyActive);
        }

        self.harvest_locked();

        let assets = convert_to_assets(
            shares,
            self.total_assets(),
            self.account.total_supply,
            self.account.decimals_offset,
            Rounding::Floor,
        )?;
        if assets == 0 {
            return Err(VaultError::ZeroAssetsComputed);
        }

        self.settle_exit(caller, assets, shares, receiver, owner)?;
        Ok(assets)
    }

    /// Shared exit tail: verify balance and delegation, free the assets
    /// from the target, then burn and pay. All checks and the hook precede
    /// every ledger mutation, so a shortfall aborts the call cleanly.
    fn settle_exit(
        &mut self,
        caller: Address,
        assets: u64,
        shares: u64,
        receiver: Address,
        owner: Address,
    ) -> Result<()> {
        if self.account.balance_of(&owner) < shares {
            return Err(VaultError::InsufficientShares);
        }
        if caller != owner {
            self.account.check_allowance(&owner, &caller, shares)?;
        }

        // the liquidity check runs before the hook so a shortfall aborts
        // with the target untouched; a partial release would be credited
        // to no one
        let available = self.target.max_withdraw();
        if available < assets {
            return Err(VaultError::WithdrawShortfall {
                requested: assets,
                available,
            });
        }

        let got = self.target.withdraw(assets)?;
        if got < assets {
            // the hook violated its all-or-nothing contract
            return Err(VaultError::WithdrawShortfall {
                requested: assets,
                available: got,
            });
        }

        if caller != owner {
            self.account.spend_allowance(owner, caller, shares)?;
        }
        self.account.burn_shares(owner, shares)?;
        self.refresh_high_water_mark();

        events::emit(&WithdrawEvent {
            caller,
            receiver,
            owner,
            assets,
            shares,
        });
        Ok(())
    }

    /// Terminal-state redemption: pays `floor(shares · recovery_assets /
    /// recovery_supply)` from the vault's own custody. The snapshot never
    /// mutates, so payouts are order independent and can never distribute
    /// more than `recovery_assets` in total.
    fn redeem_recovery(
        &mut self,
        caller: Address,
        shares: u64,
        receiver: Address,
        owner: Address,
    ) -> Result<u64> {
        let assets = mul_div(
            shares as u128,
            self.account.recovery_assets as u128,
            self.account.recovery_supply as u128,
            Rounding::Floor,
        )?;
        if assets == 0 {
            return Err(VaultError::ZeroAssetsComputed);
        }

        if self.account.balance_of(&owner) < shares {
            return Err(VaultError::InsufficientShares);
        }
        if caller != owner {
            self.account.check_allowance(&owner, &caller, shares)?;
        }
        if assets > self.account.vault_held {
            return Err(VaultError::WithdrawShortfall {
                requested: assets,
                available: self.account.vault_held,
            });
        }

        if caller != owner {
            self.account.spend_allowance(owner, caller, shares)?;
        }
        self.account.burn_shares(owner, shares)?;
        self.account.vault_held -= assets;

        events::emit(&RecoveryRedeem {
            caller,
            receiver,
            owner,
            assets,
            shares,
        });
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNLIMITED_ALLOWANCE;
    use crate::state::VaultConfig;
    use crate::target::InMemoryTarget;

    fn addr(tag: u8) -> Address {
        Address::from_bytes([tag; 32])
    }

    fn vault() -> Vault<InMemoryTarget> {
        Vault::new(
            VaultConfig {
                asset_mint: addr(1),
                name: "Test Vault".into(),
                symbol: "tVLT".into(),
                decimals_offset: 0,
                reward_fee_bps: 0,
                treasury: addr(2),
                admin: addr(3),
            },
            InMemoryTarget::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_redeem_returns_floor_assets() {
        let mut v = vault();
        let alice = addr(9);
        v.deposit(alice, 100_000, alice).unwrap();
        v.target_mut().gain(10_000);

        let assets = v.redeem(alice, 50_000, alice, alice).unwrap();
        // 50_000 · (110_000 + 1) / (100_000 + 1), floored
        assert_eq!(assets, 54_999);
        assert_eq!(v.balance_of(&alice), 50_000);
    }

    #[test]
    fn test_withdraw_burns_ceiling_shares() {
        let mut v = vault();
        let alice = addr(9);
        v.deposit(alice, 100_000, alice).unwrap();
        v.target_mut().gain(10_000);

        let shares = v.withdraw(alice, 55_000, alice, alice).unwrap();
        let floor_shares =
            convert_to_shares(55_000, 110_000, 100_000, 0, Rounding::Floor).unwrap();
        assert!(shares >= floor_shares);
        assert_eq!(v.balance_of(&alice), 100_000 - shares);
    }

    #[test]
    fn test_withdraw_shortfall_aborts_cleanly() {
        let mut v = vault();
        let alice = addr(9);
        v.deposit(alice, 100_000, alice).unwrap();
        v.target_mut().impair(80_000);

        let err = v.withdraw(alice, 50_000, alice, alice).unwrap_err();
        assert_eq!(
            err,
            VaultError::WithdrawShortfall {
                requested: 50_000,
                available: 20_000
            }
        );
        // neither the ledger nor the target saw a partial application
        assert_eq!(v.balance_of(&alice), 100_000);
        assert_eq!(v.account().total_supply, 100_000);
        assert_eq!(v.total_assets(), 100_000);
        assert_eq!(v.target().max_withdraw(), 20_000);

        // the liquid portion remains withdrawable in full
        assert!(v.withdraw(alice, 20_000, alice, alice).is_ok());
    }

    #[test]
    fn test_delegated_withdraw_consumes_allowance() {
        let mut v = vault();
        let alice = addr(9);
        let bob = addr(8);
        v.deposit(alice, 100_000, alice).unwrap();

        assert_eq!(
            v.redeem(bob, 10_000, bob, alice),
            Err(VaultError::InsufficientAllowance)
        );

        v.approve(alice, bob, 10_000).unwrap();
        v.redeem(bob, 10_000, bob, alice).unwrap();
        assert_eq!(v.allowance(&alice, &bob), 0);

        v.approve(alice, bob, UNLIMITED_ALLOWANCE).unwrap();
        v.redeem(bob, 10_000, bob, alice).unwrap();
        assert_eq!(v.allowance(&alice, &bob), UNLIMITED_ALLOWANCE);
    }

    #[test]
    fn test_exit_blocked_during_emergency() {
        let mut v = vault();
        let alice = addr(9);
        v.deposit(alice, 100_000, alice).unwrap();
        v.activate_emergency(addr(3)).unwrap();

        assert_eq!(
            v.withdraw(alice, 1_000, alice, alice),
            Err(VaultError::EmergencyActive)
        );
        assert_eq!(
            v.redeem(alice, 1_000, alice, alice),
            Err(VaultError::EmergencyActive)
        );
    }

    #[test]
    fn test_exit_allowed_while_paused() {
        let mut v = vault();
        let alice = addr(9);
        v.deposit(alice, 100_000, alice).unwrap();
        v.set_paused(addr(3), true).unwrap();

        assert!(v.redeem(alice, 10_000, alice, alice).is_ok());
        assert!(v.withdraw(alice, 10_000, alice, alice).is_ok());
    }
}
