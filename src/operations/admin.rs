//! Fee, treasury, pause, and capability administration. Fee and treasury
//! changes harvest first so past accruals settle under the old
//! configuration.

use crate::constants::MAX_REWARD_FEE_BPS;
use crate::error::{Result, VaultError};
use crate::events::{self, RewardFeeUpdated, TreasuryUpdated, VaultStatusChanged};
use crate::state::{Address, Capability};
use crate::target::TargetPosition;
use crate::Vault;

impl<T: TargetPosition> Vault<T> {
    /// Update the performance fee rate, in basis points.
    pub fn set_reward_fee(&mut self, caller: Address, bps: u16) -> Result<()> {
        self.begin_mutation()?;
        let result = self.set_reward_fee_locked(caller, bps);
        self.end_mutation();
        result
    }

    /// Update the fee recipient.
    pub fn set_treasury(&mut self, caller: Address, treasury: Address) -> Result<()> {
        self.begin_mutation()?;
        let result = self.set_treasury_locked(caller, treasury);
        self.end_mutation();
        result
    }

    /// Pause or unpause new business. Withdraw and redeem stay open.
    pub fn set_paused(&mut self, caller: Address, paused: bool) -> Result<()> {
        self.account.require_capability(&caller, Capability::Manage)?;
        if self.account.paused == paused {
            return Err(VaultError::PauseUnchanged(paused));
        }
        self.account.paused = paused;
        events::emit(&VaultStatusChanged { paused });
        Ok(())
    }

    pub fn grant_capability(
        &mut self,
        caller: Address,
        who: Address,
        capability: Capability,
    ) -> Result<()> {
        self.account.require_capability(&caller, Capability::Manage)?;
        if who.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        self.account.capabilities.grant(who, capability);
        Ok(())
    }

    pub fn revoke_capability(
        &mut self,
        caller: Address,
        who: Address,
        capability: Capability,
    ) -> Result<()> {
        self.account.require_capability(&caller, Capability::Manage)?;
        self.account.capabilities.revoke(who, capability);
        Ok(())
    }

    fn set_reward_fee_locked(&mut self, caller: Address, bps: u16) -> Result<()> {
        self.account.require_capability(&caller, Capability::Manage)?;
        if bps > MAX_REWARD_FEE_BPS {
            return Err(VaultError::FeeAboveMaximum {
                bps,
                max: MAX_REWARD_FEE_BPS,
            });
        }

        // settle accruals under the old rate before it changes
        self.harvest_locked();

        let previous_bps = self.account.reward_fee_bps;
        self.account.reward_fee_bps = bps;

        events::emit(&RewardFeeUpdated {
            previous_bps,
            new_bps: bps,
        });
        Ok(())
    }

    fn set_treasury_locked(&mut self, caller: Address, treasury: Address) -> Result<()> {
        self.account.require_capability(&caller, Capability::Manage)?;
        if treasury.is_zero() {
            return Err(VaultError::ZeroAddress);
        }

        // settle accruals to the old treasury before it changes
        self.harvest_locked();

        let previous = self.account.treasury;
        self.account.treasury = treasury;

        events::emit(&TreasuryUpdated {
            previous,
            new: treasury,
        });
        Ok(())
    }
}
