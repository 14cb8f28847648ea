//! Crisis state machine: NORMAL → EMERGENCY → RECOVERY, strictly one-way.
//!
//! Emergency freezes new business and live-priced exits, then evacuates the
//! target into vault custody. Recovery snapshots what was actually
//! recovered and freezes the redemption ratio forever: resuming live
//! pricing after a realized shortfall would let the fastest exiters recover
//! full principal at remaining holders' expense.

use crate::error::{Result, VaultError};
use crate::events::{self, EmergencyActivated, EmergencyPull, RecoveryActivated};
use crate::state::{Address, Capability};
use crate::target::TargetPosition;
use crate::Vault;

impl<T: TargetPosition> Vault<T> {
    /// Enter emergency mode, once. Snapshots the total valuation before any
    /// withdrawal so the eventual implicit loss is measured against the
    /// pre-crisis state.
    pub fn activate_emergency(&mut self, caller: Address) -> Result<u64> {
        self.begin_mutation()?;
        let result = self.activate_emergency_locked(caller);
        self.end_mutation();
        result
    }

    /// Pull all currently liquid funds from the target into vault custody.
    /// Repeatable while emergency mode is active, as liquidity frees up;
    /// each pull also revokes outstanding approval toward the target.
    pub fn emergency_pull(&mut self, caller: Address) -> Result<u64> {
        self.begin_mutation()?;
        let result = self.emergency_pull_locked(caller);
        self.end_mutation();
        result
    }

    /// Enter recovery mode, once. Runs a final harvest for fairness, then
    /// freezes the redemption ratio to vault-held balance over outstanding
    /// supply. Returns the implicit loss: pre-crisis valuation permanently
    /// unavailable, whether stuck in the target or a phantom accounting
    /// artifact.
    pub fn activate_recovery(&mut self, caller: Address) -> Result<u64> {
        self.begin_mutation()?;
        let result = self.activate_recovery_locked(caller);
        self.end_mutation();
        result
    }

    fn activate_emergency_locked(&mut self, caller: Address) -> Result<u64> {
        self.account.require_capability(&caller, Capability::Crisis)?;
        if self.account.emergency_mode {
            return Err(VaultError::EmergencyAlreadyActive);
        }

        let snapshot = self.total_assets();
        self.account.emergency_total_assets = snapshot;
        self.account.emergency_mode = true;

        events::emit(&EmergencyActivated {
            snapshot_total_assets: snapshot,
        });
        Ok(snapshot)
    }

    fn emergency_pull_locked(&mut self, caller: Address) -> Result<u64> {
        self.account.require_capability(&caller, Capability::Crisis)?;
        if !self.account.emergency_mode {
            return Err(VaultError::EmergencyNotActive);
        }
        if self.account.recovery_mode {
            // the snapshot is frozen; late arrivals can no longer be
            // distributed through it
            return Err(VaultError::RecoveryAlreadyActive);
        }

        let recovered = self.target.redeem_all_available()?;
        self.account.vault_held = self
            .account
            .vault_held
            .checked_add(recovered)
            .ok_or(VaultError::MathOverflow)?;
        self.target.revoke_approval();

        events::emit(&EmergencyPull {
            recovered,
            vault_held: self.account.vault_held,
        });
        Ok(recovered)
    }

    fn activate_recovery_locked(&mut self, caller: Address) -> Result<u64> {
        self.account.require_capability(&caller, Capability::Crisis)?;
        if !self.account.emergency_mode {
            return Err(VaultError::EmergencyNotActive);
        }
        if self.account.recovery_mode {
            return Err(VaultError::RecoveryAlreadyActive);
        }
        if self.account.vault_held == 0 {
            return Err(VaultError::NoRecoverableAssets);
        }
        if self.account.total_supply == 0 {
            return Err(VaultError::NoOutstandingShares);
        }

        // settle outstanding accruals under the pre-recovery configuration
        self.harvest_locked();

        let recovery_assets = self.account.vault_held;
        let recovery_supply = self.account.total_supply;
        let implicit_loss = self
            .account
            .emergency_total_assets
            .saturating_sub(recovery_assets);

        self.account.recovery_assets = recovery_assets;
        self.account.recovery_supply = recovery_supply;
        self.account.recovery_mode = true;

        events::emit(&RecoveryActivated {
            recovery_assets,
            recovery_supply,
            implicit_loss,
        });
        Ok(implicit_loss)
    }
}
