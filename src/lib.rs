//! Custodial value-accounting vault.
//!
//! Depositors hold fungible share claims against a pool of value deployed
//! into an external yield-bearing position. An operator harvests a
//! performance fee against a high-water mark, and if the position becomes
//! impaired a one-way crisis state machine (emergency → recovery) winds the
//! vault down against a frozen pro-rata snapshot so loss is shared equally
//! regardless of claim order.
//!
//! The ledger is a single owned [`VaultAccount`] aggregate; the external
//! position is an injected [`TargetPosition`] strategy chosen at
//! construction; restricted operations check an explicit capability table;
//! and every mutating entry point runs under a call-scoped reentrancy flag.

pub mod constants;
pub mod error;
pub mod events;
pub mod math;
pub mod operations;
pub mod state;
pub mod target;

pub use error::{Result, VaultError};
pub use math::Rounding;
pub use operations::harvest::HarvestOutcome;
pub use operations::view::VaultSnapshot;
pub use state::{Address, Capability, VaultAccount, VaultConfig};
pub use target::{InMemoryTarget, TargetPosition};

/// A vault: the owned ledger aggregate plus the injected target position.
///
/// All mutating operations take `&mut self`, run to completion or fail
/// without partial effects on the ledger, and serialize through the
/// reentrancy flag.
pub struct Vault<T: TargetPosition> {
    pub(crate) account: VaultAccount,
    pub(crate) target: T,
}

impl<T: TargetPosition> Vault<T> {
    pub fn new(config: VaultConfig, target: T) -> Result<Self> {
        let account = VaultAccount::new(config)?;
        Ok(Self { account, target })
    }

    /// Read access to the ledger aggregate.
    pub fn account(&self) -> &VaultAccount {
        &self.account
    }

    /// Read access to the target position.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Mutable access to the target position. Intended for tests and
    /// simulations; production callers go through the vault operations.
    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    // ---- share surface passthroughs for integrators ----

    pub fn balance_of(&self, owner: &Address) -> u64 {
        self.account.balance_of(owner)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.account.allowance(owner, spender)
    }

    pub fn transfer(&mut self, caller: Address, to: Address, amount: u64) -> Result<()> {
        self.account.transfer(caller, to, amount)
    }

    pub fn approve(&mut self, caller: Address, spender: Address, amount: u64) -> Result<()> {
        self.account.approve(caller, spender, amount)
    }

    // ---- reentrancy guard ----

    /// Sets the in-progress flag for a mutating call; nested entry fails
    /// fast with `ReentrantCall`.
    ///
    /// Target hooks receive no handle back to the vault, so they cannot
    /// re-enter by construction. The flag guards the other direction:
    /// integrators that expose the vault behind a callback surface of
    /// their own still get a hard failure instead of interleaved state.
    pub(crate) fn begin_mutation(&mut self) -> Result<()> {
        if self.account.entered {
            return Err(VaultError::ReentrantCall);
        }
        self.account.entered = true;
        Ok(())
    }

    pub(crate) fn end_mutation(&mut self) {
        self.account.entered = false;
    }
}
