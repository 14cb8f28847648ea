use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::constants::{
    MAX_DECIMALS_OFFSET, MAX_REWARD_FEE_BPS, UNLIMITED_ALLOWANCE,
};
use crate::error::{Result, VaultError};

/// 32-byte account identity, displayed as base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const ZERO: Address = Address([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Capabilities gating restricted operations. Checked as an explicit
/// `(caller, required capability)` lookup before every guarded mutation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum Capability {
    /// Fee, treasury, pause, and capability administration.
    Manage,
    /// Emergency activation, emergency pulls, recovery activation.
    Crisis,
}

#[derive(Clone, Debug, Default)]
pub struct CapabilityTable {
    grants: HashMap<Address, HashSet<Capability>>,
}

impl CapabilityTable {
    pub fn grant(&mut self, who: Address, capability: Capability) {
        self.grants.entry(who).or_default().insert(capability);
    }

    pub fn revoke(&mut self, who: Address, capability: Capability) {
        if let Some(set) = self.grants.get_mut(&who) {
            set.remove(&capability);
            if set.is_empty() {
                self.grants.remove(&who);
            }
        }
    }

    pub fn holds(&self, who: &Address, capability: Capability) -> bool {
        self.grants
            .get(who)
            .is_some_and(|set| set.contains(&capability))
    }
}

/// Immutable construction parameters for a vault.
#[derive(Clone, Debug)]
pub struct VaultConfig {
    /// Underlying asset reference.
    pub asset_mint: Address,
    /// Display name for the share token.
    pub name: String,
    /// Display symbol for the share token.
    pub symbol: String,
    /// Virtual offset exponent for inflation attack protection, [0, 23].
    pub decimals_offset: u8,
    /// Performance fee in basis points, [0, 2000].
    pub reward_fee_bps: u16,
    /// Recipient of harvested fee shares.
    pub treasury: Address,
    /// Initial holder of the Manage and Crisis capabilities.
    pub admin: Address,
}

/// The single owned ledger aggregate. All share supply, balances, fee
/// accounting, and crisis state live here and mutate only through the
/// documented entry points.
#[derive(Clone, Debug)]
pub struct VaultAccount {
    /// Underlying asset reference (immutable).
    pub asset_mint: Address,
    /// Share token display name.
    pub name: String,
    /// Share token display symbol.
    pub symbol: String,
    /// Virtual offset exponent (immutable).
    pub decimals_offset: u8,
    /// Outstanding share supply. Always equals the sum of `balances`.
    pub total_supply: u64,
    /// High-water mark: the valuation at which fees were last realized.
    pub last_total_assets: u64,
    /// Performance fee in basis points.
    pub reward_fee_bps: u16,
    /// Recipient of harvested fee shares.
    pub treasury: Address,
    /// Set once when the vault freezes for new business.
    pub emergency_mode: bool,
    /// Set once when distribution switches to the frozen snapshot ratio.
    pub recovery_mode: bool,
    /// Total valuation snapshotted when emergency mode activated.
    pub emergency_total_assets: u64,
    /// Vault-held balance snapshotted when recovery mode activated.
    pub recovery_assets: u64,
    /// Share supply snapshotted when recovery mode activated.
    pub recovery_supply: u64,
    /// Asset units in the vault's own custody. Zero in normal operation;
    /// grows through emergency pulls, shrinks through recovery redemptions.
    pub vault_held: u64,
    /// Blocks deposit and mint; withdraw and redeem stay open.
    pub paused: bool,
    /// Capability grants for restricted operations.
    pub capabilities: CapabilityTable,
    /// Reentrancy flag, set for the duration of every mutating call.
    pub(crate) entered: bool,
    balances: HashMap<Address, u64>,
    allowances: HashMap<(Address, Address), u64>,
}

impl VaultAccount {
    pub fn new(config: VaultConfig) -> Result<Self> {
        if config.asset_mint.is_zero() || config.treasury.is_zero() || config.admin.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        if config.decimals_offset > MAX_DECIMALS_OFFSET {
            return Err(VaultError::OffsetAboveMaximum {
                offset: config.decimals_offset,
                max: MAX_DECIMALS_OFFSET,
            });
        }
        if config.reward_fee_bps > MAX_REWARD_FEE_BPS {
            return Err(VaultError::FeeAboveMaximum {
                bps: config.reward_fee_bps,
                max: MAX_REWARD_FEE_BPS,
            });
        }

        let mut capabilities = CapabilityTable::default();
        capabilities.grant(config.admin, Capability::Manage);
        capabilities.grant(config.admin, Capability::Crisis);

        Ok(Self {
            asset_mint: config.asset_mint,
            name: config.name,
            symbol: config.symbol,
            decimals_offset: config.decimals_offset,
            total_supply: 0,
            last_total_assets: 0,
            reward_fee_bps: config.reward_fee_bps,
            treasury: config.treasury,
            emergency_mode: false,
            recovery_mode: false,
            emergency_total_assets: 0,
            recovery_assets: 0,
            recovery_supply: 0,
            vault_held: 0,
            paused: false,
            capabilities,
            entered: false,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        })
    }

    // ---- share ledger ----

    pub fn balance_of(&self, owner: &Address) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    /// Overwrites the spender's allowance. `u64::MAX` is the unlimited
    /// sentinel and is never decremented by spends.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: u64) -> Result<()> {
        if owner.is_zero() || spender.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
        Ok(())
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<()> {
        if from.is_zero() || to.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        let from_balance = self.balance_of(&from);
        if from_balance < amount {
            return Err(VaultError::InsufficientShares);
        }
        let to_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        self.set_balance(from, from_balance - amount);
        self.set_balance(to, to_balance);
        Ok(())
    }

    pub(crate) fn mint_shares(&mut self, to: Address, amount: u64) -> Result<()> {
        if to.is_zero() {
            return Err(VaultError::ZeroAddress);
        }
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        let new_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        self.total_supply = new_supply;
        self.set_balance(to, new_balance);
        Ok(())
    }

    pub(crate) fn burn_shares(&mut self, from: Address, amount: u64) -> Result<()> {
        let balance = self.balance_of(&from);
        if balance < amount {
            return Err(VaultError::InsufficientShares);
        }
        // supply >= any single balance, so this cannot underflow
        self.total_supply -= amount;
        self.set_balance(from, balance - amount);
        Ok(())
    }

    pub(crate) fn check_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        shares: u64,
    ) -> Result<()> {
        if self.allowance(owner, spender) < shares {
            return Err(VaultError::InsufficientAllowance);
        }
        Ok(())
    }

    pub(crate) fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        shares: u64,
    ) -> Result<()> {
        let current = self.allowance(&owner, &spender);
        if current < shares {
            return Err(VaultError::InsufficientAllowance);
        }
        if current != UNLIMITED_ALLOWANCE {
            self.approve(owner, spender, current - shares)?;
        }
        Ok(())
    }

    fn set_balance(&mut self, owner: Address, amount: u64) {
        if amount == 0 {
            self.balances.remove(&owner);
        } else {
            self.balances.insert(owner, amount);
        }
    }

    // ---- capability checks ----

    pub(crate) fn require_capability(&self, caller: &Address, capability: Capability) -> Result<()> {
        if !self.capabilities.holds(caller, capability) {
            return Err(VaultError::MissingCapability(capability));
        }
        Ok(())
    }

    /// Sum of all holder balances. Exposed for invariant checks.
    pub fn balances_total(&self) -> u64 {
        self.balances.values().sum()
    }

    pub fn holders(&self) -> impl Iterator<Item = (&Address, &u64)> {
        self.balances.iter()
    }
}
