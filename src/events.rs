//! Typed lifecycle events. Every ledger mutation emits one of these through
//! the structured logging layer; the serde derives let off-chain consumers
//! (the reward distributor, indexers) ingest the same shapes.

use serde::Serialize;

use crate::state::Address;

#[derive(Debug, Clone, Serialize)]
pub struct Deposit {
    pub caller: Address,
    pub receiver: Address,
    pub assets: u64,
    pub shares: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Withdraw {
    pub caller: Address,
    pub receiver: Address,
    pub owner: Address,
    pub assets: u64,
    pub shares: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeesHarvested {
    pub profit: u64,
    pub fee_amount: u64,
    pub fee_shares: u64,
    pub treasury: Address,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmergencyActivated {
    pub snapshot_total_assets: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmergencyPull {
    pub recovered: u64,
    pub vault_held: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecoveryActivated {
    pub recovery_assets: u64,
    pub recovery_supply: u64,
    pub implicit_loss: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecoveryRedeem {
    pub caller: Address,
    pub receiver: Address,
    pub owner: Address,
    pub assets: u64,
    pub shares: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RewardFeeUpdated {
    pub previous_bps: u16,
    pub new_bps: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreasuryUpdated {
    pub previous: Address,
    pub new: Address,
}

#[derive(Debug, Clone, Serialize)]
pub struct VaultStatusChanged {
    pub paused: bool,
}

pub(crate) fn emit<E: std::fmt::Debug>(event: &E) {
    tracing::info!(target: "custodial_vault", ?event);
}
