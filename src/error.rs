use thiserror::Error;

use crate::state::Capability;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VaultError {
    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("address must not be the zero address")]
    ZeroAddress,

    #[error("first deposit of {actual} is below the minimum of {minimum}")]
    BelowMinimumDeposit { minimum: u64, actual: u64 },

    #[error("amount converts to zero shares")]
    ZeroSharesComputed,

    #[error("amount converts to zero assets")]
    ZeroAssetsComputed,

    #[error("fee of {bps} bps exceeds the maximum of {max} bps")]
    FeeAboveMaximum { bps: u16, max: u16 },

    #[error("decimals offset {offset} exceeds the maximum of {max}")]
    OffsetAboveMaximum { offset: u8, max: u8 },

    #[error("deposit of {requested} exceeds target capacity of {max}")]
    ExceedsTargetCapacity { requested: u64, max: u64 },

    #[error("caller lacks the {0:?} capability")]
    MissingCapability(Capability),

    #[error("vault is paused")]
    VaultPaused,

    #[error("pause flag is already set to {0}")]
    PauseUnchanged(bool),

    #[error("operation unavailable while emergency mode is active")]
    EmergencyActive,

    #[error("emergency mode is already active")]
    EmergencyAlreadyActive,

    #[error("emergency mode is not active")]
    EmergencyNotActive,

    #[error("recovery mode is already active")]
    RecoveryAlreadyActive,

    #[error("no vault-held assets available to snapshot for recovery")]
    NoRecoverableAssets,

    #[error("no outstanding shares to snapshot for recovery")]
    NoOutstandingShares,

    #[error("previews are disabled during emergency and recovery")]
    DisabledDuringEmergency,

    #[error("target reported a zero position delta")]
    TargetDepositRejected,

    #[error("target returned {available} of {requested} requested")]
    WithdrawShortfall { requested: u64, available: u64 },

    #[error("arithmetic overflow")]
    MathOverflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("insufficient shares balance")]
    InsufficientShares,

    #[error("insufficient spender allowance")]
    InsufficientAllowance,

    #[error("reentrant call rejected")]
    ReentrantCall,
}

/// Result type alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
