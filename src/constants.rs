/// Denominator for basis-point fee math.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Hard cap on the performance fee: 20%.
pub const MAX_REWARD_FEE_BPS: u16 = 2_000;

/// Hard cap on the virtual-share decimal offset.
pub const MAX_DECIMALS_OFFSET: u8 = 23;

/// Floor applied to the very first deposit, while total supply is zero.
/// Stops an attacker from seeding a degenerate 1-share supply for later
/// rounding exploitation. No floor applies once real supply exists.
pub const MIN_INITIAL_DEPOSIT: u64 = 1_000;

/// Allowance sentinel that is never decremented by spend.
pub const UNLIMITED_ALLOWANCE: u64 = u64::MAX;
