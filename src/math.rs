use crate::error::{Result, VaultError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rounding {
    Floor,
    Ceiling,
}

/// Convert assets to shares with virtual offset protection against inflation attacks.
///
/// Formula: shares = assets × (total_supply + 10^offset) / (total_assets + 1)
///
/// The virtual offset ensures that even in an empty vault there is a "virtual"
/// share supply, so a donor cannot materially shift the rate until a donation
/// reaches roughly 10^offset magnitude.
pub fn convert_to_shares(
    assets: u64,
    total_assets: u64,
    total_supply: u64,
    decimals_offset: u8,
    rounding: Rounding,
) -> Result<u64> {
    let virtual_shares = (total_supply as u128)
        .checked_add(pow10(decimals_offset))
        .ok_or(VaultError::MathOverflow)?;

    let virtual_assets = (total_assets as u128)
        .checked_add(1)
        .ok_or(VaultError::MathOverflow)?;

    mul_div(assets as u128, virtual_shares, virtual_assets, rounding)
}

/// Convert shares to assets with virtual offset protection.
///
/// Formula: assets = shares × (total_assets + 1) / (total_supply + 10^offset)
pub fn convert_to_assets(
    shares: u64,
    total_assets: u64,
    total_supply: u64,
    decimals_offset: u8,
    rounding: Rounding,
) -> Result<u64> {
    let virtual_shares = (total_supply as u128)
        .checked_add(pow10(decimals_offset))
        .ok_or(VaultError::MathOverflow)?;

    let virtual_assets = (total_assets as u128)
        .checked_add(1)
        .ok_or(VaultError::MathOverflow)?;

    mul_div(shares as u128, virtual_assets, virtual_shares, rounding)
}

/// 10^exp in u128. Offsets are validated against `MAX_DECIMALS_OFFSET` (23)
/// at construction, comfortably inside u128 range.
pub(crate) fn pow10(exp: u8) -> u128 {
    10u128.pow(exp as u32)
}

/// Safe multiplication then division with configurable rounding.
///
/// Computes: (value × numerator) / denominator over u128 intermediates.
/// Large offsets can push the product past u128; that surfaces as
/// `MathOverflow` rather than silent truncation.
pub fn mul_div(value: u128, numerator: u128, denominator: u128, rounding: Rounding) -> Result<u64> {
    if denominator == 0 {
        return Err(VaultError::DivisionByZero);
    }

    let product = value
        .checked_mul(numerator)
        .ok_or(VaultError::MathOverflow)?;

    let result = match rounding {
        Rounding::Floor => product / denominator,
        Rounding::Ceiling => product
            .checked_add(denominator - 1)
            .ok_or(VaultError::MathOverflow)?
            / denominator,
    };

    u64::try_from(result).map_err(|_| VaultError::MathOverflow)
}
