//! Crisis state machine lifecycle: emergency evacuation, recovery snapshot,
//! and fairness of frozen-ratio redemption.

mod common;

use common::{addr, admin, new_vault};
use custodial_vault::{Capability, VaultError};

#[test]
fn emergency_snapshot_and_partial_recovery_surface_implicit_loss() {
    let mut vault = new_vault(0, 0);
    let alice = addr(9);
    vault.deposit(alice, 100_000, alice).unwrap();

    // 30k of the position gets stuck in the target
    vault.target_mut().impair(30_000);

    let snapshot = vault.activate_emergency(admin()).unwrap();
    assert_eq!(snapshot, 100_000);

    let recovered = vault.emergency_pull(admin()).unwrap();
    assert_eq!(recovered, 70_000);
    assert!(vault.target().approval_revoked());

    let implicit_loss = vault.activate_recovery(admin()).unwrap();
    assert_eq!(implicit_loss, 30_000);
    assert_eq!(vault.implicit_loss(), 30_000);

    // every subsequent redemption pays floor(shares · Y / recovery_supply)
    let paid = vault.redeem(alice, 50_000, alice, alice).unwrap();
    assert_eq!(paid, 35_000); // floor(50_000 · 70_000 / 100_000)
}

#[test]
fn recovery_redemption_is_order_independent() {
    let run = |first_is_alice: bool| {
        let mut vault = new_vault(0, 0);
        let alice = addr(9);
        let bob = addr(8);

        vault.deposit(alice, 60_000, alice).unwrap();
        vault.deposit(bob, 40_000, bob).unwrap();
        vault.target_mut().impair(33_333);

        vault.activate_emergency(admin()).unwrap();
        vault.emergency_pull(admin()).unwrap();
        vault.activate_recovery(admin()).unwrap();
        assert_eq!(vault.account().recovery_assets, 66_667);

        let redeem_alice = |v: &mut custodial_vault::Vault<_>| {
            v.redeem(alice, 60_000, alice, alice).unwrap()
        };
        let redeem_bob =
            |v: &mut custodial_vault::Vault<_>| v.redeem(bob, 40_000, bob, bob).unwrap();

        let (a, b) = if first_is_alice {
            let a = redeem_alice(&mut vault);
            let b = redeem_bob(&mut vault);
            (a, b)
        } else {
            let b = redeem_bob(&mut vault);
            let a = redeem_alice(&mut vault);
            (a, b)
        };

        // exact frozen-ratio payouts regardless of claim order
        assert_eq!(a, 40_000); // floor(60_000 · 66_667 / 100_000)
        assert_eq!(b, 26_666); // floor(40_000 · 66_667 / 100_000)
        assert!(a + b <= vault.account().recovery_assets);
        (a, b)
    };

    assert_eq!(run(true), run(false));
}

#[test]
fn crisis_flags_are_one_way() {
    let mut vault = new_vault(0, 0);
    let alice = addr(9);
    vault.deposit(alice, 100_000, alice).unwrap();

    vault.activate_emergency(admin()).unwrap();
    vault.emergency_pull(admin()).unwrap();
    vault.activate_recovery(admin()).unwrap();

    assert!(vault.account().emergency_mode);
    assert!(vault.account().recovery_mode);

    // no call path can unset either flag
    assert_eq!(
        vault.activate_emergency(admin()),
        Err(VaultError::EmergencyAlreadyActive)
    );
    assert_eq!(
        vault.activate_recovery(admin()),
        Err(VaultError::RecoveryAlreadyActive)
    );
    assert!(vault.account().emergency_mode && vault.account().recovery_mode);

    // new business and asset-denominated exit stay permanently disabled
    assert_eq!(
        vault.deposit(alice, 1_000, alice),
        Err(VaultError::EmergencyActive)
    );
    assert_eq!(
        vault.mint(alice, 1_000, alice),
        Err(VaultError::EmergencyActive)
    );
    assert_eq!(
        vault.withdraw(alice, 1_000, alice, alice),
        Err(VaultError::EmergencyActive)
    );
}

#[test]
fn live_exits_block_between_emergency_and_recovery() {
    let mut vault = new_vault(0, 0);
    let alice = addr(9);
    vault.deposit(alice, 100_000, alice).unwrap();
    vault.activate_emergency(admin()).unwrap();

    // fairness must wait for the frozen snapshot
    assert_eq!(
        vault.redeem(alice, 1_000, alice, alice),
        Err(VaultError::EmergencyActive)
    );
    assert_eq!(
        vault.withdraw(alice, 1_000, alice, alice),
        Err(VaultError::EmergencyActive)
    );
}

#[test]
fn recovery_activation_requires_funds_and_supply() {
    let mut vault = new_vault(0, 0);
    let alice = addr(9);
    vault.deposit(alice, 100_000, alice).unwrap();
    vault.activate_emergency(admin()).unwrap();

    // nothing pulled into custody yet
    assert_eq!(
        vault.activate_recovery(admin()),
        Err(VaultError::NoRecoverableAssets)
    );
}

#[test]
fn final_harvest_settles_fees_before_the_snapshot() {
    let mut vault = new_vault(1_000, 0);
    let alice = addr(9);
    vault.deposit(alice, 100_000, alice).unwrap();

    // profit accrues, then the target fails before anyone harvests
    vault.target_mut().gain(20_000);
    vault.target_mut().impair(40_000);

    vault.activate_emergency(admin()).unwrap();
    vault.emergency_pull(admin()).unwrap();
    vault.activate_recovery(admin()).unwrap();

    // the recovery supply includes the treasury's settled fee shares
    let treasury_shares = vault.balance_of(&common::treasury());
    assert!(treasury_shares > 0);
    assert_eq!(
        vault.account().recovery_supply,
        vault.account().total_supply
    );
    assert_eq!(vault.account().total_supply, 100_000 + treasury_shares);
}

#[test]
fn delegated_recovery_redeem_consumes_allowance() {
    let mut vault = new_vault(0, 0);
    let alice = addr(9);
    let bob = addr(8);
    vault.deposit(alice, 100_000, alice).unwrap();

    vault.activate_emergency(admin()).unwrap();
    vault.emergency_pull(admin()).unwrap();
    vault.activate_recovery(admin()).unwrap();

    assert_eq!(
        vault.redeem(bob, 10_000, bob, alice),
        Err(VaultError::InsufficientAllowance)
    );
    vault.approve(alice, bob, 10_000).unwrap();
    let paid = vault.redeem(bob, 10_000, bob, alice).unwrap();
    assert_eq!(paid, 10_000);
    assert_eq!(vault.allowance(&alice, &bob), 0);
}

#[test]
fn recovery_redeem_stays_open_while_paused() {
    let mut vault = new_vault(0, 0);
    let alice = addr(9);
    vault.deposit(alice, 100_000, alice).unwrap();

    vault.activate_emergency(admin()).unwrap();
    vault.emergency_pull(admin()).unwrap();
    vault.activate_recovery(admin()).unwrap();
    vault.set_paused(admin(), true).unwrap();

    assert!(vault.redeem(alice, 10_000, alice, alice).is_ok());
}

#[test]
fn total_distribution_never_exceeds_recovery_assets() {
    let mut vault = new_vault(0, 0);
    let holders: Vec<_> = (10u8..17).map(addr).collect();

    let mut vault_deposits = 0u64;
    for (i, holder) in holders.iter().enumerate() {
        let amount = 10_000 + 1_111 * i as u64;
        vault.deposit(*holder, amount, *holder).unwrap();
        vault_deposits += amount;
    }
    vault.target_mut().impair(vault_deposits / 3);

    vault.activate_emergency(admin()).unwrap();
    vault.emergency_pull(admin()).unwrap();
    vault.activate_recovery(admin()).unwrap();

    let recovery_assets = vault.account().recovery_assets;
    let mut distributed = 0u64;
    for holder in &holders {
        let shares = vault.balance_of(holder);
        distributed += vault.redeem(*holder, shares, *holder, *holder).unwrap();
    }

    assert!(distributed <= recovery_assets);
    assert_eq!(vault.account().total_supply, 0);
    assert_eq!(vault.account().vault_held, recovery_assets - distributed);
}

#[test]
fn crisis_capability_can_be_delegated() {
    let mut vault = new_vault(0, 0);
    let alice = addr(9);
    let guardian = addr(7);
    vault.deposit(alice, 100_000, alice).unwrap();

    assert_eq!(
        vault.activate_emergency(guardian),
        Err(VaultError::MissingCapability(Capability::Crisis))
    );

    vault
        .grant_capability(admin(), guardian, Capability::Crisis)
        .unwrap();
    assert!(vault.activate_emergency(guardian).is_ok());
}
