use custodial_vault::{Address, InMemoryTarget, Vault, VaultConfig};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

pub fn addr(tag: u8) -> Address {
    Address::from_bytes([tag; 32])
}

pub fn admin() -> Address {
    addr(3)
}

pub fn treasury() -> Address {
    addr(2)
}

pub fn new_vault(reward_fee_bps: u16, decimals_offset: u8) -> Vault<InMemoryTarget> {
    init_tracing();
    Vault::new(
        VaultConfig {
            asset_mint: addr(1),
            name: "Custody Vault".into(),
            symbol: "cVLT".into(),
            decimals_offset,
            reward_fee_bps,
            treasury: treasury(),
            admin: admin(),
        },
        InMemoryTarget::new(),
    )
    .unwrap()
}
