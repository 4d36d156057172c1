pub const VAULT_SEED: &[u8] = b"vault";
pub const VAULT_UNDERLYING_SEED: &[u8] = b"vault_underlying";
pub const STRATEGY_SEED: &[u8] = b"strategy";
pub const STRATEGY_VAULT_SEED: &[u8] = b"strategy_vault";
pub const DEPOSIT_RECEIPT_SEED: &[u8] = b"deposit_receipt";

/// Basis-point denominator: debt ratios, fees and loss tolerances are out of 10_000.
pub const MAX_BPS: u64 = 10_000;

/// Hard cap on withdrawal-queue slots (and therefore on registered strategies).
pub const MAX_STRATEGIES: usize = 6;
