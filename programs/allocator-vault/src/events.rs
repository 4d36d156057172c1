use anchor_lang::prelude::*;

use crate::constants::MAX_STRATEGIES;

#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub governance: Pubkey,
    pub underlying_mint: Pubkey,
    pub deposit_limit: u64,
    pub vault_fee_bps: u16,
}

#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub depositor: Pubkey,
    pub amount: u64,
    pub shares_minted: u64,
}

#[event]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub depositor: Pubkey,
    pub amount: u64,
    pub shares_burned: u64,
    pub total_loss: u64,
}

#[event]
pub struct StrategyAdded {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub authority: Pubkey,
    pub debt_ratio: u16,
    pub min_debt_per_harvest: u64,
    pub max_debt_per_harvest: u64,
}

#[event]
pub struct StrategyReported {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub gain: u64,
    pub loss: u64,
    pub debt_paid: u64,
    pub credit: u64,
    pub fee_shares: u64,
    pub total_gain: u64,
    pub total_loss: u64,
    pub total_debt: u64,
}

#[event]
pub struct DebtRatioUpdated {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub debt_ratio: u16,
}

#[event]
pub struct WithdrawalQueueUpdated {
    pub vault: Pubkey,
    pub queue: [Pubkey; MAX_STRATEGIES],
}

#[event]
pub struct StrategyRevoked {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub released_debt_ratio: u16,
}

#[event]
pub struct StrategyMigrated {
    pub vault: Pubkey,
    pub old_strategy: Pubkey,
    pub new_strategy: Pubkey,
    pub total_debt: u64,
}

#[event]
pub struct VaultConfigUpdated {
    pub vault: Pubkey,
    pub deposit_limit: u64,
    pub vault_fee_bps: u16,
    pub rewards: Pubkey,
    pub keeper: Pubkey,
}

#[event]
pub struct TokensSwept {
    pub vault: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
}
