use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::VaultInitialized;
use crate::state::Vault;

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    #[account(
        init,
        seeds = [VAULT_SEED, underlying_mint.key().as_ref()],
        bump,
        payer = governance,
        space = Vault::SIZE,
    )]
    pub vault: Account<'info, Vault>,

    pub underlying_mint: Account<'info, Mint>,

    #[account(
        init,
        seeds = [VAULT_UNDERLYING_SEED, vault.key().as_ref()],
        bump,
        payer = governance,
        token::mint = underlying_mint,
        token::authority = vault,
    )]
    pub underlying_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub governance: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handle_initialize_vault(
    ctx: Context<InitializeVault>,
    deposit_limit: u64,
    vault_fee_bps: u16,
    keeper: Pubkey,
    rewards: Pubkey,
) -> Result<()> {
    require!(vault_fee_bps as u64 <= MAX_BPS, VaultError::InvalidFee);

    let vault = &mut ctx.accounts.vault;
    vault.governance = ctx.accounts.governance.key();
    vault.keeper = keeper;
    vault.rewards = rewards;
    vault.underlying_mint = ctx.accounts.underlying_mint.key();
    vault.underlying_vault = ctx.accounts.underlying_vault.key();
    vault.decimals = ctx.accounts.underlying_mint.decimals;
    vault.total_shares = 0;
    vault.total_debt = 0;
    vault.debt_ratio = 0;
    vault.deposit_limit = deposit_limit;
    vault.vault_fee_bps = vault_fee_bps;
    vault.withdrawal_queue = [Pubkey::default(); MAX_STRATEGIES];
    vault.bump = ctx.bumps.vault;
    vault.underlying_bump = ctx.bumps.underlying_vault;
    vault._reserved = [0u8; 64];

    emit!(VaultInitialized {
        vault: vault.key(),
        governance: vault.governance,
        underlying_mint: vault.underlying_mint,
        deposit_limit,
        vault_fee_bps,
    });

    Ok(())
}
