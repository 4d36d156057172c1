use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::StrategyAdded;
use crate::state::{StrategyState, Vault};

#[derive(Accounts)]
pub struct AddStrategy<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
        constraint = vault.governance == governance.key() @ VaultError::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        init,
        seeds = [STRATEGY_SEED, vault.key().as_ref(), strategy_authority.key().as_ref()],
        bump,
        payer = governance,
        space = StrategyState::SIZE,
    )]
    pub strategy: Account<'info, StrategyState>,

    /// The strategy's liquid buffer; the vault PDA is its authority so the
    /// engine can settle harvests and withdrawals without a strategy signature
    #[account(
        init,
        seeds = [STRATEGY_VAULT_SEED, strategy.key().as_ref()],
        bump,
        payer = governance,
        token::mint = underlying_mint,
        token::authority = vault,
    )]
    pub strategy_token_account: Account<'info, TokenAccount>,

    #[account(
        constraint = underlying_mint.key() == vault.underlying_mint @ VaultError::MintMismatch,
    )]
    pub underlying_mint: Account<'info, Mint>,

    /// Co-signs registration: the strategy consents to being owned by this vault
    pub strategy_authority: Signer<'info>,

    #[account(mut)]
    pub governance: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handle_add_strategy(
    ctx: Context<AddStrategy>,
    debt_ratio: u16,
    min_debt_per_harvest: u64,
    max_debt_per_harvest: u64,
) -> Result<()> {
    let strategy_key = ctx.accounts.strategy.key();
    let vault = &mut ctx.accounts.vault;
    let strategy = &mut ctx.accounts.strategy;

    vault.register_strategy(
        strategy_key,
        strategy,
        debt_ratio,
        min_debt_per_harvest,
        max_debt_per_harvest,
    )?;

    strategy.vault = vault.key();
    strategy.authority = ctx.accounts.strategy_authority.key();
    strategy.token_account = ctx.accounts.strategy_token_account.key();
    strategy.bump = ctx.bumps.strategy;
    strategy.token_bump = ctx.bumps.strategy_token_account;

    emit!(StrategyAdded {
        vault: vault.key(),
        strategy: strategy_key,
        authority: strategy.authority,
        debt_ratio,
        min_debt_per_harvest,
        max_debt_per_harvest,
    });

    Ok(())
}
