use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::StrategyMigrated;
use crate::state::{StrategyState, Vault};

#[derive(Accounts)]
pub struct MigrateStrategy<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
        constraint = vault.governance == governance.key() @ VaultError::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        constraint = old_strategy.vault == vault.key() @ VaultError::WrongVault,
    )]
    pub old_strategy: Account<'info, StrategyState>,

    #[account(
        mut,
        constraint = old_strategy_token_account.key() == old_strategy.token_account
            @ VaultError::InvalidVaultAccount,
    )]
    pub old_strategy_token_account: Account<'info, TokenAccount>,

    #[account(
        init,
        seeds = [STRATEGY_SEED, vault.key().as_ref(), new_strategy_authority.key().as_ref()],
        bump,
        payer = governance,
        space = StrategyState::SIZE,
    )]
    pub new_strategy: Account<'info, StrategyState>,

    #[account(
        init,
        seeds = [STRATEGY_VAULT_SEED, new_strategy.key().as_ref()],
        bump,
        payer = governance,
        token::mint = underlying_mint,
        token::authority = vault,
    )]
    pub new_strategy_token_account: Account<'info, TokenAccount>,

    #[account(
        constraint = underlying_mint.key() == vault.underlying_mint @ VaultError::MintMismatch,
    )]
    pub underlying_mint: Account<'info, Mint>,

    /// The successor consents to being owned by this vault
    pub new_strategy_authority: Signer<'info>,

    #[account(mut)]
    pub governance: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Moves a strategy's allocation bookkeeping and liquid buffer onto a fresh
/// record at the same queue position. The outgoing strategy must already
/// have unwound any externally held position; only its buffer moves here.
pub fn handle_migrate_strategy(ctx: Context<MigrateStrategy>) -> Result<()> {
    let old_key = ctx.accounts.old_strategy.key();
    let new_key = ctx.accounts.new_strategy.key();

    let vault = &mut ctx.accounts.vault;
    let old = &mut ctx.accounts.old_strategy;
    let new = &mut ctx.accounts.new_strategy;

    vault.migrate_strategy(old_key, old, new_key, new)?;

    new.vault = vault.key();
    new.authority = ctx.accounts.new_strategy_authority.key();
    new.token_account = ctx.accounts.new_strategy_token_account.key();
    new.bump = ctx.bumps.new_strategy;
    new.token_bump = ctx.bumps.new_strategy_token_account;

    let total_debt = new.total_debt;

    let vault_key = ctx.accounts.vault.key();
    let mint_key = ctx.accounts.vault.underlying_mint;
    let vault_bump = ctx.accounts.vault.bump;
    let signer_seeds = &[VAULT_SEED, mint_key.as_ref(), &[vault_bump]];
    let signer = &[&signer_seeds[..]];

    let buffer = ctx.accounts.old_strategy_token_account.amount;
    if buffer > 0 {
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.old_strategy_token_account.to_account_info(),
                    to: ctx.accounts.new_strategy_token_account.to_account_info(),
                    authority: ctx.accounts.vault.to_account_info(),
                },
                signer,
            ),
            buffer,
        )?;
    }

    emit!(StrategyMigrated {
        vault: vault_key,
        old_strategy: old_key,
        new_strategy: new_key,
        total_debt,
    });

    Ok(())
}
