use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::TokensSwept;
use crate::state::Vault;

#[derive(Accounts)]
pub struct Sweep<'info> {
    #[account(
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
        constraint = vault.governance == governance.key() @ VaultError::Unauthorized,
    )]
    pub vault: Account<'info, Vault>,

    /// A stray token account the vault PDA ended up owning; never the
    /// managed underlying
    #[account(
        mut,
        constraint = swept_token_account.owner == vault.key() @ VaultError::InvalidVaultAccount,
        constraint = swept_token_account.mint != vault.underlying_mint
            @ VaultError::CannotSweepUnderlying,
    )]
    pub swept_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = destination.mint == swept_token_account.mint @ VaultError::MintMismatch,
    )]
    pub destination: Account<'info, TokenAccount>,

    pub governance: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handle_sweep(ctx: Context<Sweep>) -> Result<()> {
    let amount = ctx.accounts.swept_token_account.amount;

    let mint_key = ctx.accounts.vault.underlying_mint;
    let vault_bump = ctx.accounts.vault.bump;
    let signer_seeds = &[VAULT_SEED, mint_key.as_ref(), &[vault_bump]];
    let signer = &[&signer_seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.swept_token_account.to_account_info(),
                to: ctx.accounts.destination.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer,
        ),
        amount,
    )?;

    emit!(TokensSwept {
        vault: ctx.accounts.vault.key(),
        mint: ctx.accounts.swept_token_account.mint,
        amount,
    });

    Ok(())
}
