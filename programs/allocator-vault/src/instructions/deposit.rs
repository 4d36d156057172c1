use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::VaultError;
use crate::events::Deposited;
use crate::state::{DepositReceipt, Vault};

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.underlying_mint.as_ref()],
        bump = vault.bump,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        init_if_needed,
        seeds = [DEPOSIT_RECEIPT_SEED, vault.key().as_ref(), depositor.key().as_ref()],
        bump,
        payer = depositor,
        space = DepositReceipt::SIZE,
    )]
    pub receipt: Account<'info, DepositReceipt>,

    #[account(
        mut,
        constraint = underlying_vault.key() == vault.underlying_vault @ VaultError::InvalidVaultAccount,
    )]
    pub underlying_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = depositor_token_account.mint == vault.underlying_mint @ VaultError::MintMismatch,
    )]
    pub depositor_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub depositor: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handle_deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
    let vault = &mut ctx.accounts.vault;

    // Loose balance as of entry, before the transfer lands
    let loose = ctx.accounts.underlying_vault.amount;
    vault.check_deposit(amount, loose)?;

    let shares = vault.shares_to_mint(amount, loose)?;
    require!(shares > 0, VaultError::NoSharesMinted);

    vault.total_shares = vault
        .total_shares
        .checked_add(shares)
        .ok_or(VaultError::MathOverflow)?;

    let receipt = &mut ctx.accounts.receipt;
    if receipt.vault == Pubkey::default() {
        // First deposit — initialize receipt fields
        receipt.vault = vault.key();
        receipt.depositor = ctx.accounts.depositor.key();
        receipt.bump = ctx.bumps.receipt;
    }
    receipt.shares = receipt
        .shares
        .checked_add(shares)
        .ok_or(VaultError::MathOverflow)?;
    receipt.last_deposit_ts = Clock::get()?.unix_timestamp;

    // Transfer tokens from depositor into the vault
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.depositor_token_account.to_account_info(),
                to: ctx.accounts.underlying_vault.to_account_info(),
                authority: ctx.accounts.depositor.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(Deposited {
        vault: ctx.accounts.vault.key(),
        depositor: ctx.accounts.depositor.key(),
        amount,
        shares_minted: shares,
    });

    Ok(())
}
